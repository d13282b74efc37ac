//! FILENAME: app/src/commands.rs
// PURPOSE: Dashboard commands called by the presentation layer.
// CONTEXT: Every command returns `Result<_, String>`; library errors are
// mapped with `to_string()`. Commands hold state locks only long enough to
// clone the `Arc`s they need.

use crate::api_types::{
    DashboardKind, DashboardSummary, FilterSelections, PeriodInfo, PeriodProducts,
    ProductPerformance,
};
use crate::config::DashboardConfig;
use crate::state::{DashboardState, WeekTables};
use comparison_engine::{
    all_options, available_months, compare_summaries, options_for, product_totals, summarize,
    top_performers, ComparisonEngine, ComparisonOutcome, Dimension, FilterEngine, FilterOption,
    FilterSpec, GroupView, WeekContext,
};
use dataset::calendar::{weekday_name, MonthYear};
use dataset::{log_enter, log_exit, log_info, log_warn, RowSet, Table};
use persistence::{
    concat, ingest_folder, load_periods, resolve, DatasetAssembler, Ingested, PeriodResolver,
    PeriodRole, TableCache, TableLoader,
};
use std::collections::BTreeMap;
use std::sync::Arc;

// ============================================================================
// HELPERS
// ============================================================================

fn parse_month(label: &str) -> Result<MonthYear, String> {
    MonthYear::parse(label)
        .ok_or_else(|| format!("Invalid month '{}', expected e.g. 'June-2025'", label))
}

fn weekday_label(first_weekday: u8) -> String {
    weekday_name(first_weekday).unwrap_or("Unknown").to_string()
}

fn monthly_engine(config: &DashboardConfig) -> ComparisonEngine {
    ComparisonEngine::new(
        FilterEngine::new(config.dimension_columns.clone()),
        config.month_columns.clone(),
    )
}

fn product_engine(config: &DashboardConfig) -> FilterEngine {
    FilterEngine::new(config.product_columns.clone())
}

fn require_base(tables: &WeekTables) -> Result<&Table, String> {
    tables
        .base
        .as_deref()
        .ok_or_else(|| "No dataset loaded. Run load_dashboard first.".to_string())
}

/// Week labels follow the selected first weekday, not the calendar's.
fn week_context(month: MonthYear, first_weekday: u8) -> WeekContext {
    WeekContext {
        first_weekday,
        days_in_month: month.days_in_month(),
    }
}

/// The table options are built from, and the month that labels its weeks.
fn options_source(
    state: &DashboardState,
    tables: &WeekTables,
    dashboard: DashboardKind,
    month: Option<&str>,
) -> Result<(Arc<Table>, Option<WeekContext>), String> {
    match dashboard {
        DashboardKind::Monthly => {
            let table = tables
                .base
                .clone()
                .ok_or_else(|| "No dataset loaded. Run load_dashboard first.".to_string())?;
            let week = match month {
                Some(label) => Some(week_context(parse_month(label)?, tables.first_weekday)),
                None => None,
            };
            Ok((table, week))
        }
        DashboardKind::Product => {
            if tables.periods.is_empty() {
                return Err("No period files loaded".to_string());
            }
            let parts: Vec<Table> = tables.periods.iter().map(|p| p.table.clone()).collect();
            let week = state
                .latest_month()?
                .map(|m| week_context(m, tables.first_weekday));
            Ok((Arc::new(concat(&parts)), week))
        }
    }
}

/// Filtered rows of one period, or no rows when its file was not found.
fn period_rows<'a>(
    tables: &'a WeekTables,
    role: PeriodRole,
    engine: &FilterEngine,
    spec: &FilterSpec,
    empty: &'a Table,
) -> RowSet<'a> {
    match tables.periods.iter().find(|p| p.period.role == role) {
        Some(p) => engine.filter_table(&p.table, spec),
        None => RowSet::all(empty),
    }
}

fn filter_engine_for(config: &DashboardConfig, dashboard: DashboardKind) -> FilterEngine {
    match dashboard {
        DashboardKind::Monthly => FilterEngine::new(config.dimension_columns.clone()),
        DashboardKind::Product => product_engine(config),
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Ingests the source folder (through the cache) and, when an anchor month is
/// known, loads the period invoice files. A missing or empty source folder is
/// reported through `emptyReason`, not as an error.
pub fn load_dashboard(
    state: &DashboardState,
    latest_month: Option<String>,
) -> Result<DashboardSummary, String> {
    log_enter!("CMD", "load_dashboard", "latest_month={:?}", latest_month);
    let config = state.config()?;

    let cache = TableCache::new(&config.cache_folder, TableLoader::default());
    let assembler = DatasetAssembler::new(config.assembler_config());
    let (base, empty_reason) = match ingest_folder(&config.source_folder, &cache, &assembler) {
        Ingested::Loaded(table) => (Some(table), None),
        Ingested::Empty(reason) => {
            log_warn!("CMD", "no dataset: {}", reason);
            (None, Some(reason.to_string()))
        }
    };

    let anchor = match latest_month.as_deref().or(config.latest_month.as_deref()) {
        Some(label) => Some(parse_month(label)?),
        None => None,
    };

    let periods = match anchor {
        Some(anchor) => {
            let resolver = PeriodResolver::new(
                &config.period_base_folder,
                config.period_keyword.clone(),
                config.period_extension.clone(),
            );
            load_periods(&resolver, anchor, &config.period_preparation)
        }
        None => Vec::new(),
    };

    let first_weekday = anchor
        .and_then(|m| m.first_weekday())
        .unwrap_or(config.first_weekday);

    let summary = DashboardSummary {
        row_count: base.as_ref().map_or(0, |t| t.row_count()),
        columns: base.as_ref().map_or_else(Vec::new, |t| t.columns().to_vec()),
        months: base.as_ref().map_or_else(Vec::new, |t| {
            available_months(t, &config.month_columns.month, &config.month_columns.year)
        }),
        empty_reason: empty_reason.clone(),
        latest_month: anchor.map(|m| m.label()),
        periods: periods
            .iter()
            .map(|p| PeriodInfo {
                role: p.period.role,
                name: p.period.display_name(),
                source: p.period.source.display().to_string(),
                row_count: p.table.row_count(),
            })
            .collect(),
        first_weekday,
        first_weekday_name: weekday_label(first_weekday),
    };

    state.replace_data(base, empty_reason, anchor, periods, first_weekday)?;
    log_exit!(
        "CMD",
        "load_dashboard",
        "rows={} periods={}",
        summary.row_count,
        summary.periods.len()
    );
    Ok(summary)
}

// ============================================================================
// MONTH COMPARISON
// ============================================================================

/// Compares two `"<Month> <Year>"` labels: a category table in natural order
/// and an item table of the biggest movers.
pub fn compare_months(
    state: &DashboardState,
    month1: String,
    month2: String,
    selections: FilterSelections,
) -> Result<ComparisonOutcome, String> {
    log_enter!("CMD", "compare_months", "{} vs {}", month1, month2);
    let config = state.config()?;
    let tables = state.week_tables()?;
    let table = require_base(&tables)?;

    let views = [
        GroupView::natural(config.dimension_columns.category.clone(), &config.metrics),
        GroupView::top_movers(
            config.dimension_columns.item.clone(),
            &config.metrics,
            config.ranking_metric.clone(),
            config.item_limit,
        ),
    ];
    let outcome = monthly_engine(&config).compare_months(
        table,
        [month1.as_str(), month2.as_str()],
        &selections.to_spec(),
        &views,
    );

    if let ComparisonOutcome::NoData(report) = &outcome {
        log_info!("CMD", "compare_months: {}", report.message());
    }
    log_exit!("CMD", "compare_months");
    Ok(outcome)
}

pub fn get_available_months(state: &DashboardState) -> Result<Vec<String>, String> {
    let config = state.config()?;
    Ok(match state.base_table()? {
        Some(table) => {
            available_months(&table, &config.month_columns.month, &config.month_columns.year)
        }
        None => Vec::new(),
    })
}

// ============================================================================
// FILTER OPTIONS
// ============================================================================

/// Options for every filter control of a dashboard. `month` labels the week
/// options of the monthly dashboard; the product dashboard uses its anchor month.
pub fn get_filter_options(
    state: &DashboardState,
    dashboard: DashboardKind,
    month: Option<String>,
    selections: FilterSelections,
) -> Result<BTreeMap<Dimension, Vec<FilterOption>>, String> {
    let config = state.config()?;
    let tables = state.week_tables()?;
    let (table, week) = options_source(state, &tables, dashboard, month.as_deref())?;
    let engine = filter_engine_for(&config, dashboard);
    Ok(all_options(&engine, &table, &selections.to_spec(), week))
}

/// Week options alone, e.g. after the first weekday changed.
pub fn get_week_options(
    state: &DashboardState,
    dashboard: DashboardKind,
    month: Option<String>,
    selections: FilterSelections,
) -> Result<Vec<FilterOption>, String> {
    let config = state.config()?;
    let tables = state.week_tables()?;
    let (table, week) = options_source(state, &tables, dashboard, month.as_deref())?;
    let engine = filter_engine_for(&config, dashboard);
    Ok(options_for(&engine, &table, Dimension::Week, &selections.to_spec(), week))
}

/// Changes the weekday week 1 starts on and re-derives the week columns.
/// Returns the weekday's name.
pub fn set_first_weekday(state: &DashboardState, first_weekday: u8) -> Result<String, String> {
    state.set_first_weekday(first_weekday)?;
    state.week_tables()?;
    let name = weekday_label(first_weekday);
    log_info!("CMD", "first weekday set to {}", name);
    Ok(name)
}

// ============================================================================
// PRODUCT PERFORMANCE
// ============================================================================

/// Headline summary, product and brand leaderboards and per-period product
/// tables across last month, last year and the latest month. A period without
/// a source file counts as empty.
pub fn get_product_performance(
    state: &DashboardState,
    selections: FilterSelections,
    top_n: Option<usize>,
) -> Result<ProductPerformance, String> {
    log_enter!("CMD", "get_product_performance");
    let config = state.config()?;
    let anchor = state
        .latest_month()?
        .ok_or_else(|| {
            "No latest month loaded. Run load_dashboard with a month first.".to_string()
        })?;
    let tables = state.week_tables()?;
    let engine = product_engine(&config);
    let spec = selections.to_spec();
    let columns = &config.summary_columns;
    let top_n = top_n.unwrap_or(config.top_n);

    let triple = resolve(anchor);
    let name = |role: PeriodRole| triple.get(role).short_label();
    let empty = Table::new(Vec::new());
    let last_month = period_rows(&tables, PeriodRole::LastMonth, &engine, &spec, &empty);
    let last_year = period_rows(&tables, PeriodRole::LastYear, &engine, &spec, &empty);
    let latest = period_rows(&tables, PeriodRole::Latest, &engine, &spec, &empty);

    let summary = compare_summaries(
        summarize(&name(PeriodRole::LastMonth), &last_month, columns),
        summarize(&name(PeriodRole::LastYear), &last_year, columns),
        summarize(&name(PeriodRole::Latest), &latest, columns),
    );

    // Leaderboard baselines: year-over-year first, then month-over-month.
    let baselines = [last_year.clone(), last_month.clone()];
    let top_products = top_performers(&latest, &baselines, &columns.product, columns, top_n);
    let top_brands = top_performers(&latest, &baselines, &columns.brand, columns, top_n);

    let period_products = [
        (PeriodRole::LastMonth, &last_month),
        (PeriodRole::LastYear, &last_year),
        (PeriodRole::Latest, &latest),
    ]
    .into_iter()
    .map(|(role, rows)| PeriodProducts {
        name: name(role),
        products: product_totals(rows, &columns.product, columns),
    })
    .collect();

    log_exit!(
        "CMD",
        "get_product_performance",
        "latest rows={} products={}",
        latest.len(),
        top_products.len()
    );
    Ok(ProductPerformance {
        summary,
        baseline_names: vec![name(PeriodRole::LastYear), name(PeriodRole::LastMonth)],
        top_products,
        top_brands,
        period_products,
    })
}
