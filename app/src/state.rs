//! FILENAME: app/src/state.rs
// PURPOSE: Process-wide dashboard state.
// CONTEXT: The base table and period tables are immutable once loaded and
// shared through `Arc`. Week numbers depend on the selected first weekday, so
// the week-derived copies are rebuilt whenever that weekday changes and
// replaced as a whole.

use crate::config::DashboardConfig;
use dataset::calendar::MonthYear;
use dataset::{log_info, with_week_column, Table};
use persistence::PeriodTable;
use std::sync::{Arc, Mutex};

/// Tables carrying a week column derived for `first_weekday`.
#[derive(Debug, Clone)]
pub struct WeekTables {
    pub first_weekday: u8,
    pub base: Option<Arc<Table>>,
    pub periods: Arc<Vec<PeriodTable>>,
}

pub struct DashboardState {
    pub config: Mutex<DashboardConfig>,
    /// Combined dataset of the month comparison dashboard.
    pub base_table: Mutex<Option<Arc<Table>>>,
    /// Why `base_table` is absent after a load.
    pub empty_reason: Mutex<Option<String>>,
    /// Anchor month of the product dashboard.
    pub latest_month: Mutex<Option<MonthYear>>,
    /// Prepared period tables, in presentation order.
    pub period_tables: Mutex<Arc<Vec<PeriodTable>>>,
    pub first_weekday: Mutex<u8>,
    pub week_tables: Mutex<Option<WeekTables>>,
}

pub fn create_dashboard_state(config: DashboardConfig) -> DashboardState {
    log_info!("STATE", "Creating DashboardState");
    let first_weekday = config.first_weekday;
    DashboardState {
        config: Mutex::new(config),
        base_table: Mutex::new(None),
        empty_reason: Mutex::new(None),
        latest_month: Mutex::new(None),
        period_tables: Mutex::new(Arc::new(Vec::new())),
        first_weekday: Mutex::new(first_weekday),
        week_tables: Mutex::new(None),
    }
}

fn lock_err<T>(e: std::sync::PoisonError<T>) -> String {
    format!("Lock error: {}", e)
}

impl DashboardState {
    pub fn config(&self) -> Result<DashboardConfig, String> {
        Ok(self.config.lock().map_err(lock_err)?.clone())
    }

    pub fn base_table(&self) -> Result<Option<Arc<Table>>, String> {
        Ok(self.base_table.lock().map_err(lock_err)?.clone())
    }

    pub fn latest_month(&self) -> Result<Option<MonthYear>, String> {
        Ok(*self.latest_month.lock().map_err(lock_err)?)
    }

    pub fn period_tables(&self) -> Result<Arc<Vec<PeriodTable>>, String> {
        Ok(self.period_tables.lock().map_err(lock_err)?.clone())
    }

    pub fn current_first_weekday(&self) -> Result<u8, String> {
        Ok(*self.first_weekday.lock().map_err(lock_err)?)
    }

    /// Replaces everything loaded so far. Week tables are rebuilt lazily.
    pub fn replace_data(
        &self,
        base: Option<Table>,
        empty_reason: Option<String>,
        latest_month: Option<MonthYear>,
        periods: Vec<PeriodTable>,
        first_weekday: u8,
    ) -> Result<(), String> {
        *self.base_table.lock().map_err(lock_err)? = base.map(Arc::new);
        *self.empty_reason.lock().map_err(lock_err)? = empty_reason;
        *self.latest_month.lock().map_err(lock_err)? = latest_month;
        *self.period_tables.lock().map_err(lock_err)? = Arc::new(periods);
        *self.first_weekday.lock().map_err(lock_err)? = first_weekday;
        *self.week_tables.lock().map_err(lock_err)? = None;
        Ok(())
    }

    pub fn set_first_weekday(&self, first_weekday: u8) -> Result<(), String> {
        if first_weekday > 6 {
            return Err(format!(
                "first weekday must be 0 (Monday) .. 6 (Sunday), got {}",
                first_weekday
            ));
        }
        *self.first_weekday.lock().map_err(lock_err)? = first_weekday;
        Ok(())
    }

    /// The week-derived tables for the current first weekday, rebuilding them
    /// when the weekday changed since they were last derived.
    pub fn week_tables(&self) -> Result<WeekTables, String> {
        let first_weekday = self.current_first_weekday()?;
        if let Some(current) = self.week_tables.lock().map_err(lock_err)?.as_ref() {
            if current.first_weekday == first_weekday {
                return Ok(current.clone());
            }
        }

        let config = self.config()?;
        let base = match self.base_table()? {
            Some(table) => Some(Arc::new(
                with_week_column(
                    &table,
                    &config.dimension_columns.day,
                    &config.dimension_columns.week,
                    first_weekday,
                )
                .map_err(|e| e.to_string())?,
            )),
            None => None,
        };

        let periods = self
            .period_tables()?
            .iter()
            .map(|p| {
                let table = with_week_column(
                    &p.table,
                    &config.product_columns.day,
                    &config.product_columns.week,
                    first_weekday,
                )
                .map_err(|e| e.to_string())?;
                Ok(PeriodTable {
                    period: p.period.clone(),
                    table,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;

        log_info!(
            "STATE",
            "derived week columns for first weekday {} ({} period tables)",
            first_weekday,
            periods.len()
        );

        let derived = WeekTables {
            first_weekday,
            base,
            periods: Arc::new(periods),
        };
        *self.week_tables.lock().map_err(lock_err)? = Some(derived.clone());
        Ok(derived)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset::CellValue;

    fn day_table() -> Table {
        let mut t = Table::new(vec!["Day".into(), "Category".into()]);
        t.push_row(vec![1.0.into(), "Shoes".into()]);
        t.push_row(vec![2.0.into(), "Shoes".into()]);
        t.push_row(vec![9.0.into(), "Bags".into()]);
        t
    }

    #[test]
    fn week_tables_follow_first_weekday() {
        let state = create_dashboard_state(DashboardConfig::default());
        state
            .replace_data(Some(day_table()), None, None, Vec::new(), 6)
            .unwrap();

        let sunday = state.week_tables().unwrap();
        let base = sunday.base.unwrap();
        assert_eq!(base.value(1, "Week"), &CellValue::Number(2.0));

        state.set_first_weekday(0).unwrap();
        let monday = state.week_tables().unwrap();
        assert_eq!(monday.first_weekday, 0);
        assert_eq!(monday.base.unwrap().value(1, "Week"), &CellValue::Number(1.0));
    }

    #[test]
    fn unchanged_weekday_reuses_tables() {
        let state = create_dashboard_state(DashboardConfig::default());
        state
            .replace_data(Some(day_table()), None, None, Vec::new(), 3)
            .unwrap();
        let first = state.week_tables().unwrap();
        let second = state.week_tables().unwrap();
        assert!(Arc::ptr_eq(first.base.as_ref().unwrap(), second.base.as_ref().unwrap()));
    }

    #[test]
    fn out_of_range_weekday_is_rejected() {
        let state = create_dashboard_state(DashboardConfig::default());
        assert!(state.set_first_weekday(7).is_err());
        assert_eq!(state.current_first_weekday().unwrap(), 0);
    }
}
