//! FILENAME: core/comparison-engine/src/report.rs
//! PURPOSE: Presentation-facing helpers: the "no data" result and change formatting.

use crate::filter::ActiveFilter;
use serde::Serialize;

/// Remedy offered when both periods of a comparison come back empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum Suggestion {
    /// A month compared with itself needs distinct per-period day ranges.
    UseDistinctDayRanges,
    /// Per-period days were chosen that the month does not contain.
    SelectExistingDays { month: String, available: Vec<u32> },
    /// Some filters are too narrow.
    BroadenFilters,
    /// Nothing was filtered, so the months themselves have no rows.
    CheckPeriodsExist { months: [String; 2] },
}

impl Suggestion {
    pub fn message(&self) -> String {
        match self {
            Suggestion::UseDistinctDayRanges => {
                "For a same-month comparison, select different days for each period \
                 (for example the first half against the second half)."
                    .to_string()
            }
            Suggestion::SelectExistingDays { month, available } if available.is_empty() => {
                format!("No valid days found in {}.", month)
            }
            Suggestion::SelectExistingDays { month, available } => {
                let days: Vec<String> = available.iter().map(|d| d.to_string()).collect();
                format!(
                    "Available days in {}: {}. Select days that exist in the data.",
                    month,
                    days.join(", ")
                )
            }
            Suggestion::BroadenFilters => {
                "Remove some filters or use Select All to broaden the selection.".to_string()
            }
            Suggestion::CheckPeriodsExist { months } => format!(
                "No data found in either {} or {}. Verify the data contains these months.",
                months[0], months[1]
            ),
        }
    }
}

/// A comparison in which both periods were empty after filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoDataReport {
    pub same_month: bool,
    pub active_filters: Vec<ActiveFilter>,
    pub suggestion: Suggestion,
}

impl NoDataReport {
    /// Picks the suggestion for an empty result.
    ///
    /// `available_days` lists the days present in the first month and is
    /// consulted only when per-period day filters were active.
    pub fn build(
        months: [&str; 2],
        active_filters: Vec<ActiveFilter>,
        available_days: impl FnOnce() -> Vec<u32>,
    ) -> Self {
        let same_month = months[0] == months[1];
        let has_period_days = active_filters.iter().any(|f| f.period.is_some());

        let suggestion = if same_month {
            if active_filters.is_empty() {
                Suggestion::UseDistinctDayRanges
            } else if has_period_days {
                Suggestion::SelectExistingDays {
                    month: months[0].to_string(),
                    available: available_days(),
                }
            } else {
                Suggestion::BroadenFilters
            }
        } else if active_filters.is_empty() {
            Suggestion::CheckPeriodsExist {
                months: [months[0].to_string(), months[1].to_string()],
            }
        } else {
            Suggestion::BroadenFilters
        };

        NoDataReport {
            same_month,
            active_filters,
            suggestion,
        }
    }

    pub fn message(&self) -> String {
        let mut msg = String::from("No data available for the selected criteria in either period.");
        if !self.active_filters.is_empty() {
            let applied: Vec<String> = self.active_filters.iter().map(|f| f.describe()).collect();
            msg.push_str(&format!(" Applied filters: {}.", applied.join("; ")));
        }
        msg.push(' ');
        msg.push_str(&self.suggestion.message());
        msg
    }
}

// ============================================================================
// CHANGE FORMATTING
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeDirection {
    Positive,
    Negative,
    Neutral,
}

impl ChangeDirection {
    pub fn of(value: f64) -> Self {
        if value > 0.0 {
            ChangeDirection::Positive
        } else if value < 0.0 {
            ChangeDirection::Negative
        } else {
            ChangeDirection::Neutral
        }
    }
}

/// `"+12.3%"`, `"-4.0%"`, or `"0.0%"` for zero and NaN.
pub fn format_percentage(value: f64) -> String {
    match ChangeDirection::of(value) {
        ChangeDirection::Positive => format!("+{:.1}%", value),
        ChangeDirection::Negative => format!("{:.1}%", value),
        ChangeDirection::Neutral => "0.0%".to_string(),
    }
}

/// Formats an optional baseline change, using `missing` for `None`.
pub fn format_optional_percentage(value: Option<f64>, missing: &str) -> String {
    value.map_or_else(|| missing.to_string(), format_percentage)
}
