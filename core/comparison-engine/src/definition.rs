//! FILENAME: core/comparison-engine/src/definition.rs
//! Comparison Definition - The serializable description of what to filter.
//!
//! This module contains the types that DESCRIBE a filter pass:
//! - Which dimensions exist and which columns back them
//! - Per-dimension selections (`Selection`)
//! - The full `FilterSpec`, including per-period day selections
//!
//! Nothing here touches row data; resolution happens in `filter`.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// UI pseudo-value meaning "every currently known value of this dimension".
pub const SELECT_ALL: &str = "SELECT_ALL";

// ============================================================================
// DIMENSIONS
// ============================================================================

/// A filterable dimension. Declaration order is the order filters are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Day,
    Week,
    Brand,
    Category,
    Idg,
    Type,
    Item,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::Day,
        Dimension::Week,
        Dimension::Brand,
        Dimension::Category,
        Dimension::Idg,
        Dimension::Type,
        Dimension::Item,
    ];

    /// Day and week compare numerically; everything else by exact string.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Dimension::Day | Dimension::Week)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Dimension::Day => "Day",
            Dimension::Week => "Week",
            Dimension::Brand => "Brand",
            Dimension::Category => "Category",
            Dimension::Idg => "IDG",
            Dimension::Type => "Type",
            Dimension::Item => "Item",
        }
    }
}

/// Column backing each dimension. Dashboards over different source layouts
/// differ only in this mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DimensionColumns {
    pub day: String,
    pub week: String,
    pub brand: String,
    pub category: String,
    pub idg: String,
    pub type_: String,
    pub item: String,
}

impl Default for DimensionColumns {
    fn default() -> Self {
        DimensionColumns {
            day: "Day".to_string(),
            week: "Week".to_string(),
            brand: "Brand".to_string(),
            category: "Category".to_string(),
            idg: "idg".to_string(),
            type_: "TYPE".to_string(),
            item: "Item name".to_string(),
        }
    }
}

impl DimensionColumns {
    pub fn column(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Day => &self.day,
            Dimension::Week => &self.week,
            Dimension::Brand => &self.brand,
            Dimension::Category => &self.category,
            Dimension::Idg => &self.idg,
            Dimension::Type => &self.type_,
            Dimension::Item => &self.item,
        }
    }
}

// ============================================================================
// SELECTION
// ============================================================================

/// What the user picked for one dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    /// Every value known for the dimension when the filter pass starts.
    AllKnown,
    /// A literal set of values.
    Explicit(BTreeSet<String>),
}

impl Selection {
    /// Builds a selection from raw UI values. Blank entries are ignored; any
    /// `SELECT_ALL` entry makes the whole selection `AllKnown`. Returns `None`
    /// when nothing remains (the dimension is unfiltered).
    pub fn from_raw<I, S>(values: I) -> Option<Selection>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut explicit = BTreeSet::new();
        let mut all_known = false;
        for value in values {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }
            if value == SELECT_ALL {
                all_known = true;
            } else {
                explicit.insert(value.to_string());
            }
        }

        if all_known {
            Some(Selection::AllKnown)
        } else if explicit.is_empty() {
            None
        } else {
            Some(Selection::Explicit(explicit))
        }
    }

    pub fn explicit<I, S>(values: I) -> Selection
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Selection::Explicit(values.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// FILTER SPEC
// ============================================================================

/// A complete set of filter selections for one comparison.
///
/// `shared` selections apply to every period. `period_days[i]` is a day
/// selection for period `i` alone (used when a month is compared with itself);
/// when either is active the shared day filter is suppressed for both periods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub shared: BTreeMap<Dimension, Selection>,
    pub period_days: [Option<Selection>; 2],
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dimension: Dimension, selection: Selection) -> Self {
        self.shared.insert(dimension, selection);
        self
    }

    /// Adds a selection from raw UI values; an empty list leaves the dimension unfiltered.
    pub fn with_raw<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        match Selection::from_raw(values) {
            Some(selection) => {
                self.shared.insert(dimension, selection);
            }
            None => {
                self.shared.remove(&dimension);
            }
        }
        self
    }

    pub fn with_period_days<I, S>(mut self, period: usize, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if let Some(slot) = self.period_days.get_mut(period) {
            *slot = Selection::from_raw(values);
        }
        self
    }

    /// The same spec with one shared dimension removed (leave-one-out).
    pub fn without(&self, dimension: Dimension) -> FilterSpec {
        let mut spec = self.clone();
        spec.shared.remove(&dimension);
        spec
    }

    pub fn selection(&self, dimension: Dimension) -> Option<&Selection> {
        self.shared.get(&dimension)
    }

    pub fn has_period_days(&self) -> bool {
        self.period_days.iter().any(Option::is_some)
    }

    pub fn is_empty(&self) -> bool {
        self.shared.is_empty() && !self.has_period_days()
    }
}
