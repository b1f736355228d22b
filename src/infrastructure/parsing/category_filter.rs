//! Post-filter for normalized specification categories
//!
//! The product pages sometimes render all headers of a table into a single
//! cell (e.g. `DISPOSITIVOMARCAMODELO...`) and dump whole paragraphs into one
//! value. [`MergedHeaderFilter`] drops those artifacts; other sites can plug
//! in their own [`CategoryFilter`].

use std::collections::HashSet;
use std::fmt::Debug;
use tracing::debug;

use super::spec_normalizer::CANONICAL_CATEGORIES;
use crate::domain::SpecTable;

/// Strategy deciding which categories and values survive normalization
pub trait CategoryFilter: Send + Sync + Debug {
    fn keep_category(&self, name: &str) -> bool;

    fn keep_value(&self, value: &str) -> bool;

    /// Drop rejected categories, then rejected and duplicate values
    fn apply(&self, specs: &SpecTable) -> SpecTable {
        let mut filtered = SpecTable::new();

        for (name, values) in specs.iter() {
            if !self.keep_category(name) {
                debug!("Dropping spec category '{}'", name);
                continue;
            }

            let mut seen = HashSet::new();
            let kept: Vec<String> = values
                .iter()
                .filter(|value| self.keep_value(value))
                .filter(|value| seen.insert(value.as_str()))
                .cloned()
                .collect();
            filtered.extend(name, kept);
        }

        filtered
    }
}

/// Length and containment heuristics for concatenated headers and values
#[derive(Debug, Clone)]
pub struct MergedHeaderFilter {
    pub max_name_len: usize,
    /// A name containing a canonical category plus more than this many characters is dropped
    pub max_extra_chars: usize,
    pub max_value_len: usize,
    pub canonical: Vec<String>,
}

impl Default for MergedHeaderFilter {
    fn default() -> Self {
        Self {
            max_name_len: 25,
            max_extra_chars: 5,
            max_value_len: 100,
            canonical: CANONICAL_CATEGORIES.iter().map(|c| (*c).to_string()).collect(),
        }
    }
}

impl CategoryFilter for MergedHeaderFilter {
    fn keep_category(&self, name: &str) -> bool {
        let len = name.chars().count();
        if len > self.max_name_len {
            return false;
        }

        let upper = name.to_uppercase();
        !self.canonical.iter().any(|canonical| {
            upper != *canonical
                && upper.contains(canonical.as_str())
                && len.saturating_sub(canonical.chars().count()) > self.max_extra_chars
        })
    }

    fn keep_value(&self, value: &str) -> bool {
        !value.is_empty() && !value.contains('\n') && value.chars().count() <= self.max_value_len
    }
}
