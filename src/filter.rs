use crate::record::DetailRow;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Multi-select over one label column. `All` is the default selection.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<String>),
}

impl Selection {
    /// Build a selection from submitted values; nothing submitted means all.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() { Selection::All } else { Selection::Only(set) }
    }

    pub fn contains(&self, label: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.contains(label),
        }
    }
}

/// Scope and category filter for the detail table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailFilter {
    pub scopes: Selection,
    pub categories: Selection,
}

impl DetailFilter {
    pub fn accepts(&self, row: &DetailRow) -> bool {
        self.scopes.contains(&row.scope) && self.categories.contains(&row.category)
    }

    /// Rows passing the filter, in their original order.
    pub fn apply<'a>(&self, rows: &'a [DetailRow]) -> Vec<&'a DetailRow> {
        rows.iter().filter(|row| self.accepts(row)).collect()
    }
}

/// Sorted distinct scope labels, the options of the scope selector.
pub fn scope_options(rows: &[DetailRow]) -> Vec<String> {
    distinct(rows.iter().map(|r| r.scope.as_str()))
}

/// Sorted distinct category labels, the options of the category selector.
pub fn category_options(rows: &[DetailRow]) -> Vec<String> {
    distinct(rows.iter().map(|r| r.category.as_str()))
}

fn distinct<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    labels
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}
