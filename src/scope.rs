use serde::Serialize;
use std::fmt;

/// GHG Protocol scope buckets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Scope {
    /// Scope 1: direct emissions
    Direct,
    /// Scope 2: indirect emissions from purchased energy
    EnergyIndirect,
    /// Scope 3: all other indirect emissions
    OtherIndirect,
}

pub const ALL_SCOPES: [Scope; 3] = [Scope::Direct, Scope::EnergyIndirect, Scope::OtherIndirect];

/// Words that introduce a scope label in the inventory template.
const SCOPE_WORDS: [&str; 2] = ["Alcance", "Scope"];

impl Scope {
    pub fn number(self) -> u8 {
        match self {
            Scope::Direct => 1,
            Scope::EnergyIndirect => 2,
            Scope::OtherIndirect => 3,
        }
    }

    /// Label prefixes that identify the scope, e.g. `Alcance 1` / `Scope 1`.
    pub fn prefixes(self) -> [String; 2] {
        SCOPE_WORDS.map(|word| format!("{} {}", word, self.number()))
    }

    /// True when `label` starts with one of the scope prefixes and the number
    /// is not the start of a longer one (`Alcance 10` is not Scope 1).
    pub fn matches(self, label: &str) -> bool {
        self.prefixes().iter().any(|prefix| {
            label
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| !rest.starts_with(|c: char| c.is_ascii_digit()))
        })
    }

    /// True when the prefix occurs anywhere in `label`. The detail sheet
    /// sometimes carries decorated scope labels such as `Total Alcance 1`.
    pub fn mentioned_in(self, label: &str) -> bool {
        self.prefixes().iter().any(|prefix| label.contains(prefix.as_str()))
    }

    /// The scope a category label belongs to, if any.
    pub fn of_label(label: &str) -> Option<Scope> {
        ALL_SCOPES.into_iter().find(|scope| scope.matches(label))
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Alcance {}", self.number())
    }
}

/// True for summary rows that head a scope section rather than name a category.
pub fn is_scope_heading(label: &str) -> bool {
    SCOPE_WORDS.iter().any(|word| label.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_match_in_both_languages() {
        assert_eq!(Scope::of_label("Alcance 1"), Some(Scope::Direct));
        assert_eq!(Scope::of_label("Scope 2 - Electricity"), Some(Scope::EnergyIndirect));
        assert_eq!(Scope::of_label("Alcance 3: Otras"), Some(Scope::OtherIndirect));
        assert_eq!(Scope::of_label("1.1 - Combustión estacionaria"), None);
        assert_eq!(Scope::of_label("Alcance 10"), None);
        assert_eq!(Scope::of_label("alcance 1"), None);
    }

    #[test]
    fn each_label_has_at_most_one_scope() {
        for label in ["Alcance 1", "Alcance 2", "Scope 3", "Total", "Alcance 12"] {
            let hits = ALL_SCOPES.iter().filter(|s| s.matches(label)).count();
            assert!(hits <= 1, "{} matched {} scopes", label, hits);
        }
    }

    #[test]
    fn headings() {
        assert!(is_scope_heading("Alcance 2"));
        assert!(!is_scope_heading("2.1 - Compra de energía"));
        assert!(Scope::Direct.mentioned_in("Emisiones Alcance 1"));
    }
}
