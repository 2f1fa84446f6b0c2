//! Relation categories
//!
//! Seven categories a member can be expanded into:
//! - `Parents`, `Children`, `Partner`: one step over a stored link
//! - `Siblings`, `AuntsAndUncles`, `Grandparents`: two steps
//! - `Cousins`: three steps

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Relative category requested from the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Parents,
    Children,
    Partner,
    Siblings,
    Cousins,
    AuntsAndUncles,
    Grandparents,
}

impl Relation {
    /// Get the string representation of the relation
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Parents => "parents",
            Relation::Children => "children",
            Relation::Partner => "partner",
            Relation::Siblings => "siblings",
            Relation::Cousins => "cousins",
            Relation::AuntsAndUncles => "aunts_and_uncles",
            Relation::Grandparents => "grandparents",
        }
    }

    /// Human-readable label, e.g. "Anna doesn't have any aunts or uncles"
    pub fn label(&self) -> &'static str {
        match self {
            Relation::AuntsAndUncles => "aunts or uncles",
            other => other.as_str(),
        }
    }

    /// Get all relations, in menu order
    pub fn all() -> &'static [Relation] {
        &[
            Relation::Parents,
            Relation::Children,
            Relation::Partner,
            Relation::Siblings,
            Relation::Cousins,
            Relation::AuntsAndUncles,
            Relation::Grandparents,
        ]
    }

    /// Relation for a 1-based menu position
    pub fn from_choice(choice: usize) -> Option<Relation> {
        choice.checked_sub(1).and_then(|i| Self::all().get(i)).copied()
    }
}

impl FromStr for Relation {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        if let Ok(choice) = normalized.parse::<usize>() {
            return Self::from_choice(choice)
                .ok_or_else(|| crate::Error::Validation(format!("Unknown relation: {}", s)));
        }
        match normalized.as_str() {
            "parents" | "parent" => Ok(Relation::Parents),
            "children" | "child" | "kids" => Ok(Relation::Children),
            "partner" | "spouse" => Ok(Relation::Partner),
            "siblings" | "sibling" => Ok(Relation::Siblings),
            "cousins" | "cousin" => Ok(Relation::Cousins),
            "aunts_and_uncles" | "aunts_or_uncles" | "aunts" | "uncles" => Ok(Relation::AuntsAndUncles),
            "grandparents" | "grandparent" => Ok(Relation::Grandparents),
            _ => Err(crate::Error::Validation(format!("Unknown relation: {}", s))),
        }
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relation_roundtrip() {
        for relation in Relation::all() {
            let parsed: Relation = relation.as_str().parse().unwrap();
            assert_eq!(*relation, parsed);
            let from_label: Relation = relation.label().parse().unwrap();
            assert_eq!(*relation, from_label);
        }
    }

    #[test]
    fn test_menu_choices() {
        assert_eq!(Relation::from_choice(1), Some(Relation::Parents));
        assert_eq!(Relation::from_choice(3), Some(Relation::Partner));
        assert_eq!(Relation::from_choice(7), Some(Relation::Grandparents));
        assert_eq!(Relation::from_choice(0), None);
        assert_eq!(Relation::from_choice(8), None);
        assert_eq!("6".parse::<Relation>().unwrap(), Relation::AuntsAndUncles);
        assert!("9".parse::<Relation>().is_err());
    }

    #[test]
    fn test_labels() {
        assert_eq!(Relation::AuntsAndUncles.label(), "aunts or uncles");
        assert_eq!(Relation::Cousins.to_string(), "cousins");
    }
}
