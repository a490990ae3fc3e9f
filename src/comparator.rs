use crate::{error::BuildError, value::Value};
use std::{fmt, str::FromStr};

/// The fixed table of binary operations a `Comparison` leaf may use,
/// keyed by the short names callers write (`"is"`, `"has"`, ...).
///
/// `Has` reads "left contains right"; `In` is the mirror image,
/// "left is contained in right".
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Comparator {
    Is,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    Has,
    In,
}

impl Comparator {
    pub const ALL: [Self; 8] = [
        Self::Is,
        Self::Ne,
        Self::Gt,
        Self::Ge,
        Self::Lt,
        Self::Le,
        Self::Has,
        Self::In,
    ];

    /// Look up a comparator by name, rejecting anything outside the table.
    pub fn from_name(name: &str) -> Result<Self, BuildError> {
        Self::ALL
            .into_iter()
            .find(|comparator| comparator.name() == name)
            .ok_or_else(|| {
                tracing::debug!(name, "rejected unknown comparator");
                BuildError::UnknownComparator {
                    name: name.to_owned(),
                }
            })
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Is => "is",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Has => "has",
            Self::In => "in",
        }
    }

    /// Apply the comparator to raw values.
    ///
    /// Returns `None` when the operand types are unsupported for this
    /// comparator, never for a plain mismatch.
    #[must_use]
    pub fn apply(self, left: &Value, right: &Value) -> Option<bool> {
        match self {
            Self::Is => Some(left.loose_eq(right)),
            Self::Ne => Some(!left.loose_eq(right)),
            Self::Gt => left.partial_order(right).map(|ord| ord.is_gt()),
            Self::Ge => left.partial_order(right).map(|ord| ord.is_ge()),
            Self::Lt => left.partial_order(right).map(|ord| ord.is_lt()),
            Self::Le => left.partial_order(right).map(|ord| ord.is_le()),
            Self::Has => left.contains(right),
            Self::In => right.contains(left),
        }
    }

    /// Apply the comparator to the lower-cased forms of two text operands.
    ///
    /// Returns `None` unless both operands are text.
    #[must_use]
    pub fn apply_casefold(self, left: &Value, right: &Value) -> Option<bool> {
        let (Value::Text(left), Value::Text(right)) = (left, right) else {
            return None;
        };

        self.apply(
            &Value::Text(left.to_lowercase()),
            &Value::Text(right.to_lowercase()),
        )
    }

    /// Two-stage comparison: case-folded text first, then the raw values.
    ///
    /// A pair unsupported by both stages compares `false`.
    #[must_use]
    pub fn evaluate(self, left: &Value, right: &Value) -> bool {
        if let Some(outcome) = self.apply_casefold(left, right) {
            return outcome;
        }

        tracing::trace!(comparator = %self, "comparing raw operand values");

        self.apply(left, right).unwrap_or(false)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Comparator {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_round_trips_through_the_table() {
        for comparator in Comparator::ALL {
            assert_eq!(Comparator::from_name(comparator.name()).ok(), Some(comparator));
            assert_eq!(comparator.to_string(), comparator.name());
        }
    }

    #[test]
    fn unknown_names_are_rejected() {
        let err = "matches".parse::<Comparator>().unwrap_err();

        assert!(matches!(err, BuildError::UnknownComparator { ref name } if name == "matches"));
        assert!(Comparator::from_name("IS").is_err());
    }

    #[test]
    fn text_compares_case_insensitively() {
        assert!(Comparator::Is.evaluate(&"LA".into(), &"la".into()));
        assert!(Comparator::Has.evaluate(&"Alice Agnew".into(), &"alice".into()));
        assert!(Comparator::In.evaluate(&"sy".into(), &"SYD".into()));
        assert!(!Comparator::Ne.evaluate(&"Red".into(), &"RED".into()));
    }

    #[test]
    fn non_text_falls_back_to_raw_values() {
        let groups = Value::from(vec!["producers", "freelance"]);

        assert!(Comparator::Has.evaluate(&groups, &"freelance".into()));
        assert!(Comparator::In.evaluate(&"freelance".into(), &groups));
        assert!(Comparator::Ge.evaluate(&Value::Int(3), &Value::Int(3)));
        assert!(Comparator::Lt.evaluate(&Value::Int(3), &Value::Float(3.5)));
    }

    #[test]
    fn unsupported_pairs_compare_false() {
        assert!(!Comparator::Gt.evaluate(&"10".into(), &Value::Int(1)));
        assert!(!Comparator::Le.evaluate(&"10".into(), &Value::Int(1)));
        assert!(!Comparator::Has.evaluate(&Value::Int(10), &Value::Int(1)));
        assert!(!Comparator::Lt.evaluate(&Value::Null, &Value::Null));
    }

    #[test]
    fn equality_is_defined_across_types() {
        assert_eq!(Comparator::Is.apply(&"1".into(), &Value::Int(1)), Some(false));
        assert_eq!(Comparator::Ne.apply(&"1".into(), &Value::Int(1)), Some(true));
    }
}
