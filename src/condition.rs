use std::{fmt, sync::Arc};

use regex::Regex;

use crate::{
    comparator::Comparator,
    error::{BuildError, EvalError},
    tree::FilterTree,
    value::{Record, Value},
    Predicate,
};

/// A filter tree over in-memory records of type `R`.
pub type Filter<R> = FilterTree<Condition<R>>;

/// `candidate[property] <comparator> value`, under the two-stage
/// comparison policy of [`Comparator::evaluate`].
#[derive(Clone, Debug, PartialEq)]
pub struct Comparison {
    property: String,
    comparator: Comparator,
    value: Value,
}

impl Comparison {
    /// Build a comparison from a comparator name such as `"is"` or `"has"`.
    pub fn new(
        property: impl Into<String>,
        comparator: &str,
        value: impl Into<Value>,
    ) -> Result<Self, BuildError> {
        Ok(Self::with_comparator(
            property,
            Comparator::from_name(comparator)?,
            value,
        ))
    }

    #[must_use]
    pub fn with_comparator(
        property: impl Into<String>,
        comparator: Comparator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            property: property.into(),
            comparator,
            value: value.into(),
        }
    }

    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[must_use]
    pub const fn comparator(&self) -> Comparator {
        self.comparator
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }
}

impl<R> Predicate<R> for Comparison
where
    R: Record + ?Sized,
{
    fn test(&self, candidate: &R) -> Result<bool, EvalError> {
        let actual = candidate
            .field(&self.property)
            .ok_or_else(|| EvalError::missing_field(&self.property))?;

        Ok(self.comparator.evaluate(&actual, &self.value))
    }
}

/// Searches a property for a pattern anywhere in its value. Unset values
/// (see [`Value::is_truthy`]) never match.
#[derive(Clone, Debug)]
pub struct RegexMatch {
    property: String,
    pattern: Regex,
}

impl RegexMatch {
    pub fn new(property: impl Into<String>, pattern: &str) -> Result<Self, BuildError> {
        let pattern = Regex::new(pattern).map_err(|source| {
            tracing::debug!(pattern, error = %source, "rejected regex pattern");
            BuildError::InvalidPattern {
                pattern: pattern.to_owned(),
                source,
            }
        })?;

        Ok(Self {
            property: property.into(),
            pattern,
        })
    }

    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    // Lists match when any element does; scalars are searched in their
    // rendered form.
    fn is_match(&self, value: &Value) -> bool {
        match value {
            Value::Text(text) => self.pattern.is_match(text),
            Value::List(items) => items.iter().any(|item| self.is_match(item)),
            other => self.pattern.is_match(&other.to_string()),
        }
    }
}

impl PartialEq for RegexMatch {
    fn eq(&self, other: &Self) -> bool {
        self.property == other.property && self.pattern() == other.pattern()
    }
}

impl<R> Predicate<R> for RegexMatch
where
    R: Record + ?Sized,
{
    fn test(&self, candidate: &R) -> Result<bool, EvalError> {
        let value = candidate
            .field(&self.property)
            .ok_or_else(|| EvalError::missing_field(&self.property))?;

        if !value.is_truthy() {
            return Ok(false);
        }

        Ok(self.is_match(&value))
    }
}

/// Wraps an arbitrary test. Cloning shares the closure.
pub struct Lambda<R: ?Sized>(Arc<dyn Fn(&R) -> bool + Send + Sync>);

impl<R: ?Sized> Lambda<R> {
    pub fn new(test: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(test))
    }
}

impl<R: ?Sized> Clone for Lambda<R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<R: ?Sized> fmt::Debug for Lambda<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Lambda(..)")
    }
}

// Closures have no equality; two lambdas are equal only when they share one.
impl<R: ?Sized> PartialEq for Lambda<R> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<R: ?Sized> Predicate<R> for Lambda<R> {
    #[inline]
    fn test(&self, candidate: &R) -> Result<bool, EvalError> {
        Ok((self.0)(candidate))
    }
}

/// The closed set of leaves the evaluation backend understands.
pub enum Condition<R: ?Sized> {
    Compare(Comparison),
    Regex(RegexMatch),
    Constant(bool),
    Lambda(Lambda<R>),
}

impl<R: ?Sized> Condition<R> {
    pub fn check(
        property: impl Into<String>,
        comparator: &str,
        value: impl Into<Value>,
    ) -> Result<Self, BuildError> {
        Comparison::new(property, comparator, value).map(Self::Compare)
    }

    pub fn regex(property: impl Into<String>, pattern: &str) -> Result<Self, BuildError> {
        RegexMatch::new(property, pattern).map(Self::Regex)
    }

    #[must_use]
    pub const fn constant(outcome: bool) -> Self {
        Self::Constant(outcome)
    }

    pub fn lambda(test: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        Self::Lambda(Lambda::new(test))
    }
}

impl<R: ?Sized> Clone for Condition<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Compare(comparison) => Self::Compare(comparison.clone()),
            Self::Regex(regex) => Self::Regex(regex.clone()),
            Self::Constant(outcome) => Self::Constant(*outcome),
            Self::Lambda(lambda) => Self::Lambda(lambda.clone()),
        }
    }
}

impl<R: ?Sized> fmt::Debug for Condition<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Compare(comparison) => f.debug_tuple("Compare").field(comparison).finish(),
            Self::Regex(regex) => f.debug_tuple("Regex").field(regex).finish(),
            Self::Constant(outcome) => f.debug_tuple("Constant").field(outcome).finish(),
            Self::Lambda(lambda) => fmt::Debug::fmt(lambda, f),
        }
    }
}

impl<R: ?Sized> PartialEq for Condition<R> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Compare(a), Self::Compare(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a == b,
            (Self::Constant(a), Self::Constant(b)) => a == b,
            (Self::Lambda(a), Self::Lambda(b)) => a == b,
            _ => false,
        }
    }
}

impl<R: ?Sized> From<Comparison> for Condition<R> {
    fn from(value: Comparison) -> Self {
        Self::Compare(value)
    }
}

impl<R: ?Sized> From<RegexMatch> for Condition<R> {
    fn from(value: RegexMatch) -> Self {
        Self::Regex(value)
    }
}

impl<R: ?Sized> From<Lambda<R>> for Condition<R> {
    fn from(value: Lambda<R>) -> Self {
        Self::Lambda(value)
    }
}

impl<R: ?Sized> From<Condition<R>> for FilterTree<Condition<R>> {
    #[inline]
    fn from(value: Condition<R>) -> Self {
        Self::Leaf(value)
    }
}

impl<R> Predicate<R> for Condition<R>
where
    R: Record + ?Sized,
{
    fn test(&self, candidate: &R) -> Result<bool, EvalError> {
        match self {
            Self::Compare(comparison) => comparison.test(candidate),
            Self::Regex(regex) => regex.test(candidate),
            Self::Constant(outcome) => Ok(*outcome),
            Self::Lambda(lambda) => lambda.test(candidate),
        }
    }
}
