use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    fmt,
};

/// Runtime value of a candidate field, or the right-hand side of a
/// comparison. Deliberately loose: the comparison policy decides which
/// pairs of variants can be compared.
#[derive(Clone, Debug, PartialEq, derive_more::From)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    /// Whether the value counts as "set" for regex matching.
    ///
    /// `Null`, `false`, zero, empty text and empty lists are falsy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(flag) => *flag,
            Self::Int(n) => *n != 0,
            Self::Float(n) => *n != 0.0,
            Self::Text(text) => !text.is_empty(),
            Self::List(items) => !items.is_empty(),
        }
    }

    /// Booleans, integers and floats share one numeric family, with
    /// `true` as 1 and `false` as 0.
    fn as_number(&self) -> Option<Number> {
        match self {
            Self::Bool(flag) => Some(Number::Int(i64::from(*flag))),
            Self::Int(n) => Some(Number::Int(*n)),
            Self::Float(n) => Some(Number::Float(*n)),
            _ => None,
        }
    }

    /// Equality that is defined for every pair of values.
    ///
    /// Numeric values (including booleans) compare numerically; any other
    /// mix of variants is unequal.
    #[must_use]
    pub fn loose_eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.compare(b) == Some(Ordering::Equal);
        }

        match (self, other) {
            (Self::List(a), Self::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(a, b)| a.loose_eq(b))
            }
            _ => self == other,
        }
    }

    /// Ordering within a family of comparable values.
    ///
    /// Returns `None` when the pair has no meaningful order (mixed families,
    /// nulls, or NaN).
    #[must_use]
    pub fn partial_order(&self, other: &Self) -> Option<Ordering> {
        if let (Some(a), Some(b)) = (self.as_number(), other.as_number()) {
            return a.compare(b);
        }

        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::List(a), Self::List(b)) => {
                for (left, right) in a.iter().zip(b) {
                    if !left.loose_eq(right) {
                        return left.partial_order(right);
                    }
                }

                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        }
    }

    /// Containment test: substring for text, element equality for lists.
    #[must_use]
    pub fn contains(&self, needle: &Self) -> Option<bool> {
        match (self, needle) {
            (Self::Text(haystack), Self::Text(needle)) => {
                Some(haystack.contains(needle.as_str()))
            }
            (Self::List(items), needle) => {
                Some(items.iter().any(|item| item.loose_eq(needle)))
            }
            _ => None,
        }
    }
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    #[allow(clippy::cast_precision_loss)]
    fn compare(self, other: Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(&b)),
            (Self::Int(a), Self::Float(b)) => (a as f64).partial_cmp(&b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(b as f64)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(&b),
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<Vec<&str>> for Value {
    fn from(values: Vec<&str>) -> Self {
        Self::List(values.into_iter().map(Self::from).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(flag) => write!(f, "{flag}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
            Self::List(items) => {
                let mut items = items.iter();
                if let Some(first) = items.next() {
                    write!(f, "{first}")?;
                }
                for item in items {
                    write!(f, ",{item}")?;
                }
                Ok(())
            }
        }
    }
}

/// Anything that can hand out a field value by name. This is the only
/// structural requirement the evaluation backend places on candidates;
/// implement it with a `match` over field names for plain structs.
pub trait Record {
    fn field(&self, name: &str) -> Option<Value>;
}

impl<R> Record for &R
where
    R: Record + ?Sized,
{
    #[inline]
    fn field(&self, name: &str) -> Option<Value> {
        R::field(self, name)
    }
}

impl Record for BTreeMap<String, Value> {
    #[inline]
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl<S> Record for HashMap<String, Value, S>
where
    S: std::hash::BuildHasher,
{
    #[inline]
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}
