//! Directory-service (LDAP / Active Directory) rendering of filter trees.
//!
//! Leaves here never test anything in memory; they only [`Emit`] the
//! RFC4515 filter string an external directory client searches with.
//! Attribute names and values are interpolated verbatim. Callers passing
//! untrusted input should run values through [`escape_value`] first.

use std::{borrow::Cow, convert::Infallible, fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::tree::FilterTree;

/// Active Directory `LDAP_MATCHING_RULE_BIT_AND`.
pub const MATCHING_RULE_BIT_AND: &str = "1.2.840.113556.1.4.803";

/// Active Directory `LDAP_MATCHING_RULE_IN_CHAIN` (transitive membership).
pub const MATCHING_RULE_IN_CHAIN: &str = "1.2.840.113556.1.4.1941";

/// `userAccountControl` bit for `ACCOUNTDISABLE`.
pub const ACCOUNT_DISABLED_FLAG: u32 = 0x0002;

/// A filter tree rendered as a directory search filter.
pub type DirectoryFilter = FilterTree<DirectoryTerm>;

/// Organisation-wide settings the directory leaves render against.
/// Every leaf uses the same context; it is never stored on a leaf.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct DirectoryContext {
    /// Second-level domain component, e.g. `example` in `DC=example,DC=com`.
    pub domain: Cow<'static, str>,
    pub tld: Cow<'static, str>,
    pub account_control_attribute: Cow<'static, str>,
    pub account_disabled_flag: u32,
}

impl DirectoryContext {
    pub const DEFAULT: Self = Self {
        domain: Cow::Borrowed("example"),
        tld: Cow::Borrowed("com"),
        account_control_attribute: Cow::Borrowed("userAccountControl"),
        account_disabled_flag: ACCOUNT_DISABLED_FLAG,
    };

    #[must_use]
    pub fn new(domain: impl Into<Cow<'static, str>>, tld: impl Into<Cow<'static, str>>) -> Self {
        Self {
            domain: domain.into(),
            tld: tld.into(),
            ..Self::DEFAULT
        }
    }
}

impl Default for DirectoryContext {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Filter-type token between attribute and value.
///
/// The RFC4515 simple tokens are named; anything else, such as the `:=` of
/// an extensible match, is kept as written and rendered verbatim.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, derive_more::Display)]
pub enum DirectoryOperator {
    #[default]
    #[display("=")]
    Equal,
    #[display("~=")]
    Approx,
    #[display(">=")]
    GreaterOrEqual,
    #[display("<=")]
    LessOrEqual,
    #[display("{_0}")]
    Other(String),
}

impl From<&str> for DirectoryOperator {
    fn from(token: &str) -> Self {
        match token {
            "=" => Self::Equal,
            "~=" => Self::Approx,
            ">=" => Self::GreaterOrEqual,
            "<=" => Self::LessOrEqual,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl FromStr for DirectoryOperator {
    type Err = Infallible;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(token))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AttributeCheck {
    pub attribute: String,
    pub operator: DirectoryOperator,
    pub value: String,
}

/// The closed set of leaves the directory backend renders.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DirectoryTerm {
    /// `(attribute<op>value)`
    Check(AttributeCheck),

    /// Bitwise test of the account-disabled flag.
    AccountDisabled,

    /// Membership of the named group under `CN=Users`. `transitive` follows
    /// nested groups through the in-chain matching rule.
    MemberOf { group: String, transitive: bool },
}

impl From<DirectoryTerm> for DirectoryFilter {
    #[inline]
    fn from(value: DirectoryTerm) -> Self {
        Self::Leaf(value)
    }
}

impl From<AttributeCheck> for DirectoryFilter {
    #[inline]
    fn from(value: AttributeCheck) -> Self {
        Self::Leaf(DirectoryTerm::Check(value))
    }
}

impl fmt::Display for DirectoryTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(&DirectoryContext::DEFAULT, f)
    }
}

impl DirectoryTerm {
    fn render(&self, ctx: &DirectoryContext, f: &mut impl fmt::Write) -> fmt::Result {
        match self {
            Self::Check(AttributeCheck {
                attribute,
                operator,
                value,
            }) => write!(f, "({attribute}{operator}{value})"),
            Self::AccountDisabled => write!(
                f,
                "({}:{MATCHING_RULE_BIT_AND}:={})",
                ctx.account_control_attribute, ctx.account_disabled_flag
            ),
            Self::MemberOf {
                group,
                transitive: false,
            } => write!(
                f,
                "(memberOf=CN={group},CN=Users,DC={},DC={})",
                ctx.domain, ctx.tld
            ),
            Self::MemberOf {
                group,
                transitive: true,
            } => write!(
                f,
                "(memberOf:{MATCHING_RULE_IN_CHAIN}:=CN={group},cn=Users,dc={},dc={})",
                ctx.domain, ctx.tld
            ),
        }
    }
}

/// Serialization backend: render as a directory search filter string.
pub trait Emit {
    fn emit_in(&self, ctx: &DirectoryContext) -> String;

    #[inline]
    fn emit(&self) -> String {
        self.emit_in(&DirectoryContext::DEFAULT)
    }
}

impl Emit for DirectoryTerm {
    fn emit_in(&self, ctx: &DirectoryContext) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = self.render(ctx, &mut out);
        out
    }
}

impl<T> Emit for FilterTree<T>
where
    T: Emit,
{
    fn emit_in(&self, ctx: &DirectoryContext) -> String {
        let filter = self.fold(
            |children, op| format!("({op}{})", children.collect::<String>()),
            |child| format!("(!{child})"),
            |leaf| leaf.emit_in(ctx),
        );

        tracing::trace!(%filter, "emitted directory filter");

        filter
    }
}

/// Account is disabled.
#[must_use]
pub fn is_disabled() -> DirectoryFilter {
    FilterTree::leaf(DirectoryTerm::AccountDisabled)
}

/// Account is enabled: exactly the negation of [`is_disabled`].
#[must_use]
pub fn is_active() -> DirectoryFilter {
    is_disabled().not()
}

/// `(attribute=value)`
#[must_use]
pub fn check(attribute: impl Into<String>, value: impl Into<String>) -> DirectoryFilter {
    AttributeCheck {
        attribute: attribute.into(),
        operator: DirectoryOperator::Equal,
        value: value.into(),
    }
    .into()
}

/// `(attribute<op>value)` with the operator given as its filter token.
///
/// The token is not validated; unknown tokens render exactly as given.
#[must_use]
pub fn check_with(
    attribute: impl Into<String>,
    operator: impl Into<DirectoryOperator>,
    value: impl Into<String>,
) -> DirectoryFilter {
    AttributeCheck {
        attribute: attribute.into(),
        operator: operator.into(),
        value: value.into(),
    }
    .into()
}

#[must_use]
pub fn member_of(group: impl Into<String>, transitive: bool) -> DirectoryFilter {
    FilterTree::leaf(DirectoryTerm::MemberOf {
        group: group.into(),
        transitive,
    })
}

/// Direct members of `group`.
#[must_use]
pub fn child_of(group: impl Into<String>) -> DirectoryFilter {
    member_of(group, false)
}

/// Direct and nested members of `group`.
#[must_use]
pub fn descendant_of(group: impl Into<String>) -> DirectoryFilter {
    member_of(group, true)
}

/// Escape a value for safe interpolation into a filter (RFC4515 §3).
///
/// Returns the input unchanged when nothing needs escaping.
#[must_use]
pub fn escape_value(value: &str) -> Cow<'_, str> {
    if !value.contains(['*', '(', ')', '\\', '\0']) {
        return Cow::Borrowed(value);
    }

    let mut escaped = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            other => escaped.push(other),
        }
    }

    Cow::Owned(escaped)
}
