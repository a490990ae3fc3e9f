#![crate_name = "dirfilter"]

//! Composable Boolean filter trees with two interpretations.
//!
//! A [`FilterTree`] combines leaf conditions through conjunction (`All`),
//! disjunction (`Any`) and negation (`Not`). Trees are built with the
//! constructors ([`FilterTree::all`], [`FilterTree::any`],
//! [`FilterTree::negation`]) or fluently ([`FilterTree::and`],
//! [`FilterTree::or`], [`FilterTree::not`]), and are immutable afterwards.
//!
//! The leaf type picks the backend:
//!
//! - [`Filter<R>`] (leaves of type [`Condition`]) tests in-memory records
//!   through [`Predicate::test`] and [`Predicate::filter_list`]. Records
//!   expose their fields by name via [`Record`].
//! - [`DirectoryFilter`] (leaves of type [`DirectoryTerm`]) renders an
//!   LDAP / Active Directory search filter through [`Emit::emit`].
//!
//! ```
//! use dirfilter::{child_of, is_active, Emit};
//!
//! let filter = is_active().and([child_of("staff")]);
//! assert_eq!(
//!     filter.emit(),
//!     "(&(!(userAccountControl:1.2.840.113556.1.4.803:=2))\
//!      (memberOf=CN=staff,CN=Users,DC=example,DC=com))",
//! );
//! ```
//!
//! ## Feature flags
//!
//! - `serde`: Enables serialization and deserialization of
//!   [`DirectoryContext`], so the naming context can come from a config file.
#![doc(html_root_url = "https://docs.rs/dirfilter/0.1.0/")]

mod comparator;
mod condition;
mod directory;
mod error;
mod predicate;
mod tree;
mod value;

pub use comparator::*;
pub use condition::*;
pub use directory::*;
pub use error::*;
pub use predicate::*;
pub use tree::*;
pub use value::*;
