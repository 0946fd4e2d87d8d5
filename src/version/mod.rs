//! Version handling for manifest dependencies
//!
//! # Modules
//!
//! - [`semver`]: parsed version values and their ordering
//! - [`constraint`]: `>=`, `~`, wildcard and partial constraints
//! - [`dialect`]: per-family rewriting into comparable versions
//! - [`selector`]: picking entries for a request, newest patch, defaults

pub mod constraint;
pub mod dialect;
pub mod selector;
pub mod semver;

pub use constraint::VersionConstraint;
pub use dialect::{Dialect, DialectTable, VersionLine};
pub use selector::VersionSelector;
pub use self::semver::{PartialVersion, VersionValue};
