//! Resolution services over a [`ManifestIndex`](crate::manifest::ManifestIndex)
//!
//! - [`url_mapper`]: download URL to manifest entry
//! - [`uri`]: credential redaction and cache localization
//! - [`deprecation`]: end-of-life warnings

pub mod deprecation;
pub mod uri;
pub mod url_mapper;

pub use deprecation::{DeprecationChecker, DeprecationRule};
pub use uri::UriTranslator;
pub use url_mapper::{UrlMapper, UrlMapping};
