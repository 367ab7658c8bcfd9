//! Font descriptors for the par-nvim GUI protocol.
//!
//! The core and the presentation layer exchange fonts as compact strings of
//! the form `family:h<points>:b:i`. This crate parses, validates and formats
//! them:
//!
//! - [`FontSpec`] - an immutable font descriptor (family, height, weight, slant)
//! - [`FontWeight`] - normal, bold or light; bold and light are exclusive
//! - [`FontParseError`] - why a descriptor was rejected
//!
//! Descriptors that fail validation can still be carried verbatim with
//! [`FontSpec::parse_forced`], for platform-specific font strings the grammar
//! does not know about.

mod error;
mod font_spec;

pub use error::FontParseError;
pub use font_spec::{FontSpec, FontWeight};
