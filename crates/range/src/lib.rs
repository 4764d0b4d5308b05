#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Stencil Range
//!
//! The compact range DSL that describes a field's legal values:
//!
//! ```text
//! integer(1..65535)      string(..64)      url
//! string[1..5]           (read||write)[1..]
//! debug||info||warn      tcp / udp         ^[a-z][a-z0-9_]*$
//! ```
//!
//! [`parse_range`] turns a DSL string into a [`ParsedRange`] and never
//! fails; [`validate_value`] checks a [`FieldValue`](stencil_template::FieldValue)
//! against it and never panics.

pub mod parse;
pub mod validate;

pub use parse::{DataType, ParsedRange, parse_range};
pub use validate::{invalid_fields, validate_field, validate_value};
