#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Stencil Template
//!
//! The typed records shared by every Stencil component:
//!
//! - [`Field`] and [`FieldValue`]: a named configuration value with its
//!   range DSL string and `checked` inclusion flag
//! - [`FieldCollection`]: an ordered, path-addressable set of fields
//! - [`RuleDomain`], [`RuleState`] and [`Rule`]: declarative
//!   "if these hold, enforce those" rules
//! - [`RuleSet`] and [`Template`]: named, optionally inheriting rule groups
//!   and the container they live in
//!
//! Every record is plain `serde` data, so templates round-trip through JSON.

pub mod collection;
pub mod error;
pub mod field;
pub mod rule;
pub mod ruleset;
pub mod template;
pub mod value;

pub use collection::FieldCollection;
pub use error::ModelError;
pub use field::{Field, PATH_SEPARATOR, is_descendant_path};
pub use rule::{Rule, RuleDomain, RuleState};
pub use ruleset::RuleSet;
pub use template::Template;
pub use value::FieldValue;
