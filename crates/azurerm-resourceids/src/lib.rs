//! azurerm-resourceids
//!
//! Parsing and formatting of Azure Resource Manager resource IDs.
//!
//! - [`Parser`] matches a raw URI against an ordered [`Segment`] template.
//! - [`ResourceId`] is implemented by every typed ID; the [`resource_id!`]
//!   macro generates the struct, constructor, parsers and formatting.
//! - [`ids`] holds the typed IDs used by the SDK and the provider.

pub mod error;
pub mod ids;
pub mod parser;
pub mod resource_id;
pub mod segment;

pub use crate::error::ParseError;
pub use crate::parser::{ParseResult, Parser};
pub use crate::resource_id::{parse_id, parse_id_insensitively, validate_id, ResourceId};
pub use crate::segment::{Segment, SegmentKind};

#[doc(hidden)]
pub mod __private {
    pub use serde;
}
