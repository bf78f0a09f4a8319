//! Core Strata: Settings Trees
//!
//! The building blocks shared by every settings layer:
//! - `Node` / `Value`: a typed tree where each member may carry the comment
//!   that described it in the source document
//! - `Path`: a dotted key path such as `.sources.SphereSource.Radius`
//! - `parse`: JSON with `//` and `/* */` comments into a `Node` tree
//! - `convert`: `serde_json` interop
//!
//! # Example
//!
//! ```rust
//! use strata_core_store::{parse, path, Value};
//!
//! let root = parse(r#"{ "view": { /* pixels */ "Width": 800 } }"#).unwrap();
//! let width = root.get(&path!(".view.Width")).unwrap();
//! assert_eq!(width.value, Value::Integer(800));
//! assert_eq!(width.description.as_deref(), Some("/* pixels */"));
//! ```

pub mod convert;
mod error;
pub mod parser;
mod path;
mod value;

pub use convert::{json_to_node, node_to_json};
pub use error::{Error, ParseError, ParseErrorKind};
pub use parser::{parse, Parser, ParserOptions};
pub use path::{Path, PathError};
pub use value::{Node, Value};
