//! Configuration document tree for the server configuration merger
//!
//! Provides the in-memory document the merge engine mutates, an XML codec
//! to get documents in and out of that form, and atomic file persistence.
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by
//! [`NodeId`]. Queries are structural: descendant search by tag name rather
//! than full paths.

pub mod document;
pub mod error;
pub mod io;
pub mod node;
mod xml;

pub use document::Document;
pub use error::{Error, Result};
pub use node::{ConfigNode, NodeId, NodeKind, OuterMarkup};
