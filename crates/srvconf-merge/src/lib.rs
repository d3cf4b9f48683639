//! Partitioned merge engine for server configuration documents.
//!
//! Merges facts discovered during staging (required features, shared
//! library references) into a [`Document`] without dropping or duplicating
//! what operators already wrote. Every merge is idempotent: applying the same
//! fact twice leaves the document as the first application left it.
//!
//! # Partitions
//!
//! A logical configuration unit may be split across several physical
//! elements sharing an `id`. The [`stanza`] module resolves such groups and
//! applies three deliberately different policies:
//!
//! - reads take the value from the **last** partition defining it,
//! - updates rewrite **every** partition that already defines it,
//! - creation lands on the **last** partition only.
//!
//! Shared-library references ([`classloader`]) instead create on the
//! **first** classloader. The two create policies are kept separate; they
//! disagree for documents with several classloaders.
//!
//! # Outcomes
//!
//! Merges return [`MergeOutcome`]. Ambiguous documents produce
//! [`MergeOutcome::Skipped`] and stay untouched; malformed requests produce
//! an [`Error`] before any node is modified.
//!
//! [`Document`]: srvconf_tree::Document

pub mod classloader;
pub mod error;
pub mod features;
pub mod outcome;
pub mod stanza;

pub use classloader::{add_library_to_app_classloader, get_api_visibility, get_applications};
pub use error::{Error, Result};
pub use features::{
    ConditionalFeatures, FeatureSpec, add_features, add_features_conditional, apply_feature_spec,
    get_features,
};
pub use outcome::{MergeOutcome, SkipReason};
pub use stanza::{find_and_update_attribute, find_attribute, is_logical_singleton, merge_stanza};
