//! Service bindings and service plugins.
//!
//! Turns bound services into facts the merge engine understands:
//!
//! - [`binding`] flattens `VCAP_SERVICES` entries into
//!   `cloud.services.<name>.*` runtime variables,
//! - [`property`] resolves a property into a `${...}` reference,
//! - [`plugin`] describes, per kind of service, which features, library
//!   references and stanzas a binding contributes,
//! - [`drivers`] picks the client driver download for a plugin,
//! - [`bootstrap`] appends properties to `bootstrap.properties`.

pub mod binding;
pub mod bootstrap;
pub mod drivers;
pub mod error;
pub mod plugin;
pub mod property;

pub use binding::{
    DefaultFlattener, ServiceBinding, ValueFlattener, flatten_binding, parse_vcap_services,
    write_runtime_variables,
};
pub use bootstrap::{property_matcher, update_bootstrap_properties};
pub use drivers::{ClientJarConfig, DriverRepository, FileRepositoryIndex, RepositoryIndex};
pub use error::{Error, Result};
pub use plugin::{AttributeSource, AttributeTemplate, ServicePlugin, StanzaTemplate, load_plugins};
pub use property::get_cloud_property;
