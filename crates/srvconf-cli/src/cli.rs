//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Merge features, library references and service stanzas into a server.xml
#[derive(Parser, Debug)]
#[command(name = "srvconf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server configuration to read and update
    #[arg(short, long, global = true, default_value = "server.xml", env = "SRVCONF_SERVER")]
    pub server: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Inspect or extend the enabled feature set
    Features {
        #[command(subcommand)]
        action: FeaturesAction,
    },

    /// Reference shared libraries from the application classloader
    Library {
        #[command(subcommand)]
        action: LibraryAction,
    },

    /// Print the application classloader's API visibility, if set
    Visibility,

    /// Read or write attributes of a logical stanza
    ///
    /// A stanza may be split over several elements with the same tag
    /// (and id). Reads take the last value; writes repair every element
    /// that carries the attribute.
    ///
    /// Examples:
    ///   srvconf stanza get logging traceSpecification
    ///   srvconf stanza set dataSource --id orders jndiName=jdbc/orders
    Stanza {
        #[command(subcommand)]
        action: StanzaAction,
    },

    /// Apply service plugins for every bound service
    ///
    /// Bindings are read from --services, or from the VCAP_SERVICES
    /// environment variable when no file is given.
    Bind {
        /// VCAP_SERVICES-shaped JSON file
        #[arg(long)]
        services: Option<PathBuf>,

        /// Directory of *.yml service plugins
        #[arg(long)]
        plugins: PathBuf,

        /// Write runtime variables to this document instead of the server
        #[arg(long)]
        runtime_vars: Option<PathBuf>,

        /// YAML map of driver keys to download URLs
        #[arg(long)]
        driver_urls: Option<PathBuf>,

        /// Base directory of versioned driver repositories
        #[arg(long, default_value = ".")]
        driver_repository: PathBuf,
    },

    /// Edit bootstrap.properties
    Bootstrap {
        #[command(subcommand)]
        action: BootstrapAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum FeaturesAction {
    /// Print enabled features, one per line
    List,

    /// Enable features that are not already enabled
    Add {
        #[arg(required = true)]
        features: Vec<String>,
    },

    /// Enable --then if any --if feature is enabled, otherwise --else
    ///
    /// All three lists are required; pass a bare `--else` for "add nothing".
    AddIf {
        #[arg(long = "if", required = true, num_args = 1..)]
        condition: Vec<String>,

        #[arg(long, required = true, num_args = 1..)]
        then: Vec<String>,

        #[arg(long = "else", required = true, num_args = 0..)]
        otherwise: Vec<String>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LibraryAction {
    /// Add a shared library id to commonLibraryRef
    Add {
        library_id: String,

        /// Name used in diagnostics
        #[arg(long, default_value = "cli")]
        name: String,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum StanzaAction {
    /// Print an attribute value
    Get {
        tag: String,
        attribute: String,

        #[arg(long)]
        id: Option<String>,
    },

    /// Set attributes, creating the stanza if missing
    Set {
        tag: String,

        #[arg(long)]
        id: Option<String>,

        /// NAME=VALUE pairs
        #[arg(required = true, value_parser = parse_assignment)]
        attributes: Vec<(String, String)>,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BootstrapAction {
    /// Append KEY=VALUE unless KEY is already set
    Set {
        key: String,
        value: String,

        /// Server directory (defaults to the directory of --server)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected NAME=VALUE, got '{raw}'")),
    }
}
