//! srvconf CLI
//!
//! Merges features, shared library references, service stanzas and runtime
//! variables into a server.xml without disturbing what is already there.

mod cli;
mod commands;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{BootstrapAction, Cli, Commands, FeaturesAction, LibraryAction, StanzaAction};
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    execute_command(&cli.server, cli.command)
}

fn execute_command(server: &std::path::Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Features { action } => match action {
            FeaturesAction::List => commands::run_features_list(server),
            FeaturesAction::Add { features } => commands::run_features_add(server, &features),
            FeaturesAction::AddIf {
                condition,
                then,
                otherwise,
            } => commands::run_features_add_if(server, &condition, &then, &otherwise),
        },
        Commands::Library { action } => match action {
            LibraryAction::Add { library_id, name } => {
                commands::run_library_add(server, &name, &library_id)
            }
        },
        Commands::Visibility => commands::run_visibility(server),
        Commands::Stanza { action } => match action {
            StanzaAction::Get { tag, attribute, id } => {
                commands::run_stanza_get(server, &tag, id.as_deref(), &attribute)
            }
            StanzaAction::Set {
                tag,
                id,
                attributes,
            } => commands::run_stanza_set(server, &tag, id.as_deref(), &attributes),
        },
        Commands::Bind {
            services,
            plugins,
            runtime_vars,
            driver_urls,
            driver_repository,
        } => commands::run_bind(&commands::BindArgs {
            server,
            services: services.as_deref(),
            plugins: &plugins,
            runtime_vars: runtime_vars.as_deref(),
            driver_urls: driver_urls.as_deref(),
            driver_repository: &driver_repository,
        }),
        Commands::Bootstrap { action } => match action {
            BootstrapAction::Set { key, value, dir } => {
                commands::run_bootstrap_set(server, dir.as_deref(), &key, &value)
            }
        },
    }
}
