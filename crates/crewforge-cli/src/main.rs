mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    agent::AgentSubcommand, epic::EpicSubcommand, set::SetSubcommand,
    template::TemplateSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "crewforge",
    about = "Assemble, validate, and export multi-agent project templates",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .crewforge/ or .git/)
    #[arg(long, global = true, env = "CREWFORGE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the wizard state in the current project
    Init,

    /// Show the current configuration
    Show,

    /// Change project-level settings
    Set {
        #[command(subcommand)]
        subcommand: SetSubcommand,
    },

    /// Edit epics
    Epic {
        #[command(subcommand)]
        subcommand: EpicSubcommand,
    },

    /// Edit specialized agents
    Agent {
        #[command(subcommand)]
        subcommand: AgentSubcommand,
    },

    /// Validate the configuration and list every error
    Validate,

    /// Export the configured template as a zip archive
    Export {
        /// Directory to write the archive into (default: project root)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Manage template overrides
    Template {
        #[command(subcommand)]
        subcommand: TemplateSubcommand,
    },

    /// Reset the configuration to defaults and clear stored state
    Reset {
        /// Required: resetting discards all authored content
        #[arg(long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Show => cmd::show::run(&root, cli.json),
        Commands::Set { subcommand } => cmd::set::run(&root, subcommand, cli.json),
        Commands::Epic { subcommand } => cmd::epic::run(&root, subcommand, cli.json),
        Commands::Agent { subcommand } => cmd::agent::run(&root, subcommand, cli.json),
        Commands::Validate => cmd::validate::run(&root, cli.json),
        Commands::Export { out } => cmd::export::run(&root, out.as_deref(), cli.json),
        Commands::Template { subcommand } => cmd::template::run(&root, subcommand),
        Commands::Reset { force } => cmd::reset::run(&root, force),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
