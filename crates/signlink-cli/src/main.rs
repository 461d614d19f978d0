mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::config::ConfigSubcommand;
use cmd::Overrides;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "signlink",
    about = "Store captured signatures and link them to CRM contacts",
    version,
    propagate_version = true
)]
struct Cli {
    /// Working root (default: auto-detect from signlink.yaml or .git/)
    #[arg(long, global = true, env = "SIGNLINK_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// CRM private-app token (overrides signlink.yaml)
    #[arg(long, global = true, env = "SIGNLINK_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// CRM portal id (overrides signlink.yaml)
    #[arg(long, global = true, env = "SIGNLINK_PORTAL_ID")]
    portal_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signature HTTP server
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "8080")]
        port: u16,
    },

    /// Delete stored signatures older than the retention window
    Sweep {
        /// Override `retention_days` from the config
        #[arg(long)]
        retention_days: Option<u64>,
    },

    /// Inspect and validate signlink.yaml
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let root = root::resolve_root(cli.root.as_deref());
    let overrides = Overrides {
        api_token: cli.api_token,
        portal_id: cli.portal_id,
    };

    let result = match cli.command {
        Commands::Serve { port } => cmd::serve::run(&root, &overrides, port),
        Commands::Sweep { retention_days } => {
            cmd::sweep::run(&root, &overrides, retention_days, cli.json)
        }
        Commands::Config { subcommand } => cmd::config::run(&root, &overrides, subcommand, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
