//! certdeploy CLI tool.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "certdeploy")]
#[command(about = "Deploy TLS certificates to cloud platforms", long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, env = "CERTDEPLOY_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Deploy a certificate through a deploy node
    Deploy {
        /// File with the deploy node
        #[arg(long)]
        node: PathBuf,
        /// Files with access records (defaults to the node file)
        #[arg(long)]
        access: Vec<PathBuf>,
        /// Certificate chain PEM, leaf first
        #[arg(long)]
        cert: PathBuf,
        /// Private key PEM
        #[arg(long)]
        key: PathBuf,
        /// Node to run when the file defines several
        #[arg(long)]
        node_id: Option<String>,
        /// Cancel the deployment after this many seconds
        #[arg(long)]
        timeout: Option<u64>,
        /// Print the deployment result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect provider identifiers
    Providers {
        #[command(subcommand)]
        command: ProviderCommands,
    },
    /// Validate deploy nodes and their configuration
    Validate {
        /// File with deploy nodes
        #[arg(long)]
        node: PathBuf,
        /// Files with access records (defaults to the node file)
        #[arg(long)]
        access: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ProviderCommands {
    /// List known provider identifiers
    List {
        /// Only list one taxonomy
        #[arg(long)]
        taxonomy: Option<String>,
    },
    /// Resolve an identifier, following legacy aliases
    Check {
        taxonomy: String,
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
    }

    match cli.command {
        Commands::Deploy {
            node,
            access,
            cert,
            key,
            node_id,
            timeout,
            json,
        } => {
            commands::deploy::run(commands::deploy::DeployArgs {
                node,
                access,
                cert,
                key,
                node_id,
                timeout,
                json,
            })
            .await?;
        }
        Commands::Providers { command } => match command {
            ProviderCommands::List { taxonomy } => {
                commands::providers::list(taxonomy.as_deref())?;
            }
            ProviderCommands::Check { taxonomy, id } => {
                commands::providers::check(&taxonomy, &id)?;
            }
        },
        Commands::Validate { node, access } => {
            commands::validate(&node, access).await?;
        }
    }

    Ok(())
}
