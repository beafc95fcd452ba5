pub mod client;
pub mod commands;
pub mod config;
pub mod utils;
pub mod views;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::cli::client::ApiClient;

#[derive(Parser)]
#[command(name = "escola")]
#[command(about = "Escola CLI - manage students and courses through the Escola API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "API base URL (overrides the stored one and is remembered)")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(flatten)]
    Auth(commands::auth::AuthCommands),

    #[command(about = "Student records")]
    Alunos {
        #[command(subcommand)]
        cmd: commands::alunos::AlunosCommands,
    },

    #[command(about = "Course records")]
    Cursos {
        #[command(subcommand)]
        cmd: commands::cursos::CursosCommands,
    },

    #[command(about = "Replace the primary database contents with a JSON file (needs DATABASE_URL)")]
    Seed {
        #[arg(help = "File shaped like the fallback store: {\"alunos\": [...], \"cursos\": [...]}")]
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);

    let mut client_config = config::load_client_config()?;
    if let Some(server) = cli.server {
        client_config.server_url = server.trim_end_matches('/').to_string();
        config::save_client_config(&client_config)?;
    }

    match cli.command {
        Commands::Auth(cmd) => commands::auth::handle(cmd, client_config, output_format).await,
        Commands::Alunos { cmd } => {
            let client = ApiClient::new(&client_config.server_url, client_config.token)?;
            commands::alunos::handle(cmd, &client, output_format).await
        }
        Commands::Cursos { cmd } => {
            let client = ApiClient::new(&client_config.server_url, client_config.token)?;
            commands::cursos::handle(cmd, &client, output_format).await
        }
        Commands::Seed { file } => commands::seed::handle(file, output_format).await,
    }
}
