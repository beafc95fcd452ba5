use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::commands::records::{self, fields_from};
use crate::cli::OutputFormat;
use crate::database::models::Course;

#[derive(Subcommand)]
pub enum CursosCommands {
    #[command(about = "List courses, optionally filtered")]
    List {
        #[arg(long, short, help = "Filter by name, acronym or id (2+ characters)")]
        search: Option<String>,
    },

    #[command(about = "Add a course")]
    Add {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        nome: String,
        #[arg(long)]
        sigla: String,
    },

    #[command(about = "Update some fields of a course")]
    Update {
        id: i64,
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        sigla: Option<String>,
    },

    #[command(about = "Delete a course")]
    Delete {
        id: i64,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle(cmd: CursosCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        CursosCommands::List { search } => records::show::<Course>(client, &output_format, search.as_deref()).await,
        CursosCommands::Add { id, nome, sigla } => {
            let body = serde_json::json!({ "id": id, "Nome": nome, "Sigla": sigla });
            records::add::<Course>(client, &output_format, body).await
        }
        CursosCommands::Update { id, nome, sigla } => {
            let fields = fields_from(&[("Nome", nome), ("Sigla", sigla)]);
            records::update::<Course>(client, &output_format, id, fields).await
        }
        CursosCommands::Delete { id, yes } => records::delete::<Course>(client, &output_format, id, yes).await,
    }
}
