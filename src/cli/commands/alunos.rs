use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::commands::records::{self, fields_from};
use crate::cli::OutputFormat;
use crate::database::models::Student;

#[derive(Subcommand)]
pub enum AlunosCommands {
    #[command(about = "List students, optionally filtered")]
    List {
        #[arg(long, short, help = "Filter by name, surname, course or id (2+ characters)")]
        search: Option<String>,
    },

    #[command(about = "Add a student")]
    Add {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        nome: String,
        #[arg(long)]
        apelido: String,
        #[arg(long)]
        curso: String,
        #[arg(long = "ano", help = "Curricular year")]
        ano_curricular: String,
    },

    #[command(about = "Update some fields of a student")]
    Update {
        id: i64,
        #[arg(long)]
        nome: Option<String>,
        #[arg(long)]
        apelido: Option<String>,
        #[arg(long)]
        curso: Option<String>,
        #[arg(long = "ano")]
        ano_curricular: Option<String>,
    },

    #[command(about = "Delete a student")]
    Delete {
        id: i64,
        #[arg(long, short, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle(cmd: AlunosCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AlunosCommands::List { search } => records::show::<Student>(client, &output_format, search.as_deref()).await,
        AlunosCommands::Add { id, nome, apelido, curso, ano_curricular } => {
            let body = serde_json::json!({
                "id": id,
                "Nome": nome,
                "Apelido": apelido,
                "Curso": curso,
                "Ano_Curricular": ano_curricular,
            });
            records::add::<Student>(client, &output_format, body).await
        }
        AlunosCommands::Update { id, nome, apelido, curso, ano_curricular } => {
            let fields = fields_from(&[
                ("Nome", nome),
                ("Apelido", apelido),
                ("Curso", curso),
                ("Ano_Curricular", ano_curricular),
            ]);
            records::update::<Student>(client, &output_format, id, fields).await
        }
        AlunosCommands::Delete { id, yes } => records::delete::<Student>(client, &output_format, id, yes).await,
    }
}
