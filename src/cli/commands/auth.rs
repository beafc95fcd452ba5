use anyhow::Context;
use clap::Subcommand;
use serde::Deserialize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::cli::client::ApiClient;
use crate::cli::config::{save_client_config, ClientConfig};
use crate::cli::utils::{output_json, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Log in and store the access token")]
    Login {
        #[arg(help = "Login name")]
        login: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the stored access token")]
    Logout,

    #[command(about = "Show server, session and store status")]
    Status,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    message: String,
    token: String,
    expires_in: i64,
}

pub async fn handle(cmd: AuthCommands, mut config: ClientConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { login, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };

            let client = ApiClient::new(&config.server_url, None)?;
            let response: LoginResponse = client
                .post("/login", &json!({ "login": login, "password": password }))
                .await?;

            config.set_session(&login, response.token);
            save_client_config(&config)?;

            output_success(
                &output_format,
                &response.message,
                Some(json!({ "login": login, "expires_in": response.expires_in })),
            )
        }
        AuthCommands::Logout => {
            config.clear_session();
            save_client_config(&config)?;
            output_success(&output_format, "Sessão terminada.", None)
        }
        AuthCommands::Status => {
            let client = ApiClient::new(&config.server_url, None)?;
            let health = client.get::<Value>("/health").await;

            let status = json!({
                "server_url": config.server_url,
                "logged_in": config.token.is_some(),
                "login": config.login,
                "logged_in_at": config.logged_in_at,
                "server": match &health {
                    Ok(body) => body.clone(),
                    Err(e) => json!({ "status": "down", "error": e.to_string() }),
                },
            });

            match output_format {
                OutputFormat::Json => output_json(&status),
                OutputFormat::Text => {
                    println!("Server:  {}", config.server_url);
                    match &health {
                        Ok(body) => println!(
                            "Health:  {} (store: {})",
                            body.get("status").and_then(Value::as_str).unwrap_or("unknown"),
                            body.get("store").and_then(Value::as_str).unwrap_or("unknown")
                        ),
                        Err(e) => println!("Health:  down ({})", e),
                    }
                    match (&config.login, config.logged_in_at) {
                        (Some(login), Some(at)) => println!("Session: {} since {}", login, at.to_rfc3339()),
                        _ => println!("Session: not logged in"),
                    }
                    Ok(())
                }
            }
        }
    }
}

fn prompt_password() -> anyhow::Result<String> {
    print!("Password: ");
    io::stdout().flush()?;

    let mut password = String::new();
    io::stdin().lock().read_line(&mut password).context("reading password")?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}

