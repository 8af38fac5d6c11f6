use clap::Subcommand;
use serde_json::json;

use crate::auth::{authenticator_for, GuardState};
use crate::cli::config::{load_environment_config, save_environment_config};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Sign in as admin and persist the token")]
    Login {
        #[arg(long, help = "Admin email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Forget the persisted admin token")]
    Logout,

    #[command(about = "Show whether an admin token is persisted")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(p) => p,
                None => prompt_password()?,
            };

            let mut env = load_environment_config()?;
            let mut app_config = config().clone();
            app_config.store = env.store_config(&app_config.store);

            let authenticator = authenticator_for(&app_config)?;
            let token = authenticator.sign_in(&email, &password).await?;

            env.admin_token = Some(token.as_str().to_string());
            save_environment_config(&env)?;

            output_success(&output_format, &format!("Logged in as {}", email), None)
        }
        AuthCommands::Logout => {
            let mut env = load_environment_config()?;
            let had_token = env.admin_token.take().is_some();
            save_environment_config(&env)?;

            let message = if had_token { "Logged out" } else { "Not logged in" };
            output_success(&output_format, message, Some(json!({ "logged_out": had_token })))
        }
        AuthCommands::Status => {
            let env = load_environment_config()?;
            let authorized = GuardState::evaluate(env.admin_token.as_deref()).is_authorized();

            let message = if authorized { "Admin token present" } else { "Not logged in" };
            output_success(&output_format, message, Some(json!({ "authorized": authorized })))
        }
    }
}

fn prompt_password() -> anyhow::Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }
    Ok(password)
}
