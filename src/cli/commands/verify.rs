use serde_json::json;

use crate::cli::config::load_environment_config;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::verify::{VerificationLookup, VerifyOutcome};

use super::open_store;

pub async fn handle(serial: String, output_format: OutputFormat) -> anyhow::Result<()> {
    let env = load_environment_config()?;
    let mut lookup = VerificationLookup::new(open_store(&env)?);
    lookup.set_serial(serial);

    match lookup.verify().await {
        VerifyOutcome::Verified { card } => {
            if let OutputFormat::Text = output_format {
                println!("Student:  {}", card.student_name);
                println!("Course:   {} ({})", card.course_name, card.course_duration);
                println!("Serial:   {}", card.serial_number);
                println!("Status:   {}", card.completion_status);
                if let Some(url) = &card.badge_download_url {
                    println!("Badge:    {}", url);
                }
            }
            output_success(&output_format, "Certificate verified", Some(json!({ "card": card })))
        }
        VerifyOutcome::NotFound { error } => Err(anyhow::anyhow!(error)),
        VerifyOutcome::Idle => Ok(()),
    }
}
