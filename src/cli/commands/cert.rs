use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde_json::json;

use crate::cli::utils::{output_certificates, output_empty_collection, output_success, StdinConfirm};
use crate::cli::OutputFormat;
use crate::csv_io;
use crate::dashboard::{AdminDashboard, Confirm};
use crate::models::{CertificateId, DraftPatch};

use super::{open_store, require_admin};

#[derive(Subcommand)]
pub enum CertCommands {
    #[command(about = "List certificates, newest first")]
    List {
        #[arg(long, help = "Only rows whose name, course or serial contains this text")]
        search: Option<String>,
    },

    #[command(about = "Create one certificate")]
    Create {
        #[command(flatten)]
        fields: CertificateArgs,
    },

    #[command(about = "Replace fields of an existing certificate")]
    Update {
        #[arg(help = "Certificate id")]
        id: String,
        #[command(flatten)]
        fields: CertificateArgs,
    },

    #[command(about = "Delete a certificate (asks for confirmation)")]
    Delete {
        #[arg(help = "Certificate id")]
        id: String,
        #[arg(long, short = 'y', help = "Skip the confirmation prompt")]
        yes: bool,
    },

    #[command(about = "Bulk insert certificates from a CSV file")]
    Import {
        #[arg(help = "CSV file with a header row")]
        file: PathBuf,
    },

    #[command(about = "Write the CSV template")]
    Template {
        #[arg(long, short, help = "Output path (defaults to certificates_template.csv)")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
pub struct CertificateArgs {
    #[arg(long = "name", help = "Student name")]
    pub student_name: Option<String>,
    #[arg(long = "email", help = "Student email")]
    pub student_email: Option<String>,
    #[arg(long = "course", help = "Course name")]
    pub course_name: Option<String>,
    #[arg(long = "duration", help = "Course duration, e.g. \"4 Weeks\"")]
    pub course_duration: Option<String>,
    #[arg(long = "status", help = "Completed, In Progress or Failed")]
    pub completion_status: Option<String>,
    #[arg(long = "badge", help = "Badge link; shared-drive links become direct downloads")]
    pub badge_url: Option<String>,
    #[arg(long = "serial", help = "Serial number")]
    pub serial_number: Option<String>,
}

impl From<CertificateArgs> for DraftPatch {
    fn from(args: CertificateArgs) -> Self {
        DraftPatch {
            student_name: args.student_name,
            student_email: args.student_email,
            course_name: args.course_name,
            course_duration: args.course_duration,
            completion_status: args.completion_status,
            badge_url: args.badge_url,
            serial_number: args.serial_number,
        }
    }
}

pub async fn handle(cmd: CertCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    // Writing the template needs no store or token
    if let CertCommands::Template { output } = &cmd {
        return write_template(output.clone(), &output_format);
    }

    let (env, _token) = require_admin()?;
    let mut dashboard = AdminDashboard::new(open_store(&env)?);

    match cmd {
        CertCommands::List { search } => {
            dashboard.refresh().await?;
            if let Some(query) = search {
                dashboard.set_search(query);
            }

            let rows = dashboard.visible_certificates();
            if rows.is_empty() {
                return output_empty_collection(&output_format, "certificates", "No certificates found");
            }
            output_certificates(&output_format, &rows)
        }
        CertCommands::Create { fields } => {
            dashboard.apply_form_patch(&DraftPatch::from(fields));
            let notice = dashboard.submit().await?;
            output_success(&output_format, &notice.to_string(), None)
        }
        CertCommands::Update { id, fields } => {
            let patch = DraftPatch::from(fields);
            if patch.is_empty() {
                anyhow::bail!("Nothing to update; pass at least one field flag");
            }

            dashboard.refresh().await?;
            dashboard.begin_edit(&id)?;
            dashboard.apply_form_patch(&patch);
            let notice = dashboard.submit().await?;
            output_success(&output_format, &notice.to_string(), Some(json!({ "id": id })))
        }
        CertCommands::Delete { id, yes } => {
            let confirm: &(dyn Confirm + Sync) = if yes { &true } else { &StdinConfirm };
            let notice = dashboard.delete(&CertificateId::new(id.clone()), confirm).await?;
            output_success(&output_format, &notice.to_string(), Some(json!({ "id": id })))
        }
        CertCommands::Import { file } => {
            let bytes = fs::read(&file)
                .map_err(|e| anyhow::anyhow!("cannot read {}: {}", file.display(), e))?;
            let notice = dashboard.import_csv(&bytes).await?;
            output_success(&output_format, &notice.to_string(), None)
        }
        CertCommands::Template { output } => write_template(output, &output_format),
    }
}

fn write_template(output: Option<PathBuf>, output_format: &OutputFormat) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(|| PathBuf::from(csv_io::TEMPLATE_FILENAME));
    fs::write(&path, csv_io::template()?)?;
    output_success(
        output_format,
        &format!("Template written to {}", path.display()),
        Some(json!({ "path": path.display().to_string() })),
    )
}
