mod cloudbuild;
mod commands;
mod context;
mod form;
mod output;
mod settings;
mod traits;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cloudbuild::ApiError;
use cloudbuild::client::DEFAULT_BASE_URL;
use commands::{
    ConfigCommand, DeleteCredCommand, GetCredCommand, ListCredsCommand, ListProjectsCommand,
    UpdateCredCommand, UploadCredCommand,
};
use context::Context;
use form::{FlagSet, PopulateError};
use settings::Settings;
use std::process::ExitCode;
use traits::{Output, TerminalOutput};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "UCB_LOG";

#[derive(Parser)]
#[command(name = "ucb")]
#[command(about = "UCB - Manage Unity Cloud Build iOS credentials and projects", long_about = None)]
#[command(version)]
struct Cli {
    /// Cloud Build API key
    #[arg(long, global = true, alias = "apiKey", env = "UCB_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Organization id
    #[arg(long, global = true, alias = "orgId", env = "UCB_ORG_ID")]
    org_id: Option<String>,

    /// Cloud Build API root
    #[arg(long, global = true, env = "UCB_API_URL", default_value = DEFAULT_BASE_URL, hide = true)]
    api_url: String,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Get iOS credential details
    #[command(alias = "getCred")]
    GetCred {
        /// Credential id
        #[arg(long, alias = "credId")]
        cred_id: Option<String>,
    },

    /// List all iOS credentials
    #[command(alias = "listCreds")]
    ListCreds,

    /// Update an iOS credential
    #[command(alias = "updateCred")]
    UpdateCred {
        /// Certificate id
        #[arg(long, alias = "certId")]
        cert_id: Option<String>,

        /// Label
        #[arg(long)]
        label: Option<String>,

        /// Certificate path
        #[arg(long, alias = "certPath")]
        cert_path: Option<String>,

        /// Provisioning profile path
        #[arg(long, alias = "profilePath")]
        profile_path: Option<String>,

        /// Certificate password
        #[arg(long, alias = "certPass")]
        cert_pass: Option<String>,
    },

    /// Upload an iOS credential
    #[command(alias = "uploadCred")]
    UploadCred {
        /// Label
        #[arg(long)]
        label: Option<String>,

        /// Certificate path
        #[arg(long, alias = "certPath")]
        cert_path: Option<String>,

        /// Provisioning profile path
        #[arg(long, alias = "profilePath")]
        profile_path: Option<String>,

        /// Certificate password
        #[arg(long, alias = "certPass")]
        cert_pass: Option<String>,
    },

    /// Delete an iOS credential
    #[command(alias = "deleteCred")]
    DeleteCred {
        /// Certificate id
        #[arg(long, alias = "certId", visible_alias = "cred-id")]
        cert_id: Option<String>,
    },

    /// List projects on Cloud Build
    #[command(alias = "listProjects")]
    ListProjects,

    /// Edit the settings file
    Config,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn insert_flag(flags: &mut FlagSet, name: &str, value: Option<String>) {
    if let Some(value) = value {
        flags.insert(name.to_string(), value);
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = Context::new(&cli.api_url);
    let settings_path = Settings::file_path()?;

    if let Commands::Config = cli.command {
        return ConfigCommand::execute(&ctx, &settings_path);
    }

    let mut flags = FlagSet::new();
    insert_flag(&mut flags, "apiKey", cli.api_key);
    insert_flag(&mut flags, "orgId", cli.org_id);
    Settings::load(ctx.fs.as_ref(), &settings_path)?.apply_defaults(&mut flags);

    match cli.command {
        Commands::GetCred { cred_id } => {
            insert_flag(&mut flags, "credId", cred_id);
            GetCredCommand::execute(&ctx, &flags)
        }
        Commands::ListCreds => ListCredsCommand::execute(&ctx, &flags),
        Commands::UpdateCred {
            cert_id,
            label,
            cert_path,
            profile_path,
            cert_pass,
        } => {
            insert_flag(&mut flags, "certId", cert_id);
            insert_flag(&mut flags, "label", label);
            insert_flag(&mut flags, "certPath", cert_path);
            insert_flag(&mut flags, "profilePath", profile_path);
            insert_flag(&mut flags, "certPass", cert_pass);
            UpdateCredCommand::execute(&ctx, &flags)
        }
        Commands::UploadCred {
            label,
            cert_path,
            profile_path,
            cert_pass,
        } => {
            insert_flag(&mut flags, "label", label);
            insert_flag(&mut flags, "certPath", cert_path);
            insert_flag(&mut flags, "profilePath", profile_path);
            insert_flag(&mut flags, "certPass", cert_pass);
            UploadCredCommand::execute(&ctx, &flags)
        }
        Commands::DeleteCred { cert_id } => {
            insert_flag(&mut flags, "certId", cert_id);
            DeleteCredCommand::execute(&ctx, &flags)
        }
        Commands::ListProjects => ListProjectsCommand::execute(&ctx, &flags),
        Commands::Config => ConfigCommand::execute(&ctx, &settings_path),
    }
}

/// Print a failed run and pick its exit status; only a cancelled prompt exits 130
fn report_error(output: &dyn Output, err: &anyhow::Error) -> ExitCode {
    output.error(&format!("{:#}", err));

    if let Some(api) = err.downcast_ref::<ApiError>()
        && api.status == 401
    {
        output.warning("Check the api key (--api-key, UCB_API_KEY or ~/.ucb.yaml)");
    }

    match err.downcast_ref::<PopulateError>() {
        Some(PopulateError::PromptAborted(_)) => ExitCode::from(130),
        Some(PopulateError::PromptFailed(_)) => {
            output.warning("Pass missing values as flags when not running in a terminal");
            ExitCode::FAILURE
        }
        _ => ExitCode::FAILURE,
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&TerminalOutput, &err),
    }
}
