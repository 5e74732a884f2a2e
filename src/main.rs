//! glbak CLI entry point

use clap::Parser;
use std::path::PathBuf;

use glbak::cli::commands::backup::run_backup;
use glbak::cli::Output;
use glbak::core::settings::{
    parse_bool_env, DEFAULT_BASE_URL, DEFAULT_CONCURRENCY, DEFAULT_DEST_DIR, DEFAULT_TIMEOUT_SECS,
};
use glbak::core::{Settings, SettingsArgs};
use glbak::telemetry::{init_telemetry, TelemetryConfig};

#[derive(Parser)]
#[command(name = "glbak")]
#[command(
    author,
    version,
    about = "Mirror every repository of a GitLab group into local bare repositories",
    long_about = "Mirror every repository of a GitLab group (subgroups included) into \
                  local bare repositories. Existing mirrors are updated in place.\n\n\
                  The API token is read from the GITLAB_TOKEN environment variable. \
                  Variables may also be set in a .env file in the working directory."
)]
struct Cli {
    /// Full path of the group to back up (e.g. acme or acme/platform)
    group_path: String,

    /// GitLab base URL
    #[arg(long, env = "GLBAK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Backup root directory
    #[arg(long, env = "GLBAK_DEST_DIR", default_value = DEFAULT_DEST_DIR)]
    dest: PathBuf,

    /// Number of repositories mirrored in parallel
    #[arg(short = 'j', long, env = "GLBAK_CONCURRENCY", default_value_t = DEFAULT_CONCURRENCY)]
    concurrency: usize,

    /// Network timeout in seconds, fractions allowed (API requests and stalled git transfers)
    #[arg(long, env = "GLBAK_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: f64,

    /// Skip TLS certificate verification (also GLBAK_VERIFY_SSL=false)
    #[arg(long)]
    no_verify_ssl: bool,

    /// List what would be mirrored without touching the network or disk
    #[arg(long)]
    dry_run: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_settings_args(self) -> SettingsArgs {
        let verify_ssl = !self.no_verify_ssl
            && parse_bool_env(std::env::var("GLBAK_VERIFY_SSL").ok().as_deref(), true);

        SettingsArgs {
            group_path: self.group_path,
            base_url: self.base_url,
            dest: self.dest,
            concurrency: self.concurrency,
            timeout_secs: self.timeout,
            verify_ssl,
            dry_run: self.dry_run,
            verbose: self.verbose,
            json: self.json,
            token: std::env::var("GITLAB_TOKEN").ok(),
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    let _telemetry = init_telemetry(&TelemetryConfig::for_verbosity(cli.verbose))?;

    let settings = Settings::from_args(cli.into_settings_args())?;
    tracing::debug!(?settings, "Loaded settings");

    let outcome = run_backup(&settings).await?;
    Ok(outcome.exit_code())
}

#[tokio::main]
async fn main() {
    // A .env in the working directory feeds the clap env fallbacks
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            Output::error(&format!("{:#}", e));
            1
        }
    };

    std::process::exit(code);
}
