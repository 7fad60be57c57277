use eyre::{Result, WrapErr};
use rollcall_cli::config::{self, RollcallConfig};
use rollcall_cli::prompt::{DialoguerPrompter, LinePrompter, is_interactive_terminal};
use rollcall_directory::LdapDirectory;
use rollcall_provisioner::{Prompter, run_session};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = config::load_config()?;

    if is_interactive_terminal() {
        run(&config, &DialoguerPrompter).await
    } else {
        let prompter = LinePrompter::new(std::io::stdin().lock(), std::io::stdout());
        run(&config, &prompter).await
    }
}

/// Per-user failures are reported in the summary and still exit 0; only a
/// failed bind, a failed permission check or lost input end in an error.
async fn run(config: &RollcallConfig, prompter: &dyn Prompter) -> Result<()> {
    let directory = {
        let password = config.bind_password(prompter)?;
        LdapDirectory::connect(&config.ldap_settings(), &password)
            .await
            .wrap_err_with(|| format!("failed to connect to {}", config.directory.url))?
    };

    let result = run_session(&directory, prompter, config.session_options()).await;

    if let Err(e) = directory.unbind().await {
        tracing::warn!(error = %e, "failed to unbind");
    }

    let report = result?;
    tracing::info!(
        total = report.summary.total(),
        started_at = %report.summary.started_at,
        finished_at = %report.summary.finished_at,
        "batch finished"
    );
    Ok(())
}
