//! submit-try - send a try job to the build master
//!
//! Validates the requested builders against the build master's live
//! listing, then submits from the current checkout:
//!
//! - Subversion: `submit-try <changelist> --bot <name>... [-r <rev>]`
//! - git: `submit-try --bot <name>... [-r <rev>]`
//!
//! `--bot all` selects every try builder, `--bot compile` every compile-only
//! builder. Exit code 2 means the request was rejected before anything was
//! submitted; exit code 3 means any other failure.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use tryjob_core::{
    BuilderCatalog, ProcessRunner, RawRequest, SubmissionReceipt, SubmitMode, TryConfig,
    TryJobError, TrySession,
};

const EXIT_VALIDATION: u8 = 2;
const EXIT_FAILURE: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "submit-try")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Submit a try job to the build master", long_about = None)]
struct Cli {
    /// Changelist to try (required for Subversion checkouts)
    changelist: Option<String>,

    /// Builder(s) to run on: names, comma-separated lists, `all` or `compile`
    #[arg(
        short = 'b',
        long = "bot",
        num_args = 1..,
        required_unless_present_any = ["bot_regex", "list_bots"]
    )]
    bots: Vec<String>,

    /// Also run on every builder whose name matches this regex
    #[arg(long, value_name = "PATTERN")]
    bot_regex: Option<String>,

    /// Revision to build the change against
    #[arg(short, long)]
    revision: Option<String>,

    /// Print the available try builders and exit
    #[arg(long)]
    list_bots: bool,

    /// Resolve and validate everything, print the submission command, run nothing
    #[arg(long)]
    dry_run: bool,

    /// Checkout to submit from
    #[arg(short = 'C', long, default_value = ".")]
    checkout: PathBuf,

    /// depot_tools checkout providing gcl and trychange.py
    #[arg(long, env = "DEPOT_TOOLS")]
    depot_tools: Option<PathBuf>,

    /// Build master base URL
    #[arg(long, env = "TRYJOB_BUILD_MASTER")]
    build_master: Option<String>,

    /// URL of the codereview.settings resource
    #[arg(long, env = "TRYJOB_SETTINGS_URL")]
    settings_url: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, env = "TRYJOB_HTTP_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Timeout in seconds for `svn info` / `git rev-parse`
    #[arg(long, env = "TRYJOB_QUERY_TIMEOUT_SECS")]
    query_timeout: Option<u64>,

    /// Timeout in seconds for the submission command
    #[arg(long, env = "TRYJOB_SUBMIT_TIMEOUT_SECS")]
    submit_timeout: Option<u64>,

    /// Python interpreter used to run trychange.py
    #[arg(long, env = "TRYJOB_PYTHON")]
    python: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON log lines and JSON command output
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> TryConfig {
        let mut config = TryConfig::from_env();
        if let Some(dir) = &self.depot_tools {
            config = config.with_depot_tools(dir);
        }
        if let Some(url) = &self.build_master {
            config.buildmaster.master_url = url.clone();
        }
        if let Some(url) = &self.settings_url {
            config.buildmaster.settings_url = url.clone();
        }
        if let Some(secs) = self.timeout {
            config.buildmaster = config.buildmaster.with_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.query_timeout {
            config = config.with_query_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.submit_timeout {
            config = config.with_submit_timeout(Duration::from_secs(secs));
        }
        if let Some(python) = &self.python {
            config = config.with_python(python);
        }
        config
    }

    fn raw_request(&self) -> RawRequest {
        RawRequest {
            targets: self.bots.clone(),
            pattern: self.bot_regex.clone(),
            revision: self.revision.clone(),
            changelist: self.changelist.clone(),
        }
    }

    fn mode(&self) -> SubmitMode {
        if self.dry_run {
            SubmitMode::DryRun
        } else {
            SubmitMode::Submit
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tryjob_core::init_tracing(cli.json, level);

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let session = TrySession::new(cli.config(), Arc::new(ProcessRunner), &cli.checkout)
        .context("Failed to set up try session")?;

    if cli.list_bots {
        let catalog = session.fetch_catalog().await?;
        print!("{}", render_catalog(&catalog, cli.json)?);
        return Ok(());
    }

    let receipt = session
        .run(&cli.raw_request(), cli.mode())
        .await
        .with_context(|| format!("Try job from {} not submitted", cli.checkout.display()))?;

    println!("{}", render_receipt(&receipt, cli.json)?);
    Ok(())
}

fn exit_code(err: &anyhow::Error) -> u8 {
    match err.downcast_ref::<TryJobError>() {
        Some(e) if e.is_validation() => EXIT_VALIDATION,
        _ => EXIT_FAILURE,
    }
}

fn render_catalog(catalog: &BuilderCatalog, json: bool) -> Result<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(catalog)?));
    }
    Ok(catalog.iter().map(|b| format!("{b}\n")).collect())
}

fn render_receipt(receipt: &SubmissionReceipt, json: bool) -> Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(receipt)?);
    }

    let mut out = String::new();
    if receipt.dry_run {
        out.push_str(&format!("Dry run, would run: {}\n", receipt.command_line()));
    } else {
        out.push_str(&format!(
            "Try job submitted ({} root: {})\n",
            receipt.substrate, receipt.root
        ));
    }
    out.push_str(&format!("Bots:      {}\n", receipt.bots));
    if let Some(revision) = receipt.revision {
        out.push_str(&format!("Revision:  {}\n", revision));
    }
    let stdout = receipt.stdout.trim();
    if !stdout.is_empty() {
        out.push_str(stdout);
        out.push('\n');
    }
    Ok(out.trim_end().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use httpmock::prelude::*;
    use tryjob_core::{BuilderName, SubstrateKind, ValidationError};

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_changelist_bots_and_revision() {
        let cli =
            Cli::try_parse_from(["submit-try", "fix_blur", "--bot", "Linux", "Mac", "-r", "42"])
                .unwrap();
        assert_eq!(cli.changelist.as_deref(), Some("fix_blur"));
        assert_eq!(cli.bots, vec!["Linux", "Mac"]);
        assert_eq!(cli.revision.as_deref(), Some("42"));
        assert_eq!(cli.mode(), SubmitMode::Submit);
    }

    #[test]
    fn test_bot_is_required_unless_listing() {
        assert!(Cli::try_parse_from(["submit-try"]).is_err());
        assert!(Cli::try_parse_from(["submit-try", "--list-bots"]).is_ok());
        assert!(Cli::try_parse_from(["submit-try", "--bot-regex", "^Linux"]).is_ok());
    }

    #[test]
    fn test_revision_is_left_for_validation() {
        let cli = Cli::try_parse_from(["submit-try", "--bot", "all", "-r", "abc"]).unwrap();
        assert_eq!(cli.raw_request().revision.as_deref(), Some("abc"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "submit-try",
            "--bot",
            "all",
            "--build-master",
            "http://master.example:10117",
            "--depot-tools",
            "/opt/depot_tools",
            "--timeout",
            "5",
            "--query-timeout",
            "30",
            "--submit-timeout",
            "600",
            "--python",
            "python2.7",
            "--dry-run",
        ])
        .unwrap();
        let config = cli.config();
        assert_eq!(config.buildmaster.master_url, "http://master.example:10117");
        assert_eq!(config.buildmaster.timeout_secs, 5);
        assert_eq!(config.query_timeout(), Duration::from_secs(30));
        assert_eq!(config.submit_timeout(), Duration::from_secs(600));
        assert_eq!(config.python, "python2.7");
        assert_eq!(config.depot_tools, Some(PathBuf::from("/opt/depot_tools")));
        assert_eq!(cli.mode(), SubmitMode::DryRun);
    }

    #[test]
    fn test_validation_errors_exit_with_2() {
        let err = anyhow::Error::from(TryJobError::from(ValidationError::MissingChangelist))
            .context("Try job not submitted");
        assert_eq!(exit_code(&err), EXIT_VALIDATION);
    }

    #[test]
    fn test_other_errors_exit_with_3() {
        let err = anyhow::Error::from(TryJobError::UnreachableCatalog("timeout".to_string()));
        assert_eq!(exit_code(&err), EXIT_FAILURE);
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), EXIT_FAILURE);
    }

    #[test]
    fn test_render_catalog_plain() {
        let catalog = BuilderCatalog::new([BuilderName::new("Mac"), BuilderName::new("Linux")]);
        assert_eq!(render_catalog(&catalog, false).unwrap(), "Linux\nMac\n");
    }

    #[test]
    fn test_render_receipt_plain() {
        let receipt = SubmissionReceipt {
            substrate: SubstrateKind::Centralized,
            root: "trunk".to_string(),
            bots: "Linux_Trybot".to_string(),
            revision: Some(7),
            program: "gcl".to_string(),
            args: vec!["try".to_string(), "cl".to_string()],
            stdout: "Sent\n".to_string(),
            duration_ms: 10,
            submitted_at: Default::default(),
            dry_run: false,
        };
        let out = render_receipt(&receipt, false).unwrap();
        assert!(out.starts_with("Try job submitted (svn root: trunk)"));
        assert!(out.contains("Bots:      Linux_Trybot"));
        assert!(out.contains("Revision:  7"));
        assert!(out.ends_with("Sent"));
    }

    #[tokio::test]
    async fn test_list_bots_against_mock_master() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/json/builders");
                then.status(200).body(r#"["Linux_Trybot", "Linux"]"#);
            })
            .await;
        let checkout = tempfile::tempdir().unwrap();
        let base_url = server.base_url();
        let checkout_arg = checkout.path().to_string_lossy().into_owned();
        let cli = Cli::try_parse_from([
            "submit-try",
            "--list-bots",
            "--build-master",
            base_url.as_str(),
            "-C",
            checkout_arg.as_str(),
        ])
        .unwrap();

        run(&cli).await.unwrap();
        mock.assert_async().await;
    }
}
