use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use apiprobe::config::{ConfigResolver, Environment, Settings};
use apiprobe::env::capture_environment;
use apiprobe::executor::Dispatcher;
use apiprobe::scenarios::{catalog, find_endpoint, Intent};
use apiprobe::suite::{
    describe_settings, print_diagnostics, print_plan, print_summary, probe_environments,
    render_result, RunOptions, ScenarioFilter, SuiteRunner, DEFAULT_PREVIEW_BYTES,
    DEFAULT_RETRIES,
};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "apiprobe",
    version,
    about = "End-to-end checks for the content generation API",
    disable_help_subcommand = true
)]
struct Cli {
    /// Environment to test (overrides TEST_ENV; both run when neither is set)
    #[arg(long, global = true, value_name = "NAME")]
    env: Option<Environment>,

    /// Env file to load instead of ./.env
    #[arg(long, global = true, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Override base directory used for resolving paths
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    /// Only run scenarios for this endpoint (repeatable)
    #[arg(short = 'e', long = "endpoint", value_name = "NAME")]
    endpoints: Vec<String>,

    /// Only run positive or negative scenarios
    #[arg(short, long, value_name = "TAG")]
    tag: Option<Intent>,

    /// Only run scenarios whose name matches this regex
    #[arg(short, long, value_name = "REGEX")]
    grep: Option<Regex>,

    /// Extra attempts for a failing scenario
    #[arg(long, default_value_t = DEFAULT_RETRIES)]
    retries: u32,

    /// Directory to store response bodies of failed scenarios
    #[arg(long, short = 'O', value_name = "DIR")]
    artifacts: Option<PathBuf>,

    /// Bytes of a failed response body to include in logs
    #[arg(short, long, default_value_t = DEFAULT_PREVIEW_BYTES)]
    preview: usize,

    /// Print the selected scenarios without sending anything
    #[arg(long)]
    list: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show which settings are present and probe each base URL
    Diagnose,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let base_dir = match &cli.cwd {
        Some(path) => resolve_path(path)?,
        None => std::env::current_dir().context("reading current directory")?,
    };
    let env_file = cli.env_file.as_ref().map(|p| resolve_relative(&base_dir, p));

    let loaded =
        capture_environment(env_file.as_deref(), &base_dir).context("loading environment")?;
    for file in &loaded.env_files {
        tracing::debug!(path = %file.display(), "loaded env file");
    }

    let settings = Settings::from_map(&loaded.vars)
        .with_test_env(cli.env.map(|env| env.as_str().to_string()));
    let resolver = ConfigResolver::new(&settings);
    let dispatcher = Dispatcher::new()?;

    match &cli.command {
        Some(Commands::Diagnose) => {
            let keys = describe_settings(&settings);
            let probes = probe_environments(&resolver, &dispatcher).await;
            print_diagnostics(&keys, &probes);
            return Ok(());
        }
        None => {}
    }

    for name in &cli.endpoints {
        if find_endpoint(name).is_none() {
            bail!("unknown endpoint {name:?}; use --list to see the catalog");
        }
    }

    let options = RunOptions {
        retries: cli.retries,
        filter: ScenarioFilter {
            endpoints: cli.endpoints.clone(),
            intent: cli.tag,
            pattern: cli.grep.clone(),
        },
        artifacts_dir: cli.artifacts.as_ref().map(|p| resolve_relative(&base_dir, p)),
        preview_bytes: cli.preview,
    };
    let runner = SuiteRunner::new(resolver, &dispatcher, catalog(), options);
    let planned = runner.planned();
    let environments = runner.environments();

    if cli.list {
        print_plan(&environments, &planned);
        return Ok(());
    }
    if planned.is_empty() {
        bail!("no scenarios match the given filters");
    }

    let progress = ProgressBar::new((planned.len() * environments.len()) as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {wide_msg}")
            .context("building progress style")?
            .progress_chars("=> "),
    );

    let report = runner
        .run_with(|result| {
            progress.suspend(|| println!("{}", render_result(result)));
            progress.set_message(format!("{} {}", result.environment, result.endpoint));
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    print_summary(&report);

    if !report.is_success() {
        let totals = report.totals();
        bail!(
            "{} of {} scenarios did not pass",
            totals.failed + totals.errored,
            totals.total()
        );
    }
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn resolve_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_relative_joins_when_needed() {
        let base = Path::new("/tmp/base");
        let relative = Path::new("artifacts/run");
        assert_eq!(resolve_relative(base, relative), base.join(relative));

        let absolute = Path::new("/var/data/.env");
        assert_eq!(resolve_relative(base, absolute), absolute);
    }

    #[test]
    fn resolve_path_makes_relative_paths_absolute() -> Result<()> {
        let resolved = resolve_path(Path::new("some/dir"))?;
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("some/dir"));
        Ok(())
    }

    #[test]
    fn cli_parses_filters() {
        let cli = Cli::try_parse_from([
            "apiprobe",
            "--env",
            "Production",
            "--endpoint",
            "blog-ideas",
            "-e",
            "define-this",
            "--tag",
            "@negative",
            "--grep",
            "^rejects",
            "--retries",
            "0",
        ])
        .unwrap();

        assert_eq!(cli.env, Some(Environment::Production));
        assert_eq!(cli.endpoints, vec!["blog-ideas", "define-this"]);
        assert_eq!(cli.tag, Some(Intent::Negative));
        assert!(cli.grep.unwrap().is_match("rejects empty topic"));
        assert_eq!(cli.retries, 0);
        assert_eq!(cli.preview, DEFAULT_PREVIEW_BYTES);
    }

    #[test]
    fn cli_rejects_unknown_environment() {
        let err = Cli::try_parse_from(["apiprobe", "--env", "qa"]).unwrap_err();
        assert!(err.to_string().contains("unknown environment"));
    }

    #[test]
    fn diagnose_accepts_global_flags() {
        let cli = Cli::try_parse_from(["apiprobe", "diagnose", "--env", "staging"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Diagnose)));
        assert_eq!(cli.env, Some(Environment::Staging));
    }
}
