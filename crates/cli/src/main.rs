mod commands;

use anyhow::Context as _;
use cf_purge_client::{ApiSettings, CloudflareClient, Method, PurgeTemplate};
use cf_purge_core::config::env_layer;
use cf_purge_core::{ConfigLayer, ConfigPaths, Field};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use commands::Context;

#[derive(Parser)]
#[command(name = "cf-purge")]
#[command(version, about = "Purge the Cloudflare cache for a site", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    options: Options,
}

#[derive(Subcommand)]
enum Command {
    /// Check that everything needed for a purge is configured
    Validate,

    /// Print the resolved configuration
    Config,

    /// Print the zone id for the site
    Zone,

    /// Purge everything cached for the zone
    Purge,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
struct Options {
    /// Site domain name (default: CNAME file, then CLOUDFLARE_SITE)
    #[arg(short = 's', long, global = true)]
    site: Option<String>,

    /// Zone id; skips the lookup by site name
    #[arg(short = 'z', long, global = true)]
    zone: Option<String>,

    /// Cloudflare account email
    #[arg(short = 'e', long, global = true)]
    email: Option<String>,

    /// Cloudflare global API key
    #[arg(short = 'k', long = "key", global = true)]
    api_key: Option<String>,

    /// Config file with CLOUDFLARE_* assignments [default: .cloudflare]
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// File holding the site's domain name [default: CNAME]
    #[arg(long, global = true, value_name = "PATH")]
    marker: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value_t = 10)]
    #[arg(value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// HTTP verb for the purge request
    #[arg(long, global = true, value_enum, default_value = "post")]
    purge_method: PurgeMethod,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PurgeMethod {
    Post,
    Delete,
}

impl From<PurgeMethod> for Method {
    fn from(method: PurgeMethod) -> Self {
        match method {
            PurgeMethod::Post => Method::POST,
            PurgeMethod::Delete => Method::DELETE,
        }
    }
}

impl Options {
    fn context(&self) -> Context {
        let mut paths = ConfigPaths::default();
        if let Some(path) = &self.config {
            paths = paths.with_config_file(path.clone());
        }
        if let Some(path) = &self.marker {
            paths = paths.with_marker_file(path.clone());
        }

        let mut flags = ConfigLayer::default();
        let given = [
            (Field::Site, &self.site),
            (Field::Zone, &self.zone),
            (Field::Email, &self.email),
            (Field::ApiKey, &self.api_key),
        ];
        for (field, value) in given {
            if let Some(value) = value {
                flags.set(field, value.as_str());
            }
        }

        Context {
            paths,
            env: env_layer(|key| std::env::var(key).ok()),
            flags,
        }
    }

    fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            timeout: Duration::from_secs(self.timeout),
            purge: PurgeTemplate::default().with_method(self.purge_method.into()),
            ..ApiSettings::default()
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.options.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "command failed");
            eprintln!("❌ {:#}", err);
            ExitCode::from(exit_code(&err))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "cf-purge", &mut io::stdout());
        return Ok(());
    }

    let ctx = cli.options.context();
    let client = CloudflareClient::new(cli.options.api_settings())
        .context("Failed to create HTTP client")?;
    debug!(paths = ?ctx.paths, "starting");

    match cli.command {
        Command::Validate => commands::validate::run(&ctx, &client).await,
        Command::Config => commands::config::run(&ctx, &client).await,
        Command::Zone => commands::zone::run(&ctx, &client).await,
        Command::Purge => commands::purge::run(&ctx, &client).await,
        Command::Completions { .. } => Ok(()),
    }
}

/// Map a failure to the process exit status; 1 when unclassified
fn exit_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<cf_purge_core::Error>()
        .map(cf_purge_core::Error::exit_code)
        .unwrap_or(1)
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "cf_purge=debug,cf_purge_core=debug,cf_purge_client=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(io::stderr),
        )
        .init();
}
