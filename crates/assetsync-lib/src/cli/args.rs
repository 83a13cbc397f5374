use crate::manifest::{Locale, Platform};
use clap::{ArgAction, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber;

#[derive(Debug, Clone)]
pub enum Command {
    Sync {
        source: SourceArgs,
        download: DownloadOverrides,
    },
    Verify {
        source: SourceArgs,
    },
}

/// Where manifests come from and where assets go; unset values fall back to
/// the config file.
#[derive(Debug, Clone, Default)]
pub struct SourceArgs {
    pub config_path: Option<String>,
    pub manifests_path: Option<String>,
    pub output_path: Option<String>,
    pub platforms: Vec<Platform>,
    pub locales: Vec<Locale>,
    pub skip_old_assets: bool,
}

#[derive(Debug, Clone, Default)]
pub struct DownloadOverrides {
    pub base_url: Option<String>,
    pub max_concurrent: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub max_passes: Option<u32>,
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "assetsync",
    version,
    about = "Mirror versioned asset bundles described by JSON manifests into a local content-addressed store"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count,
        global = true
    )]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, clap::Args)]
struct SourceOpts {
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Optional config file (YAML, TOML or JSON)"
    )]
    config: Option<String>,

    #[arg(
        short = 'm',
        long = "manifests-dir",
        value_name = "DIR",
        help = "Directory containing one folder of manifest snapshots per platform"
    )]
    manifests_dir: Option<String>,

    #[arg(
        short = 'o',
        long = "output-dir",
        value_name = "DIR",
        help = "Output directory; each platform is stored in its own sub-directory"
    )]
    output_dir: Option<String>,

    #[arg(
        short = 'p',
        long = "platform",
        value_name = "PLATFORM",
        help = "Platforms to download (repeat or use comma-separated values)",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    platforms: Vec<Platform>,

    #[arg(
        short = 'l',
        long = "locale",
        value_name = "LOCALE",
        help = "Localisations to download in addition to the base manifest (repeat or use comma-separated values)",
        action = ArgAction::Append,
        value_delimiter = ','
    )]
    locales: Vec<Locale>,

    #[arg(
        short = 's',
        long = "skip-old-assets",
        help = "Only keep the newest revision of each named asset"
    )]
    skip_old_assets: bool,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Download every asset referenced by the manifests that is not present yet
    Sync {
        #[command(flatten)]
        source: SourceOpts,

        #[arg(long = "base-url", value_name = "URL", help = "Overrides the asset endpoint")]
        base_url: Option<String>,

        #[arg(
            long = "max-concurrent",
            value_name = "N",
            help = "Maximum number of simultaneous downloads in the first pass"
        )]
        max_concurrent: Option<usize>,

        #[arg(
            long = "timeout-secs",
            value_name = "N",
            help = "Request timeout of the first pass; doubled for every retry pass"
        )]
        timeout_secs: Option<u64>,

        #[arg(
            long = "max-passes",
            value_name = "N",
            help = "Give up after this many download passes (default: retry until done)"
        )]
        max_passes: Option<u32>,
    },

    /// Check which assets are missing from the output directory without downloading
    Verify {
        #[command(flatten)]
        source: SourceOpts,
    },
}

impl From<SourceOpts> for SourceArgs {
    fn from(opts: SourceOpts) -> Self {
        Self {
            config_path: opts.config,
            manifests_path: opts.manifests_dir,
            output_path: opts.output_dir,
            platforms: opts.platforms,
            locales: opts.locales,
            skip_old_assets: opts.skip_old_assets,
        }
    }
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("hyper=warn".parse().unwrap())
                .add_directive("reqwest=warn".parse().unwrap()),
        )
        .init();

    let command = match cli.command {
        CliCommand::Sync {
            source,
            base_url,
            max_concurrent,
            timeout_secs,
            max_passes,
        } => Command::Sync {
            source: source.into(),
            download: DownloadOverrides {
                base_url,
                max_concurrent,
                timeout_secs,
                max_passes,
            },
        },
        CliCommand::Verify { source } => Command::Verify {
            source: source.into(),
        },
    };

    Args { command, log_level }
}
