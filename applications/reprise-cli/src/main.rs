/// Reprise - play a list of files the way a media center would
use clap::{Parser, Subcommand, ValueEnum};
use reprise_cli::{m3u::M3uLoader, session, CliConfig};
use reprise_playlist::{MediaItem, RepeatMode};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "reprise")]
#[command(about = "Playlist sequencer with repeat, shuffle and skip-on-failure", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./reprise.toml if present)
    #[arg(short, long, global = true, env = "REPRISE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play files, URLs and .m3u playlists in order
    Play {
        /// Items to play
        #[arg(required = true)]
        items: Vec<String>,

        /// Shuffle before playing
        #[arg(short, long)]
        shuffle: bool,

        /// Repeat mode
        #[arg(short, long, value_enum)]
        repeat: Option<RepeatArg>,

        /// Consecutive failures before giving up (-1 for unlimited)
        #[arg(long, allow_hyphen_values = true)]
        retries: Option<i32>,

        /// Seconds of consecutive failures before giving up (0 disables)
        #[arg(long)]
        timeout: Option<u32>,

        /// Stop after this many items
        #[arg(long)]
        limit: Option<usize>,

        /// Print property-changed announcements as JSON lines
        #[arg(long)]
        announce: bool,
    },
    /// Print the items after resolving nested playlists
    List {
        /// Items to list
        #[arg(required = true)]
        items: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RepeatArg {
    Off,
    One,
    All,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Off => RepeatMode::Off,
            RepeatArg::One => RepeatMode::One,
            RepeatArg::All => RepeatMode::All,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reprise=info,reprise_cli=info,reprise_playlist=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play {
            items,
            shuffle,
            repeat,
            retries,
            timeout,
            limit,
            announce,
        } => {
            let mut config = CliConfig::load(cli.config.as_deref())?;

            // Command-line flags win over file and environment
            if shuffle {
                config.playback.shuffle = true;
            }
            if let Some(repeat) = repeat {
                config.playback.repeat = repeat.into();
            }
            if let Some(retries) = retries {
                config.playlist.retries = retries;
            }
            if let Some(timeout) = timeout {
                config.playlist.timeout_secs = timeout;
            }
            if let Some(limit) = limit {
                config.playback.limit = limit;
            }
            config.validate()?;

            play(&config, items, announce)?;
        }
        Commands::List { items } => {
            list(items);
        }
    }

    Ok(())
}

fn play(config: &CliConfig, items: Vec<String>, announce: bool) -> anyhow::Result<()> {
    tracing::info!(
        "Retries: {}, timeout: {}s, repeat: {}, shuffle: {}",
        config.playlist.retries,
        config.playlist.timeout_secs,
        config.playback.repeat.as_str(),
        config.playback.shuffle
    );

    let items = items.into_iter().map(MediaItem::new).collect();
    let summary = session::run(config, items, announce)?;

    eprintln!(
        "{} played, {} failed, {} left in {} playlist",
        summary.played,
        summary.failed,
        summary.remaining.len(),
        summary.playlist
    );

    if summary.played == 0 {
        anyhow::bail!("nothing could be played");
    }
    Ok(())
}

fn list(items: Vec<String>) {
    let items = items.into_iter().map(MediaItem::new).collect();
    let list = session::expand(items, &M3uLoader);

    for (index, entry) in list.iter().enumerate() {
        println!("{:>4}  {}", index + 1, entry.item().redacted_path());
    }
}
