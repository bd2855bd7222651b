use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tweetlens::analyzer::sentiment_stats;
use tweetlens::stream::{StopReason, StreamListener};
use tweetlens::{export, Config, LexiconScorer, Sentiment, TweetAnalyzer, TwitterClient};

#[derive(Parser)]
#[command(name = "tweetlens", version, about = "Fetch tweets, score their sentiment, export the results")]
struct Cli {
    /// Path to a credentials TOML file (default: TWITTER_* env vars, then
    /// the user config directory).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a user's timeline, analyze it, and export a spreadsheet.
    Fetch {
        /// Screen name to fetch; omit for the authenticated user.
        #[arg(long)]
        user: Option<String>,

        /// How many tweets to fetch, at most.
        #[arg(long, default_value_t = 100)]
        count: usize,

        /// Output workbook path (.xlsx).
        #[arg(long)]
        out: PathBuf,

        /// Also write a per-tweet CSV to this path.
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Follow the live filter stream and append raw records to a file.
    Stream {
        /// Comma-separated keywords to track.
        #[arg(long, value_delimiter = ',', required = true)]
        tags: Vec<String>,

        /// Append-only output file for raw records.
        #[arg(long)]
        out: PathBuf,
    },

    /// List accounts the user follows.
    Friends {
        #[arg(long)]
        user: Option<String>,

        #[arg(long, default_value_t = 20)]
        count: usize,
    },

    /// List trending topics for a WOEID (1 is worldwide).
    Trends {
        #[arg(long, default_value_t = 1)]
        woeid: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Fetch {
            user,
            count,
            out,
            csv,
        } => fetch(&config, user.as_deref(), count, &out, csv.as_deref()).await,
        Command::Stream { tags, out } => stream(&config, &tags, out).await,
        Command::Friends { user, count } => friends(&config, user.as_deref(), count).await,
        Command::Trends { woeid } => trends(&config, woeid).await,
    }
}

async fn fetch(
    config: &Config,
    user: Option<&str>,
    count: usize,
    out: &std::path::Path,
    csv: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let client = TwitterClient::new(config)?;
    let paged = client.user_timeline(user, count).await;
    if let Some(error) = &paged.error {
        warn!(%error, fetched = paged.records.len(), "timeline fetch was cut short");
    }
    let tweets = paged.into_result().context("timeline fetch failed")?;
    info!(count = tweets.len(), "tweets fetched");

    let analyzer = TweetAnalyzer::new(LexiconScorer::new());
    let rows = analyzer.to_table(&tweets);
    export::write_workbook(&rows, out)?;
    if let Some(csv_path) = csv {
        export::write_csv(&tweets, csv_path)?;
    }

    let parsed = analyzer.parse_and_dedupe(&tweets);
    let stats = sentiment_stats(&parsed).context("nothing to analyze")?;
    println!("Positive tweets percentage: {:.1} %", stats.positive_pct);
    println!("Negative tweets percentage: {:.1} %", stats.negative_pct);

    for wanted in [Sentiment::Positive, Sentiment::Negative] {
        println!("\n{wanted} tweets:");
        for parsed_tweet in parsed.iter().filter(|p| p.sentiment == wanted).take(10) {
            println!("  {}", analyzer.clean(&parsed_tweet.tweet.full_text));
        }
    }
    Ok(())
}

async fn stream(config: &Config, tags: &[String], out: PathBuf) -> anyhow::Result<()> {
    let listener = StreamListener::new(config, out)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let summary = listener.run(tags, shutdown_rx).await?;
    info!(
        records = summary.records_written,
        failures = summary.write_failures,
        "stream finished"
    );
    match summary.stop {
        StopReason::RateLimited => println!("stream stopped: rate limited by the service"),
        StopReason::Cancelled => println!("stream stopped: cancelled"),
        StopReason::Disconnected(reason) => println!("stream stopped: {reason}"),
    }
    Ok(())
}

async fn friends(config: &Config, user: Option<&str>, count: usize) -> anyhow::Result<()> {
    let client = TwitterClient::new(config)?;
    let paged = client.friends(user, count).await;
    if let Some(error) = &paged.error {
        warn!(%error, fetched = paged.records.len(), "friends fetch was cut short");
    }
    for friend in paged.into_result().context("friends fetch failed")? {
        println!(
            "@{} ({}): {} followers",
            friend.screen_name, friend.name, friend.followers_count
        );
    }
    Ok(())
}

async fn trends(config: &Config, woeid: u32) -> anyhow::Result<()> {
    let client = TwitterClient::new(config)?;
    let trends = client.trends(woeid).await.context("trends fetch failed")?;
    for trend in trends {
        match trend.tweet_volume {
            Some(volume) => println!("{} ({volume} tweets)", trend.name),
            None => println!("{}", trend.name),
        }
    }
    Ok(())
}
