//! tweetlens: fetch tweets, score their sentiment, export the results.
//!
//! The pipeline is strictly one way: credentials feed the OAuth signer, the
//! signer feeds the REST client, the client hands tweets to the analyzer, and
//! the analyzer's output goes to the spreadsheet/CSV sinks. No component reads
//! back from a downstream one, and nothing is persisted beyond the output files.

pub mod analyzer;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod oauth;
pub mod sentiment;
pub mod stream;

pub use analyzer::TweetAnalyzer;
pub use client::TwitterClient;
pub use config::{Config, Credentials};
pub use error::{Error, Result};
pub use model::{ParsedTweet, Sentiment, TableRow, Tweet};
pub use sentiment::{LexiconScorer, PolarityScorer};
