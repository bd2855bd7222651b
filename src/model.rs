use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A single tweet as returned by the v1.1 REST API in extended mode.
/// Immutable once deserialized; the `id` assigned by the service is the only
/// identity a tweet has.
#[derive(Debug, Clone, Deserialize)]
pub struct Tweet {
    pub id: u64,
    pub full_text: String,
    #[serde(with = "twitter_date")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub favorite_count: u64,
    #[serde(default)]
    pub retweet_count: u64,
    #[serde(default)]
    pub user: TweetUser,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TweetUser {
    #[serde(default)]
    pub screen_name: String,
}

/// An account the target user follows.
#[derive(Debug, Clone, Deserialize)]
pub struct Friend {
    pub id: u64,
    pub screen_name: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub followers_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Trend {
    pub name: String,
    #[serde(default)]
    pub tweet_volume: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        };
        f.write_str(label)
    }
}

/// A tweet paired with its classified sentiment. The label is a deterministic
/// function of the tweet text's polarity score.
#[derive(Debug, Clone)]
pub struct ParsedTweet {
    pub tweet: Tweet,
    pub sentiment: Sentiment,
}

/// One flattened row for the spreadsheet export. `len` counts characters of
/// `full_text`, not bytes.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub id: u64,
    pub len: usize,
    pub date: DateTime<Utc>,
    pub source: String,
    pub likes: u64,
    pub retweets: u64,
}

/// Serde adapter for the v1.1 timestamp format, e.g.
/// `Wed Oct 10 20:19:24 +0000 2018`.
pub(crate) mod twitter_date {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer};

    const FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_str(&raw, FORMAT)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
