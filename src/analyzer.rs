//! Text cleanup, sentiment labeling, tabular flattening and retweet dedup.
//! The one place in the pipeline with logic of its own; everything upstream
//! is transport and everything downstream is a sink.

use std::collections::HashSet;

use regex::Regex;

use crate::error::{Error, Result};
use crate::model::{ParsedTweet, Sentiment, TableRow, Tweet};
use crate::sentiment::PolarityScorer;

pub struct TweetAnalyzer<S> {
    scorer: S,
    noise: Regex,
}

impl<S: PolarityScorer> TweetAnalyzer<S> {
    pub fn new(scorer: S) -> Self {
        // Alternation order matters: a URL must be consumed as one token
        // before the character class can eat it piecemeal.
        let noise = Regex::new(r"(@[A-Za-z0-9]+)|(\w+://\S+)|([^0-9A-Za-z \t])")
            .expect("noise pattern is valid");
        Self { scorer, noise }
    }

    /// Strip @mentions, URL tokens and any other non-alphanumeric character,
    /// then collapse whitespace runs. Pure, total and idempotent.
    pub fn clean(&self, text: &str) -> String {
        let stripped = self.noise.replace_all(text, " ");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Map the scorer's polarity to a label. The threshold sits at exactly
    /// zero: any positive score is positive, any negative score is negative,
    /// and only 0.0 is neutral.
    pub fn classify(&self, text: &str) -> Sentiment {
        let polarity = self.scorer.polarity(text);
        if polarity > 0.0 {
            Sentiment::Positive
        } else if polarity < 0.0 {
            Sentiment::Negative
        } else {
            Sentiment::Neutral
        }
    }

    /// Flatten tweets into export rows, one per tweet, input order preserved.
    /// No filtering: the row count always equals the input count.
    pub fn to_table(&self, tweets: &[Tweet]) -> Vec<TableRow> {
        tweets
            .iter()
            .map(|tweet| TableRow {
                id: tweet.id,
                len: tweet.full_text.chars().count(),
                date: tweet.created_at,
                source: tweet.source.clone(),
                likes: tweet.favorite_count,
                retweets: tweet.retweet_count,
            })
            .collect()
    }

    /// Classify every tweet and drop duplicate retweeted entries.
    ///
    /// Zero-retweet tweets are always included. Retweeted tweets are
    /// included once per id, in input order.
    pub fn parse_and_dedupe(&self, tweets: &[Tweet]) -> Vec<ParsedTweet> {
        let mut seen = HashSet::new();
        let mut parsed = Vec::with_capacity(tweets.len());

        for tweet in tweets {
            let entry = ParsedTweet {
                tweet: tweet.clone(),
                sentiment: self.classify(&tweet.full_text),
            };
            if tweet.retweet_count > 0 && !seen.insert(tweet.id) {
                continue;
            }
            parsed.push(entry);
        }
        parsed
    }
}

/// Share of positive and negative labels over everything parsed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentStats {
    pub positive_pct: f64,
    pub negative_pct: f64,
    pub total: usize,
}

/// Percentages are `100 * count / total`; an empty input is an explicit
/// [`Error::EmptyResult`] rather than a division by zero.
pub fn sentiment_stats(parsed: &[ParsedTweet]) -> Result<SentimentStats> {
    if parsed.is_empty() {
        return Err(Error::EmptyResult);
    }
    let total = parsed.len();
    let count_of = |wanted: Sentiment| parsed.iter().filter(|p| p.sentiment == wanted).count();
    Ok(SentimentStats {
        positive_pct: 100.0 * count_of(Sentiment::Positive) as f64 / total as f64,
        negative_pct: 100.0 * count_of(Sentiment::Negative) as f64 / total as f64,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    /// Scores each text by looking it up in a fixed list; unknown texts are 0.
    struct FixedScorer(Vec<(&'static str, f64)>);

    impl PolarityScorer for FixedScorer {
        fn polarity(&self, text: &str) -> f64 {
            self.0
                .iter()
                .find(|(t, _)| *t == text)
                .map(|(_, score)| *score)
                .unwrap_or(0.0)
        }
    }

    fn analyzer() -> TweetAnalyzer<FixedScorer> {
        TweetAnalyzer::new(FixedScorer(vec![]))
    }

    fn tweet(id: u64, full_text: &str, retweet_count: u64) -> Tweet {
        Tweet {
            id,
            full_text: full_text.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            source: "Twitter Web App".to_string(),
            favorite_count: 5,
            retweet_count,
            user: Default::default(),
        }
    }

    #[test]
    fn test_clean_strips_mentions_urls_punctuation() {
        let a = analyzer();
        assert_eq!(a.clean("Great day! http://x.co"), "Great day");
        assert_eq!(a.clean("Terrible news @bob"), "Terrible news");
        assert_eq!(a.clean("It is Tuesday"), "It is Tuesday");
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        let a = analyzer();
        assert_eq!(a.clean("  a   lot\t\tof   space  "), "a lot of space");
    }

    #[test]
    fn test_clean_is_idempotent() {
        let a = analyzer();
        for text in [
            "Great day! http://x.co",
            "@a @b @c!!!",
            "plain words",
            "",
            "émoji ✨ and accents",
            "nested https://t.co/abc?q=1#frag end",
        ] {
            let once = a.clean(text);
            assert_eq!(a.clean(&once), once, "not idempotent for {text:?}");
        }
    }

    #[test]
    fn test_clean_of_only_noise_is_empty() {
        let a = analyzer();
        assert_eq!(a.clean("@someone https://t.co/xyz !!!"), "");
    }

    #[test]
    fn test_classify_boundary_at_exactly_zero() {
        let a = TweetAnalyzer::new(FixedScorer(vec![
            ("zero", 0.0),
            ("tiny+", f64::MIN_POSITIVE),
            ("tiny-", -f64::MIN_POSITIVE),
        ]));
        assert_eq!(a.classify("zero"), Sentiment::Neutral);
        assert_eq!(a.classify("tiny+"), Sentiment::Positive);
        assert_eq!(a.classify("tiny-"), Sentiment::Negative);
    }

    #[test]
    fn test_to_table_row_count_matches_input() {
        let a = analyzer();
        assert!(a.to_table(&[]).is_empty());

        let tweets = vec![tweet(1, "one", 0), tweet(2, "two", 3), tweet(3, "three", 0)];
        let rows = a.to_table(&tweets);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[1].retweets, 3);
        assert_eq!(rows[2].len, 5);
    }

    #[test]
    fn test_to_table_len_counts_chars_not_bytes() {
        let a = analyzer();
        let rows = a.to_table(&[tweet(1, "héllo", 0)]);
        assert_eq!(rows[0].len, 5);
    }

    #[test]
    fn test_parse_and_dedupe_keeps_zero_retweet_tweets() {
        let a = analyzer();
        let tweets = vec![tweet(1, "a", 0), tweet(2, "b", 0)];
        let parsed = a.parse_and_dedupe(&tweets);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].tweet.id, 1);
        assert_eq!(parsed[1].tweet.id, 2);
    }

    #[test]
    fn test_parse_and_dedupe_drops_repeated_retweeted_ids() {
        let a = analyzer();
        let tweets = vec![tweet(7, "hot take", 12), tweet(7, "hot take", 12), tweet(8, "other", 1)];
        let parsed = a.parse_and_dedupe(&tweets);
        let ids: Vec<u64> = parsed.iter().map(|p| p.tweet.id).collect();
        assert_eq!(ids, vec![7, 8]);
    }

    #[test]
    fn test_parse_and_dedupe_preserves_input_order() {
        let a = analyzer();
        let tweets = vec![tweet(3, "c", 1), tweet(1, "a", 0), tweet(2, "b", 5)];
        let ids: Vec<u64> = a
            .parse_and_dedupe(&tweets)
            .iter()
            .map(|p| p.tweet.id)
            .collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }

    #[test]
    fn test_sentiment_stats_percentages() {
        let a = TweetAnalyzer::new(FixedScorer(vec![("up", 1.0), ("down", -1.0)]));
        let mut tweets = Vec::new();
        for i in 0..6 {
            tweets.push(tweet(i, "up", 0));
        }
        for i in 6..10 {
            tweets.push(tweet(i, "down", 0));
        }
        let stats = sentiment_stats(&a.parse_and_dedupe(&tweets)).unwrap();
        assert_eq!(stats.positive_pct, 60.0);
        assert_eq!(stats.negative_pct, 40.0);
        assert_eq!(stats.total, 10);
    }

    #[test]
    fn test_sentiment_stats_empty_is_an_error() {
        assert!(matches!(sentiment_stats(&[]), Err(Error::EmptyResult)));
    }

    #[test]
    fn test_end_to_end_three_tweets() {
        let a = TweetAnalyzer::new(FixedScorer(vec![
            ("Great day! http://x.co", 0.8),
            ("Terrible news @bob", -0.6),
            ("It is Tuesday", 0.0),
        ]));
        let tweets = vec![
            tweet(1, "Great day! http://x.co", 0),
            tweet(2, "Terrible news @bob", 0),
            tweet(3, "It is Tuesday", 0),
        ];

        let cleaned: Vec<String> = tweets.iter().map(|t| a.clean(&t.full_text)).collect();
        assert_eq!(cleaned, vec!["Great day", "Terrible news", "It is Tuesday"]);

        let parsed = a.parse_and_dedupe(&tweets);
        let labels: Vec<Sentiment> = parsed.iter().map(|p| p.sentiment).collect();
        assert_eq!(
            labels,
            vec![Sentiment::Positive, Sentiment::Negative, Sentiment::Neutral]
        );

        let rows = a.to_table(&tweets);
        assert_eq!(rows.len(), 3);
        assert_eq!(
            rows.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }
}
