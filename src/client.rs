//! REST client for the v1.1 endpoints: user timeline, friends list, trends.
//!
//! Pagination yields a finite, non-restartable sequence in whatever order the
//! service returns. A mid-pagination failure surfaces the records fetched so
//! far together with the triggering error; nothing is swallowed here.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{Friend, Trend, Tweet};
use crate::oauth::{percent_encode, OauthSigner};

/// The v1.1 maximum page size for `statuses/user_timeline`.
const TIMELINE_PAGE_SIZE: usize = 200;
/// The v1.1 maximum page size for `friends/list`.
const FRIENDS_PAGE_SIZE: usize = 200;

/// The outcome of a paged fetch: every record gathered before the first
/// failure, plus that failure if there was one.
#[derive(Debug)]
pub struct Paged<T> {
    pub records: Vec<T>,
    pub error: Option<Error>,
}

impl<T> Paged<T> {
    fn complete(records: Vec<T>) -> Self {
        Self {
            records,
            error: None,
        }
    }

    fn interrupted(records: Vec<T>, error: Error) -> Self {
        Self {
            records,
            error: Some(error),
        }
    }

    /// Collapse to a plain result: an error with no records at all is fatal,
    /// partial results win over the error that cut them short.
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.error {
            Some(error) if self.records.is_empty() => Err(error),
            _ => Ok(self.records),
        }
    }
}

pub struct TwitterClient {
    http: reqwest::Client,
    signer: OauthSigner,
    api_url: String,
}

impl TwitterClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("tweetlens/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            signer: OauthSigner::new(&config.credentials),
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Page through a user's timeline until `count` tweets or the end of it.
    /// `screen_name` of `None` means the authenticated user's own timeline.
    pub async fn user_timeline(&self, screen_name: Option<&str>, count: usize) -> Paged<Tweet> {
        let mut tweets: Vec<Tweet> = Vec::new();
        let mut max_id: Option<u64> = None;

        while tweets.len() < count {
            let page_size = TIMELINE_PAGE_SIZE.min(count - tweets.len());
            let mut params = vec![
                ("count".to_string(), page_size.to_string()),
                ("tweet_mode".to_string(), "extended".to_string()),
            ];
            if let Some(name) = screen_name {
                params.push(("screen_name".to_string(), name.to_string()));
            }
            if let Some(id) = max_id {
                params.push(("max_id".to_string(), id.to_string()));
            }

            let page: Vec<Tweet> = match self.get("/statuses/user_timeline.json", &params).await {
                Ok(page) => page,
                Err(error) => return Paged::interrupted(tweets, error),
            };
            debug!(fetched = page.len(), total = tweets.len(), "timeline page");
            if page.is_empty() {
                break;
            }
            // Next page starts just below the oldest id we have seen.
            max_id = page.last().map(|t| t.id.saturating_sub(1));
            tweets.extend(page);
        }

        tweets.truncate(count);
        Paged::complete(tweets)
    }

    /// Page through the accounts the user follows, `count` at most.
    pub async fn friends(&self, screen_name: Option<&str>, count: usize) -> Paged<Friend> {
        #[derive(Deserialize)]
        struct FriendsPage {
            users: Vec<Friend>,
            next_cursor: i64,
        }

        let mut friends: Vec<Friend> = Vec::new();
        let mut cursor: i64 = -1;

        while friends.len() < count && cursor != 0 {
            let page_size = FRIENDS_PAGE_SIZE.min(count - friends.len());
            let mut params = vec![
                ("count".to_string(), page_size.to_string()),
                ("cursor".to_string(), cursor.to_string()),
            ];
            if let Some(name) = screen_name {
                params.push(("screen_name".to_string(), name.to_string()));
            }

            let page: FriendsPage = match self.get("/friends/list.json", &params).await {
                Ok(page) => page,
                Err(error) => return Paged::interrupted(friends, error),
            };
            debug!(fetched = page.users.len(), "friends page");
            if page.users.is_empty() {
                break;
            }
            cursor = page.next_cursor;
            friends.extend(page.users);
        }

        friends.truncate(count);
        Paged::complete(friends)
    }

    /// Trending topics for a WOEID (1 is worldwide).
    pub async fn trends(&self, woeid: u32) -> Result<Vec<Trend>> {
        #[derive(Deserialize)]
        struct TrendsResult {
            trends: Vec<Trend>,
        }

        let params = vec![("id".to_string(), woeid.to_string())];
        let results: Vec<TrendsResult> = self.get("/trends/place.json", &params).await?;
        Ok(results
            .into_iter()
            .next()
            .map(|r| r.trends)
            .unwrap_or_default())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(String, String)],
    ) -> Result<T> {
        let url = format!("{}{}", self.api_url, endpoint);
        let auth_header = self.signer.sign("GET", &url, params)?;

        // Encode the query the same way the signature did, or they diverge.
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let full_url = if query.is_empty() {
            url
        } else {
            format!("{url}?{query}")
        };

        debug!(%full_url, "GET");
        let response = self
            .http
            .get(&full_url)
            .header("Authorization", auth_header)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(status.as_u16(), body));
        }
        Ok(response.json().await?)
    }
}
