//! URL layout of the feed API

use contracts::{ContractError, FeedConfig};
use url::Url;

/// URLs for one feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEndpoints {
    base_url: String,
    feed_id: String,
}

impl FeedEndpoints {
    pub fn new(base_url: &str, feed_id: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            feed_id: feed_id.to_string(),
        }
    }

    pub fn from_config(feed: &FeedConfig) -> Self {
        Self::new(&feed.base_url, &feed.feed_id)
    }

    pub fn feed_id(&self) -> &str {
        &self.feed_id
    }

    /// Stream create/update target (PUT)
    pub fn feed(&self) -> String {
        format!("{}/feeds/{}", self.base_url, self.feed_id)
    }

    /// Datapoint append target (POST)
    ///
    /// The stream id is percent-encoded as a single path segment.
    pub fn datapoints(&self, stream_id: &str) -> Result<String, ContractError> {
        let feed = self.feed();
        let mut url = Url::parse(&feed).map_err(|e| {
            ContractError::config_validation("feed.base_url", format!("'{feed}': {e}"))
        })?;
        url.path_segments_mut()
            .map_err(|()| {
                ContractError::config_validation("feed.base_url", format!("'{feed}' cannot take a path"))
            })?
            .extend(["datastreams", stream_id, "datapoints"]);
        Ok(url.into())
    }

    /// Feed state read (GET)
    pub fn feed_json(&self) -> String {
        format!("{}/feeds/{}.json", self.base_url, self.feed_id)
    }
}
