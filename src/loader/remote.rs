use std::time::Duration;

use reqwest::StatusCode;

use super::{parse_word_lines, WordRecord};
use crate::error::DictError;

/// Fetches remote word lists over HTTP GET.
pub struct RemoteWordSource {
    client: reqwest::Client,
}

impl RemoteWordSource {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Result<Self, DictError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(read_timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch one configured URL. Requires HTTP 200; the body is decoded with
    /// the response's declared charset, defaulting to UTF-8, and parsed as
    /// one word per line.
    pub async fn fetch(&self, url: &str) -> Result<Vec<WordRecord>, DictError> {
        let response = self.client.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(DictError::HttpStatus {
                url: url.to_string(),
                status: response.status(),
            });
        }
        let body = response.text().await?;
        Ok(parse_word_lines(&body))
    }
}
