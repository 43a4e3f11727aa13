use tracing::{debug, instrument};

use crate::{AppError, Result};

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTTP session used for the market page. No timeout and no retry: a slow
/// upstream holds the request until the router's timeout layer gives up.
#[derive(Clone)]
pub struct Spider {
    client: reqwest::Client,
}

impl Spider {
    pub fn new() -> Result<Self> {
        let mut def_head = reqwest::header::HeaderMap::new();
        let accept = reqwest::header::HeaderValue::from_str("text/html,application/xhtml+xml")
            .map_err(|e| AppError::ReqwestError(e.to_string()))?;
        def_head.insert(reqwest::header::ACCEPT, accept);
        let client = reqwest::Client::builder()
            .gzip(true)
            .default_headers(def_head)
            .cookie_store(true)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Spider { client })
    }

    #[instrument(name = "fetching market page", skip(self))]
    pub async fn get_page(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        debug!("received {} bytes", body.len());
        Ok(body)
    }
}
