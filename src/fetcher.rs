use std::sync::Arc;

use anyhow::{Context as _, anyhow};
use serde::de::DeserializeOwned;
use url::Url;

use crate::progress::{Progress, Resource};

/// Single-shot JSON reads. A failed request is reported to the caller and
/// never retried.
#[derive(Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    progress: Option<Arc<Progress>>,
}

impl Fetcher {
    pub fn new(user_agent: &str, progress: Option<Arc<Progress>>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build reqwest client")?;
        Ok(Self { client, progress })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        resource: Resource,
        url: Url,
    ) -> anyhow::Result<T> {
        if let Some(p) = &self.progress {
            p.fetch_start(resource, &url);
        }
        let res = self.get_json_inner(&url).await;
        if let Some(p) = &self.progress {
            match &res {
                Ok((_, len)) => p.fetch_ok(resource, &url, *len),
                Err(_) => p.fetch_err(resource, &url),
            }
        }
        res.map(|(value, _)| value)
    }

    async fn get_json_inner<T: DeserializeOwned>(&self, url: &Url) -> anyhow::Result<(T, usize)> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("GET {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("GET {} failed with status {}", url, status));
        }

        let bytes = resp.bytes().await.context("read response body")?;
        let value = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse json from {}", url))?;
        Ok((value, bytes.len()))
    }
}
