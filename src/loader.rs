use anyhow::Context as _;
use clap::ValueEnum;
use url::Url;

use crate::fetcher::Fetcher;
use crate::model::{Job, PrepItem};
use crate::progress::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SiteLayout {
    /// Live API: `/api/jobs`, `/api/prep`, details under `/prep/{id}`.
    #[default]
    Api,
    /// Flattened export: `jobs.json`, `prep.json`, details at `prep_{id}.html`.
    Static,
}

/// Where the collections live and how detail links are spelled.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: Url,
    layout: SiteLayout,
}

impl Endpoints {
    /// For [`SiteLayout::Static`] the base should end with `/`, otherwise its
    /// last path segment is replaced when joining.
    pub fn new(base_url: Url, layout: SiteLayout) -> Self {
        Self { base_url, layout }
    }

    pub fn layout(&self) -> SiteLayout {
        self.layout
    }

    pub fn jobs_url(&self) -> anyhow::Result<Url> {
        self.resolve(match self.layout {
            SiteLayout::Api => "/api/jobs",
            SiteLayout::Static => "jobs.json",
        })
    }

    pub fn prep_url(&self) -> anyhow::Result<Url> {
        self.resolve(match self.layout {
            SiteLayout::Api => "/api/prep",
            SiteLayout::Static => "prep.json",
        })
    }

    /// Href written into the page; relative to the page like the rest of its links.
    pub fn prep_detail_href(&self, id: &str) -> String {
        match self.layout {
            SiteLayout::Api => format!("/prep/{id}"),
            SiteLayout::Static => format!("prep_{id}.html"),
        }
    }

    fn resolve(&self, path: &str) -> anyhow::Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("resolve {} against {}", path, self.base_url))
    }
}

pub struct DataLoader {
    fetcher: Fetcher,
    endpoints: Endpoints,
}

impl DataLoader {
    pub fn new(fetcher: Fetcher, endpoints: Endpoints) -> Self {
        Self { fetcher, endpoints }
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub async fn load_jobs(&self) -> anyhow::Result<Vec<Job>> {
        let url = self.endpoints.jobs_url()?;
        self.fetcher
            .get_json(Resource::Jobs, url)
            .await
            .context("fetch jobs")
    }

    pub async fn load_prep(&self) -> anyhow::Result<Vec<PrepItem>> {
        let url = self.endpoints.prep_url()?;
        self.fetcher
            .get_json(Resource::Prep, url)
            .await
            .context("fetch prep materials")
    }
}
