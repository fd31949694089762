/// Profile scraping collaborator used by the web-presence stage.
///
/// The engine depends on the `ProfileScraper` trait only; `HttpProfileScraper` is the
/// production implementation (reqwest + HTML parsing), dispatching on the link's host.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod parse;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("Scrape timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    #[error("Unsupported link: {0}")]
    Unsupported(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    GitHub,
    LinkedIn,
    Website,
}

impl Platform {
    pub fn from_host(host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        if host.contains("github.com") {
            Platform::GitHub
        } else if host.contains("linkedin.com") {
            Platform::LinkedIn
        } else {
            Platform::Website
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GitHubProfile {
    pub name: String,
    pub bio: String,
    pub repositories: Vec<String>,
    pub public_repos: usize,
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkedInProfile {
    pub profile_title: String,
    pub limited_access: bool,
    pub note: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WebsiteProfile {
    pub title: String,
    pub skills_found: Vec<String>,
    pub content_length: usize,
}

/// Scraped payload, tagged by platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "platform")]
pub enum ProfileData {
    GitHub(GitHubProfile),
    LinkedIn(LinkedInProfile),
    Website(WebsiteProfile),
}

impl ProfileData {
    pub fn platform(&self) -> Platform {
        match self {
            ProfileData::GitHub(_) => Platform::GitHub,
            ProfileData::LinkedIn(_) => Platform::LinkedIn,
            ProfileData::Website(_) => Platform::Website,
        }
    }

    /// Skills this profile reveals: GitHub languages or website technology hits.
    pub fn discovered_skills(&self) -> &[String] {
        match self {
            ProfileData::GitHub(p) => &p.languages,
            ProfileData::LinkedIn(_) => &[],
            ProfileData::Website(p) => &p.skills_found,
        }
    }

    pub fn repositories_count(&self) -> usize {
        match self {
            ProfileData::GitHub(p) => p.public_repos,
            _ => 0,
        }
    }
}

/// Scrapes one profile link. The timeout is per call; callers still wrap each call
/// in their own deadline.
#[async_trait]
pub trait ProfileScraper: Send + Sync {
    async fn scrape(&self, url: &str, timeout: Duration) -> Result<ProfileData, ScrapeError>;
}

#[derive(Clone)]
pub struct HttpProfileScraper {
    client: Client,
}

impl HttpProfileScraper {
    pub fn new() -> Result<Self, ScrapeError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }

    async fn fetch(&self, url: Url, timeout: Duration) -> Result<String, ScrapeError> {
        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| timeout_or_http(e, timeout))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        response.text().await.map_err(|e| timeout_or_http(e, timeout))
    }
}

#[async_trait]
impl ProfileScraper for HttpProfileScraper {
    async fn scrape(&self, url: &str, timeout: Duration) -> Result<ProfileData, ScrapeError> {
        let parsed = validate_url(url)?;
        let platform = Platform::from_host(parsed.host_str().unwrap_or_default());
        debug!("Scraping {url} as {platform:?}");

        let html = self.fetch(parsed, timeout).await?;

        Ok(match platform {
            Platform::GitHub => ProfileData::GitHub(parse::parse_github(&html)),
            Platform::LinkedIn => ProfileData::LinkedIn(parse::parse_linkedin(&html)),
            Platform::Website => ProfileData::Website(parse::parse_website(&html)),
        })
    }
}

/// Only absolute http(s) links with a host are scraped.
pub fn validate_url(url: &str) -> Result<Url, ScrapeError> {
    let parsed = Url::parse(url.trim()).map_err(|_| ScrapeError::InvalidUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ScrapeError::Unsupported(url.to_string()));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(ScrapeError::InvalidUrl(url.to_string()));
    }
    Ok(parsed)
}

fn timeout_or_http(e: reqwest::Error, timeout: Duration) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::Timeout(timeout)
    } else {
        ScrapeError::Http(e)
    }
}
