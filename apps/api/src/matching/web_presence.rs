//! Web presence: scrape the candidate's linked profiles and turn the results into a capped boost.
//!
//! Collection is failure-isolated: every link is scraped concurrently under its own
//! deadline, and a failing or hanging link only increments `failed_scrapes`.

use std::collections::HashSet;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::scraping::{ProfileData, ProfileScraper};

pub const MAX_LINKS: usize = 5;
const PRESENCE_BOOST: f64 = 2.0;
const REPOS_PER_POINT: f64 = 5.0;
const MAX_REPOS_BOOST: f64 = 5.0;
const BOOST_PER_SKILL: f64 = 0.5;
const MAX_SKILLS_BOOST: f64 = 3.0;
pub const MAX_WEB_BOOST: f64 = 10.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedProfile {
    pub url: String,
    #[serde(flatten)]
    pub data: ProfileData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebPresenceResult {
    pub total_links: usize,
    pub successful_scrapes: usize,
    pub failed_scrapes: usize,
    pub profiles: Vec<ScrapedProfile>,
    /// Skills found online that the résumé does not already list.
    pub additional_skills: Vec<String>,
    pub repositories_count: usize,
    pub direct_github_provided: bool,
    pub direct_linkedin_provided: bool,
}

/// Additive boost rules, each independently capped, then globally capped at 10.
/// No result (stage disabled) means no boost.
pub fn compute_web_score_boost(web: Option<&WebPresenceResult>) -> f64 {
    let Some(web) = web else {
        return 0.0;
    };

    let mut boost = 0.0;
    if web.successful_scrapes > 0 {
        boost += PRESENCE_BOOST;
    }
    boost += (web.repositories_count as f64 / REPOS_PER_POINT).min(MAX_REPOS_BOOST);
    boost += (web.additional_skills.len() as f64 * BOOST_PER_SKILL).min(MAX_SKILLS_BOOST);

    boost.clamp(0.0, MAX_WEB_BOOST)
}

/// Links to scrape: direct GitHub, then direct LinkedIn, then résumé links; blanks dropped,
/// schemeless links given `https://`, duplicates removed, at most five kept.
pub fn build_link_list(
    resume_links: &[String],
    github_url: Option<&str>,
    linkedin_url: Option<&str>,
) -> Vec<String> {
    let mut seen = HashSet::new();
    github_url
        .into_iter()
        .chain(linkedin_url)
        .chain(resume_links.iter().map(String::as_str))
        .filter_map(normalize_link)
        .filter(|link| seen.insert(link.trim_end_matches('/').to_lowercase()))
        .take(MAX_LINKS)
        .collect()
}

fn normalize_link(raw: &str) -> Option<String> {
    let link = raw.trim().trim_end_matches(['.', ',', ';', ':', '!', '?']);
    if link.is_empty() {
        return None;
    }
    let lower = link.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(link.to_string())
    } else if link.contains("://") || lower.starts_with("mailto:") {
        // Non-web scheme: kept so the scraper reports it as unsupported.
        Some(link.to_string())
    } else {
        Some(format!("https://{link}"))
    }
}

fn is_provided(url: Option<&str>) -> bool {
    url.is_some_and(|u| !u.trim().is_empty())
}

pub async fn collect_web_presence(
    scraper: &dyn ProfileScraper,
    resume_links: &[String],
    github_url: Option<&str>,
    linkedin_url: Option<&str>,
    resume_skills: &[String],
    timeout: Duration,
) -> WebPresenceResult {
    let links = build_link_list(resume_links, github_url, linkedin_url);
    let mut result = WebPresenceResult {
        total_links: links.len(),
        direct_github_provided: is_provided(github_url),
        direct_linkedin_provided: is_provided(linkedin_url),
        ..Default::default()
    };

    if links.is_empty() {
        info!("No profile links to scrape");
        return result;
    }

    info!("Starting web scraping of {} candidate links", links.len());

    let outcomes = join_all(links.iter().map(|link| async move {
        let outcome = tokio::time::timeout(timeout, scraper.scrape(link, timeout)).await;
        (link, outcome)
    }))
    .await;

    let mut known: HashSet<String> = resume_skills.iter().map(|s| s.trim().to_lowercase()).collect();

    for (link, outcome) in outcomes {
        match outcome {
            Ok(Ok(data)) => {
                debug!("Scraped {link} ({:?})", data.platform());
                result.successful_scrapes += 1;
                result.repositories_count += data.repositories_count();
                for skill in data.discovered_skills() {
                    if known.insert(skill.trim().to_lowercase()) {
                        result.additional_skills.push(skill.trim().to_string());
                    }
                }
                result.profiles.push(ScrapedProfile {
                    url: link.clone(),
                    data,
                });
            }
            Ok(Err(e)) => {
                warn!("Scraping {link} failed: {e}");
                result.failed_scrapes += 1;
            }
            Err(_) => {
                warn!("Scraping {link} timed out after {timeout:?}");
                result.failed_scrapes += 1;
            }
        }
    }

    info!(
        "Web scraping complete: {} successful, {} failed",
        result.successful_scrapes, result.failed_scrapes
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scraping::{GitHubProfile, LinkedInProfile, ScrapeError, WebsiteProfile};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// Serves canned profiles by URL substring; "hang" never answers, unknown links fail.
    struct StubScraper {
        calls: Mutex<Vec<String>>,
    }

    impl StubScraper {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ProfileScraper for StubScraper {
        async fn scrape(&self, url: &str, _: Duration) -> Result<ProfileData, ScrapeError> {
            self.calls.lock().unwrap().push(url.to_string());
            if url.contains("hang") {
                std::future::pending::<()>().await;
            }
            if url.contains("github.com") {
                Ok(ProfileData::GitHub(GitHubProfile {
                    public_repos: 12,
                    languages: strings(&["Rust", "Python", "Go"]),
                    ..Default::default()
                }))
            } else if url.contains("linkedin.com") {
                Ok(ProfileData::LinkedIn(LinkedInProfile::default()))
            } else if url.contains("portfolio") {
                Ok(ProfileData::Website(WebsiteProfile {
                    skills_found: strings(&["Docker", "rust", "Kubernetes"]),
                    ..Default::default()
                }))
            } else {
                Err(ScrapeError::Status(404))
            }
        }
    }

    #[test]
    fn test_boost_scenario_twelve_repos_four_skills() {
        let web = WebPresenceResult {
            successful_scrapes: 1,
            repositories_count: 12,
            additional_skills: strings(&["Rust", "Go", "Docker", "Kafka"]),
            ..Default::default()
        };
        let boost = compute_web_score_boost(Some(&web));
        assert!((boost - 6.4).abs() < 1e-9, "Boost was {boost}");
    }

    #[test]
    fn test_boost_is_capped_at_ten() {
        let web = WebPresenceResult {
            successful_scrapes: 5,
            repositories_count: 500,
            additional_skills: (0..40).map(|i| format!("skill-{i}")).collect(),
            ..Default::default()
        };
        assert_eq!(compute_web_score_boost(Some(&web)), 10.0);
    }

    #[test]
    fn test_no_result_or_failures_give_no_boost() {
        assert_eq!(compute_web_score_boost(None), 0.0);
        let failed = WebPresenceResult {
            total_links: 3,
            failed_scrapes: 3,
            ..Default::default()
        };
        assert_eq!(compute_web_score_boost(Some(&failed)), 0.0);
    }

    #[test]
    fn test_link_list_prioritises_direct_urls_and_dedups() {
        let links = build_link_list(
            &strings(&["https://github.com/jane/", "janedoe.dev", "  ", "www.linkedin.com/in/jane"]),
            Some("https://github.com/jane"),
            Some(" "),
        );
        assert_eq!(
            links,
            vec![
                "https://github.com/jane",
                "https://janedoe.dev",
                "https://www.linkedin.com/in/jane",
            ]
        );
    }

    #[test]
    fn test_link_list_truncates_to_five() {
        let resume: Vec<String> = (0..8).map(|i| format!("https://site{i}.dev")).collect();
        let links = build_link_list(&resume, None, Some("linkedin.com/in/jane"));
        assert_eq!(links.len(), MAX_LINKS);
        assert_eq!(links[0], "https://linkedin.com/in/jane");
    }

    #[tokio::test]
    async fn test_collect_aggregates_and_excludes_resume_skills() {
        let scraper = StubScraper::new();
        let result = collect_web_presence(
            &scraper,
            &strings(&["https://jane.dev/portfolio", "https://broken.example"]),
            Some("github.com/jane"),
            None,
            &strings(&["Python"]),
            Duration::from_secs(10),
        )
        .await;

        assert_eq!(result.total_links, 3);
        assert_eq!(result.successful_scrapes, 2);
        assert_eq!(result.failed_scrapes, 1);
        assert_eq!(result.repositories_count, 12);
        assert_eq!(result.additional_skills, vec!["Rust", "Go", "Docker", "Kubernetes"]);
        assert!(result.direct_github_provided);
        assert!(!result.direct_linkedin_provided);
        assert_eq!(result.profiles[0].url, "https://github.com/jane");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_link_times_out_without_blocking_others() {
        let scraper = StubScraper::new();
        let result = collect_web_presence(
            &scraper,
            &strings(&["https://hang.example", "https://linkedin.com/in/jane"]),
            None,
            None,
            &[],
            Duration::from_secs(10),
        )
        .await;

        assert_eq!(result.successful_scrapes, 1);
        assert_eq!(result.failed_scrapes, 1);
        assert_eq!(scraper.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_collect_without_links_scrapes_nothing() {
        let scraper = StubScraper::new();
        let result =
            collect_web_presence(&scraper, &[], None, None, &[], Duration::from_secs(10)).await;
        assert_eq!(result.total_links, 0);
        assert!(scraper.calls.lock().unwrap().is_empty());
        assert_eq!(compute_web_score_boost(Some(&result)), 0.0);
    }
}
