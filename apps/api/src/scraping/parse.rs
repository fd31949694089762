//! HTML extraction for each supported platform. Pure functions over page source.

use std::collections::HashSet;

use scraper::{Html, Selector};

use crate::matching::skills::find_known_skills;
use crate::scraping::{GitHubProfile, LinkedInProfile, WebsiteProfile};

const MAX_REPOSITORIES: usize = 10;
const MAX_LANGUAGES: usize = 10;
const MAX_LANGUAGE_LEN: usize = 20;
const MAX_TEXT_BLOCKS: usize = 20;
const LINKEDIN_NOTE: &str = "LinkedIn restricts automated access";

pub fn parse_github(html: &str) -> GitHubProfile {
    let document = Html::parse_document(html);

    let repositories: Vec<String> = select_texts(&document, "a[data-hovercard-type='repository']")
        .into_iter()
        .take(MAX_REPOSITORIES)
        .collect();

    let mut seen = HashSet::new();
    let languages: Vec<String> = select_texts(&document, "[itemprop='programmingLanguage']")
        .into_iter()
        .filter(|lang| lang.chars().count() < MAX_LANGUAGE_LEN)
        .filter(|lang| seen.insert(lang.to_lowercase()))
        .take(MAX_LANGUAGES)
        .collect();

    GitHubProfile {
        name: first_text(&document, "span.p-name").unwrap_or_default(),
        bio: first_text(&document, "div.p-note").unwrap_or_default(),
        public_repos: repositories.len(),
        repositories,
        languages,
    }
}

pub fn parse_linkedin(html: &str) -> LinkedInProfile {
    let document = Html::parse_document(html);
    LinkedInProfile {
        profile_title: first_text(&document, "title").unwrap_or_default(),
        limited_access: true,
        note: LINKEDIN_NOTE.to_string(),
    }
}

/// Personal site or portfolio: title, meaningful text blocks and a technology scan.
pub fn parse_website(html: &str) -> WebsiteProfile {
    let document = Html::parse_document(html);

    let blocks: Vec<String> = select_texts(&document, "p, h1, h2, h3, h4, h5, h6, li")
        .into_iter()
        .filter(|text| (11..500).contains(&text.chars().count()))
        .take(MAX_TEXT_BLOCKS)
        .collect();
    let content = blocks.join(". ");

    WebsiteProfile {
        title: first_text(&document, "title").unwrap_or_default(),
        skills_found: find_known_skills(&content.to_lowercase()),
        content_length: content.chars().count(),
    }
}

fn first_text(document: &Html, selector: &str) -> Option<String> {
    select_texts(document, selector).into_iter().next()
}

/// Trimmed, non-empty text of every element matching `selector`, in document order.
fn select_texts(document: &Html, selector: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse(selector) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
        .collect()
}
