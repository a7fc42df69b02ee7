//! src/news_source.rs
//!
//! Scrapes the latest articles from the news listing page.

use crate::configuration::DigestSettings;
use crate::domain::Article;
use anyhow::Context;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Tried in order, the first one matching anything wins.
const ARTICLE_SELECTORS: [&str; 4] = [
    r#"a[href*="/blog/"]"#,
    ".article-link",
    "[data-article]",
    "article a",
];
/// Used on the site root when the listing page yields nothing.
const HOMEPAGE_SELECTOR: &str = r#"a[href*="/blog/"]"#;
/// Shorter link texts are navigation, not headlines.
const MIN_TITLE_CHARS: usize = 10;

struct LinkCandidate {
    href: String,
    title: String,
}

#[derive(Debug)]
pub struct NewsScraper {
    http_client: reqwest::Client,
    base_url: Url,
    listing_url: Url,
    max_articles: usize,
}

impl NewsScraper {
    pub fn new(settings: &DigestSettings) -> Result<Self, anyhow::Error> {
        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("Invalid news site url `{}`", settings.base_url))?;
        let listing_url = base_url
            .join(&settings.listing_path)
            .with_context(|| format!("Invalid listing path `{}`", settings.listing_path))?;
        let http_client = reqwest::Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout())
            .build()
            .context("Failed to build the http client")?;
        Ok(Self {
            http_client,
            base_url,
            listing_url,
            max_articles: settings.max_articles,
        })
    }

    /// Fetch the listing page and extract up to `max_articles` articles.
    /// An empty result is not an error.
    #[tracing::instrument(
        name = "Scrape latest articles",
        skip(self),
        fields(listing_url = %self.listing_url)
    )]
    pub async fn fetch_articles(&self) -> Result<Vec<Article>, anyhow::Error> {
        let page = self.get_html(&self.listing_url).await?;
        let mut candidates = find_candidates(&page, &ARTICLE_SELECTORS);
        if candidates.is_empty() {
            tracing::info!("Trying homepage for latest articles section");
            let home = self.get_html(&self.base_url).await?;
            candidates = find_candidates(&home, &[HOMEPAGE_SELECTOR]);
        }
        tracing::info!("Found {} potential article links", candidates.len());
        let articles = collect_articles(candidates, &self.base_url, self.max_articles);
        tracing::info!("Successfully scraped {} articles", articles.len());
        Ok(articles)
    }

    async fn get_html(&self, url: &Url) -> Result<String, anyhow::Error> {
        self.http_client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("News site answered {} with an error", url))?
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))
    }
}

/// Extract articles from an already downloaded listing page.
pub fn parse_articles(html: &str, base_url: &Url, max_articles: usize) -> Vec<Article> {
    collect_articles(
        find_candidates(html, &ARTICLE_SELECTORS),
        base_url,
        max_articles,
    )
}

fn find_candidates(html: &str, selectors: &[&str]) -> Vec<LinkCandidate> {
    let document = Html::parse_document(html);
    for selector in selectors.iter().filter_map(|s| Selector::parse(s).ok()) {
        let candidates: Vec<LinkCandidate> = document
            .select(&selector)
            .map(|element| LinkCandidate {
                href: element.value().attr("href").unwrap_or_default().to_owned(),
                title: element
                    .text()
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" "),
            })
            .collect();
        if !candidates.is_empty() {
            return candidates;
        }
    }
    Vec::new()
}

fn collect_articles(
    candidates: Vec<LinkCandidate>,
    base_url: &Url,
    max_articles: usize,
) -> Vec<Article> {
    let mut seen_links = HashSet::new();
    let mut articles = Vec::new();
    // look at a few extra links in case of duplicates
    for candidate in candidates.into_iter().take(max_articles.saturating_mul(2)) {
        if articles.len() >= max_articles {
            break;
        }
        let Some(link) = resolve_link(&candidate.href, base_url) else {
            continue;
        };
        if !seen_links.insert(link.clone()) {
            continue;
        }
        if candidate.title.chars().count() > MIN_TITLE_CHARS {
            articles.push(Article::new(candidate.title, link));
        }
    }
    articles
}

/// Site-relative links are resolved against `base_url`, absolute http(s)
/// links are kept, anything else is dropped.
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    if href.starts_with('/') {
        base_url.join(href).ok().map(String::from)
    } else if href.starts_with("http://") || href.starts_with("https://") {
        Url::parse(href).ok().map(String::from)
    } else {
        None
    }
}
