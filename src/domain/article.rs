//! src/domain/article.rs

/// One entry of the digest, as found on the news listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub summary: String,
}

impl Article {
    /// The listing page carries no teaser, so the title doubles as summary.
    pub fn new(title: String, link: String) -> Self {
        Self {
            summary: title.clone(),
            title,
            link,
        }
    }
}
