//! src/digest.rs

use crate::domain::{Article, Subscriber};
use askama_actix::Template;
use chrono::NaiveDate;

#[derive(Template)]
#[template(path = "digest_email.html")]
struct DigestHtmlTemplate<'a> {
    subject: &'a str,
    issue_date: &'a str,
    articles: &'a [Article],
    unsubscribe_link: &'a str,
}

#[derive(Template)]
#[template(path = "digest_email.txt")]
struct DigestTextTemplate<'a> {
    subject: &'a str,
    issue_date: &'a str,
    articles: &'a [Article],
    unsubscribe_link: &'a str,
}

/// One rendered message, ready for the mailer.
#[derive(Debug)]
pub struct DigestEmail {
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

/// The articles of one issue. Rendered once per subscriber, since every
/// message carries its own unsubscribe link.
#[derive(Debug, Clone)]
pub struct Digest {
    subject: String,
    issue_date: String,
    articles: Vec<Article>,
}

impl Digest {
    pub fn new(subject: &str, articles: Vec<Article>, issue_date: NaiveDate) -> Self {
        Self {
            subject: subject.to_owned(),
            issue_date: issue_date.format("%B %d, %Y").to_string(),
            articles,
        }
    }

    pub fn articles(&self) -> &[Article] {
        &self.articles
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn render(
        &self,
        subscriber: &Subscriber,
        base_url: &str,
    ) -> Result<DigestEmail, askama::Error> {
        self.render_with_link(&subscriber.unsubscribe_link(base_url))
    }

    /// Rendered for nobody in particular, the unsubscribe link carries a
    /// placeholder instead of a token.
    pub fn render_preview(&self, base_url: &str) -> Result<DigestEmail, askama::Error> {
        self.render_with_link(&format!(
            "{}/unsubscribe?token=<token>",
            base_url.trim_end_matches('/')
        ))
    }

    fn render_with_link(&self, unsubscribe_link: &str) -> Result<DigestEmail, askama::Error> {
        let html_body = DigestHtmlTemplate {
            subject: &self.subject,
            issue_date: &self.issue_date,
            articles: &self.articles,
            unsubscribe_link,
        }
        .render()?;
        let text_body = DigestTextTemplate {
            subject: &self.subject,
            issue_date: &self.issue_date,
            articles: &self.articles,
            unsubscribe_link,
        }
        .render()?;
        Ok(DigestEmail {
            subject: self.subject.clone(),
            html_body,
            text_body,
        })
    }
}
