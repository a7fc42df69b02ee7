//! tests/api/delivery.rs

use crate::helpers::{spawn_app, CapturingMailer};
use agent_news::configuration::get_configuration;
use agent_news::delivery::{send_digest, DeliveryOutcome, DeliveryReport};
use agent_news::digest::Digest;
use agent_news::news_source::NewsScraper;
use chrono::Utc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BLOG_PAGE: &str = r#"
<html><body>
    <a href="/blog/agents-at-work">Agents at work: a field report</a>
    <a href="/blog/agents-at-work">Agents at work: a field report</a>
    <a href="/blog/tooling">Tooling for autonomous agents</a>
    <a href="/about">About</a>
</body></html>
"#;

/// Scrape a fake news site and build this week's digest from it.
async fn digest_from_fake_site() -> Digest {
    let news_site = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BLOG_PAGE))
        .expect(1)
        .mount(&news_site)
        .await;
    let mut configuration = get_configuration().expect("Failed to read configuration.");
    configuration.digest.base_url = news_site.uri();
    let articles = NewsScraper::new(&configuration.digest)
        .unwrap()
        .fetch_articles()
        .await
        .unwrap();
    Digest::new(&configuration.digest.subject, articles, Utc::now().date_naive())
}

#[tokio::test]
async fn digest_reaches_active_subscribers_only() {
    // Arrange
    let test_app = spawn_app().await;
    for email in ["a@example.com", "b@example.com", "c@example.com"] {
        test_app.subscriptions.subscribe(email.into()).await.unwrap();
    }
    test_app
        .subscriptions
        .unsubscribe_email("b@example.com".into())
        .await
        .unwrap();
    let mailer = CapturingMailer::default();
    let digest = digest_from_fake_site().await;

    // Act
    let outcome = send_digest(&test_app.subscriptions, &mailer, &digest, &test_app.address)
        .await
        .unwrap();

    // Assert
    assert_eq!(
        outcome,
        DeliveryOutcome::Delivered(DeliveryReport {
            delivered: 2,
            failed: 0
        })
    );
    let sent = mailer.sent();
    let mut recipients: Vec<_> = sent.iter().map(|m| m.recipient.as_str()).collect();
    recipients.sort();
    assert_eq!(recipients, vec!["a@example.com", "c@example.com"]);
    let message = &sent[0];
    assert!(message.subject.starts_with("AgentNews Weekly"));
    assert!(message.text_body.contains("1. Agents at work: a field report"));
    assert!(message.text_body.contains("2. Tooling for autonomous agents"));
    assert!(!message.text_body.contains("3. "));
}

#[tokio::test]
async fn unsubscribe_link_in_the_digest_works_end_to_end() {
    // Arrange
    let test_app = spawn_app().await;
    test_app
        .subscriptions
        .subscribe("ursula_le_guin@gmail.com".into())
        .await
        .unwrap();
    let mailer = CapturingMailer::default();
    let digest = digest_from_fake_site().await;
    send_digest(&test_app.subscriptions, &mailer, &digest, "http://127.0.0.1")
        .await
        .unwrap();
    let message = mailer.sent().remove(0);
    let text_link = test_app.get_unsubscribe_link(&message.text_body);
    let html_link = test_app.get_unsubscribe_link(&message.html_body);
    assert_eq!(text_link, html_link);

    // Act - Part 1 - click the link
    let response = test_app.click_email_link(text_link.clone()).await;
    assert_eq!(response.status().as_u16(), 200);

    // Act - Part 2 - confirm
    let token = text_link
        .query_pairs()
        .find(|(key, _)| key == "token")
        .map(|(_, value)| value.into_owned())
        .unwrap();
    let response = test_app
        .post_unsubscribe(&serde_json::json!({ "token": token }))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(test_app.subscriptions.count().await.unwrap(), 0);

    // a second digest skips the removed address
    let outcome = send_digest(&test_app.subscriptions, &mailer, &digest, "http://127.0.0.1")
        .await
        .unwrap();
    assert_eq!(outcome, DeliveryOutcome::NoSubscribers);
}
