//! tests/api/unsubscribe.rs

use crate::helpers::{assert_is_redirect_to, spawn_app};

const INVALID_LINK: &str =
    "<p><i>This unsubscribe link is invalid or has already been used.</i></p>";

#[tokio::test]
async fn unsubscribe_link_shows_a_confirmation_page() {
    // Arrange
    let test_app = spawn_app().await;
    let subscriber = test_app
        .subscriptions
        .subscribe("ursula_le_guin@gmail.com".into())
        .await
        .unwrap();
    let token = subscriber.unsubscribe_token.as_ref();

    // Act
    let response = test_app
        .get_response_from_url(&format!("/unsubscribe?token={}", token))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html_page = response.text().await.unwrap();
    assert!(html_page.contains("Stop sending AgentNews Weekly to ursula_le_guin@gmail.com?"));
    assert!(html_page.contains(&format!(
        r#"<input type="hidden" name="token" value="{}">"#,
        token
    )));
    // nothing changes before the form is submitted
    assert_eq!(test_app.subscriptions.count().await.unwrap(), 1);
}

#[tokio::test]
async fn unsubscribe_links_with_missing_invalid_or_unknown_tokens_redirect_home() {
    // Arrange
    let test_app = spawn_app().await;
    let test_cases = [
        ("/unsubscribe".to_owned(), "missing token"),
        ("/unsubscribe?token=".to_owned(), "empty token"),
        (
            format!("/unsubscribe?token={}", "_".repeat(32)),
            "invalid token",
        ),
        (
            format!("/unsubscribe?token={}", "1".repeat(32)),
            "unknown token",
        ),
    ];

    for (path, description) in test_cases {
        // Act - Part 1 - click the link
        let response = test_app.get_response_from_url(&path).await;

        // Assert
        assert_is_redirect_to(&response, "/");

        // Act - Part 2 - Follow the redirect
        let html_page = test_app.get_home_html().await;

        // Assert
        assert!(
            html_page.contains(INVALID_LINK),
            "The home page did not explain the failure for the {}.",
            description
        );
    }
}

#[tokio::test]
async fn posting_the_token_deactivates_the_subscriber() {
    // Arrange
    let test_app = spawn_app().await;
    let subscriber = test_app
        .subscriptions
        .subscribe("ursula_le_guin@gmail.com".into())
        .await
        .unwrap();

    // Act
    let response = test_app
        .post_unsubscribe(&serde_json::json!({
            "token": subscriber.unsubscribe_token.as_ref()
        }))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html_page = response.text().await.unwrap();
    assert!(html_page.contains("ursula_le_guin@gmail.com will no longer receive AgentNews Weekly."));
    assert_eq!(test_app.subscriptions.count().await.unwrap(), 0);
}

#[tokio::test]
async fn a_used_unsubscribe_link_is_rejected() {
    // Arrange
    let test_app = spawn_app().await;
    let subscriber = test_app
        .subscriptions
        .subscribe("ursula_le_guin@gmail.com".into())
        .await
        .unwrap();
    let form = serde_json::json!({ "token": subscriber.unsubscribe_token.as_ref() });
    test_app.post_unsubscribe(&form).await;

    // Act - Part 1 - submit the same token again
    let response = test_app.post_unsubscribe(&form).await;

    // Assert
    assert_is_redirect_to(&response, "/");

    // Act - Part 2 - Follow the redirect
    let html_page = test_app.get_home_html().await;
    assert!(html_page.contains(INVALID_LINK));

    // Act - Part 3 - the link itself no longer shows the confirmation page
    let response = test_app
        .get_response_from_url(&format!(
            "/unsubscribe?token={}",
            subscriber.unsubscribe_token.as_ref()
        ))
        .await;
    assert_is_redirect_to(&response, "/");
}

#[tokio::test]
async fn unsubscribe_by_email_deactivates_the_subscriber() {
    // Arrange
    let test_app = spawn_app().await;
    test_app
        .subscriptions
        .subscribe("ursula_le_guin@gmail.com".into())
        .await
        .unwrap();

    // Act
    let response = test_app
        .post_unsubscribe(&serde_json::json!({ "email": " Ursula_Le_Guin@gmail.com" }))
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(test_app.subscriptions.count().await.unwrap(), 0);
}

#[tokio::test]
async fn unsubscribe_by_unknown_email_is_a_no_op() {
    // Arrange
    let test_app = spawn_app().await;
    test_app
        .subscriptions
        .subscribe("ursula_le_guin@gmail.com".into())
        .await
        .unwrap();

    // Act - Part 1 - unsubscribe another address
    let response = test_app
        .post_unsubscribe(&serde_json::json!({ "email": "someone_else@gmail.com" }))
        .await;

    // Assert
    assert_is_redirect_to(&response, "/");
    assert_eq!(test_app.subscriptions.count().await.unwrap(), 1);

    // Act - Part 2 - Follow the redirect
    let html_page = test_app.get_home_html().await;
    assert!(html_page.contains("<p><i>This email address is not subscribed.</i></p>"));
}

#[tokio::test]
async fn resubscribing_after_unsubscribe_keeps_the_original_token() {
    // Arrange
    let test_app = spawn_app().await;
    let original = test_app
        .subscriptions
        .subscribe("ursula_le_guin@gmail.com".into())
        .await
        .unwrap();
    test_app
        .post_unsubscribe(&serde_json::json!({
            "token": original.unsubscribe_token.as_ref()
        }))
        .await;

    // Act
    let response = test_app
        .post_subscriptions("email=ursula_le_guin%40gmail.com".into())
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let subscribers = test_app.subscriptions.list_active().await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].unsubscribe_token, original.unsubscribe_token);
}
