//! tests/api/subscriptions.rs

use crate::helpers::{assert_is_redirect_to, spawn_app, spawn_app_with_store, BrokenStore};
use std::sync::Arc;

#[tokio::test]
async fn subscribe_with_valid_email_shows_the_welcome_page() {
    // Arrange
    let test_app = spawn_app().await;

    // Act
    let response = test_app
        .post_subscriptions("email=ursula_le_guin%40gmail.com".into())
        .await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html_page = response.text().await.unwrap();
    assert!(html_page.contains("ursula_le_guin@gmail.com will receive the next issue"));
}

#[tokio::test]
async fn subscribe_persists_the_normalized_address() {
    // Arrange
    let test_app = spawn_app().await;

    // Act
    test_app
        .post_subscriptions("email=%20Ursula_Le_Guin%40Gmail.com%20".into())
        .await;

    // Assert
    let subscribers = test_app.subscriptions.list_active().await.unwrap();
    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].email.as_ref(), "ursula_le_guin@gmail.com");
    assert!(subscribers[0].active);
}

#[tokio::test]
async fn subscribing_twice_keeps_a_single_record() {
    // Arrange
    let test_app = spawn_app().await;

    // Act
    for _ in 0..2 {
        let response = test_app
            .post_subscriptions("email=ursula_le_guin%40gmail.com".into())
            .await;
        assert_eq!(response.status().as_u16(), 200);
    }

    // Assert
    assert_eq!(test_app.subscriptions.count().await.unwrap(), 1);
}

#[tokio::test]
async fn you_must_set_a_valid_email_to_subscribe() {
    // Arrange
    let test_app = spawn_app().await;
    let test_cases = vec![
        ("email=", "``"),
        ("email=definitely-not-an-email", "`definitely-not-an-email`"),
        ("email=%40gmail.com", "`@gmail.com`"),
    ];

    for (invalid_body, quoted_email) in test_cases {
        // Act - Part 1 - post subscription
        let response = test_app.post_subscriptions(invalid_body.into()).await;

        // Assert
        assert_is_redirect_to(&response, "/");

        // Act - Part 2 - Follow the redirect
        let html_page = test_app.get_home_html().await;

        // Assert
        assert!(
            html_page.contains(&format!(
                "<p><i>{} is not a valid subscriber email.</i></p>",
                quoted_email
            )),
            "The home page did not show the validation error for payload {}.",
            invalid_body
        );
    }
    assert_eq!(test_app.subscriptions.count().await.unwrap(), 0);
}

#[tokio::test]
async fn subscribe_returns_a_400_when_email_is_missing() {
    // Arrange
    let test_app = spawn_app().await;

    // Act
    let response = test_app.post_subscriptions("name=le%20guin".into()).await;

    // Assert
    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn storage_failures_are_reported_as_temporary() {
    // Arrange
    let test_app = spawn_app_with_store(Arc::new(BrokenStore)).await;

    // Act - Part 1 - post subscription
    let response = test_app
        .post_subscriptions("email=ursula_le_guin%40gmail.com".into())
        .await;

    // Assert
    assert_is_redirect_to(&response, "/");

    // Act - Part 2 - Follow the redirect
    let html_page = test_app.get_home_html().await;

    // Assert
    assert!(html_page
        .contains("<p><i>Service temporarily unavailable. Please try again later.</i></p>"));
}
