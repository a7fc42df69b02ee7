//! tests/api/home.rs

use crate::helpers::{spawn_app, spawn_app_with_store, BrokenStore};
use std::sync::Arc;

#[tokio::test]
async fn home_page_shows_both_forms_and_the_subscriber_count() {
    // Arrange
    let test_app = spawn_app().await;
    for email in ["a@example.com", "b@example.com"] {
        test_app.subscriptions.subscribe(email.into()).await.unwrap();
    }

    // Act
    let response = test_app.get_response_from_url("/").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html_page = response.text().await.unwrap();
    assert!(html_page.contains(r#"<form action="/subscriptions" method="post">"#));
    assert!(html_page.contains(r#"<form action="/unsubscribe" method="post">"#));
    assert!(html_page.contains(r#"<b id="active-subscribers">2</b>"#));
}

#[tokio::test]
async fn home_page_still_renders_without_a_store() {
    // Arrange
    let test_app = spawn_app_with_store(Arc::new(BrokenStore)).await;

    // Act
    let response = test_app.get_response_from_url("/").await;

    // Assert
    assert_eq!(response.status().as_u16(), 200);
    let html_page = response.text().await.unwrap();
    assert!(html_page.contains(r#"<form action="/subscriptions" method="post">"#));
    assert!(!html_page.contains("active-subscribers"));
}
