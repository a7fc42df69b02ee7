//! tests/api/health_check.rs

use crate::helpers::{spawn_app, spawn_app_with_store, BrokenStore};
use std::sync::Arc;

#[tokio::test]
async fn health_check_reports_active_subscribers() {
    // Arrange
    let test_app = spawn_app().await;
    test_app
        .subscriptions
        .subscribe("ursula_le_guin@gmail.com".into())
        .await
        .unwrap();

    // Act
    let response = test_app.get_response_from_url("/health_check").await;

    // Assert
    assert!(response.status().is_success());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["active_subscribers"], 1);
}

#[tokio::test]
async fn health_check_fails_if_the_store_is_unavailable() {
    // Arrange
    let test_app = spawn_app_with_store(Arc::new(BrokenStore)).await;

    // Act
    let response = test_app.get_response_from_url("/health_check").await;

    // Assert
    assert_eq!(response.status().as_u16(), 503);
}
