//! tests/api/main.rs

mod delivery;
mod health_check;
mod home;
mod subscriptions;
mod unsubscribe;
