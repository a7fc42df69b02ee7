//! src/lib.rs

pub mod cli;
pub mod configuration;
pub mod delivery;
pub mod digest;
pub mod domain;
pub mod email_client;
pub mod error;
pub mod news_source;
pub mod routes;
pub mod startup;
pub mod storage;
pub mod telemetry;
pub mod utils;
