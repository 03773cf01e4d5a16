//! # Polyglot Library
//!
//! This library provides the core functionality for the Polyglot translation
//! service: job orchestration, engine adapters, glossary preprocessing,
//! token accounting, and the HTTP API surface.

pub mod config;
pub mod db;
pub mod engines;
pub mod error;
pub mod executor;
pub mod glossary;
pub mod handlers;
pub mod ledger;
pub mod models;
pub mod orchestrator;
pub mod repositories;
pub mod server;
pub mod telemetry;
pub use migration;
