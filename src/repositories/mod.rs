//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM
//! operations for database entities, providing a clean API for the HTTP
//! handlers.

pub mod translation_job;

pub use translation_job::TranslationJobRepository;
