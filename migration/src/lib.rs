//! Database migrations for the Polyglot translation service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2025_05_10_100000_create_shops;
mod m2025_05_10_100100_create_languages;
mod m2025_05_10_100200_create_resources;
mod m2025_05_10_100300_create_resource_fields;
mod m2025_05_10_100400_create_translations;
mod m2025_05_10_100500_create_translation_jobs;
mod m2025_05_10_100600_create_glossary_rules;
mod m2025_05_10_100700_create_token_wallets;
mod m2025_05_10_100800_create_token_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_05_10_100000_create_shops::Migration),
            Box::new(m2025_05_10_100100_create_languages::Migration),
            Box::new(m2025_05_10_100200_create_resources::Migration),
            Box::new(m2025_05_10_100300_create_resource_fields::Migration),
            Box::new(m2025_05_10_100400_create_translations::Migration),
            Box::new(m2025_05_10_100500_create_translation_jobs::Migration),
            Box::new(m2025_05_10_100600_create_glossary_rules::Migration),
            Box::new(m2025_05_10_100700_create_token_wallets::Migration),
            Box::new(m2025_05_10_100800_create_token_transactions::Migration),
        ]
    }
}
