/**
 * Server Configuration
 *
 * This module handles loading of the storage backend from the
 * environment.
 *
 * # Configuration Sources
 *
 * Configuration is loaded from environment variables, with sensible
 * defaults for local development when possible.
 *
 * # Error Handling
 *
 * Configuration errors are logged but do not prevent server startup: if
 * `DATABASE_URL` is unset or the database is unreachable, the server runs
 * on the in-memory store instead of failing.
 */

use std::sync::Arc;

use sqlx::PgPool;

use crate::backend::friendship::store::{MemoryRelationStore, PgRelationStore, RelationStore};

/// Load the relation store from the environment
///
/// This function:
/// 1. Reads `DATABASE_URL` from environment
/// 2. Creates a PostgreSQL connection pool
/// 3. Runs database migrations
///
/// # Returns
///
/// - A Postgres-backed store if the database is successfully configured
/// - The in-memory store if `DATABASE_URL` is not set or connection fails
pub async fn load_store() -> Arc<dyn RelationStore> {
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!("DATABASE_URL not set. Using the in-memory store; data will not survive a restart.");
            return Arc::new(MemoryRelationStore::new());
        }
    };

    tracing::info!("Connecting to database...");

    let pool = match PgPool::connect(&database_url).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Failed to create database connection pool: {:?}", e);
            tracing::warn!("Falling back to the in-memory store.");
            return Arc::new(MemoryRelationStore::new());
        }
    };

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    match sqlx::migrate!().run(&pool).await {
        Ok(_) => {
            tracing::info!("Database migrations completed successfully");
        }
        Err(e) => {
            tracing::error!("Failed to run database migrations: {:?}", e);
            // Continue anyway - migrations might have already been run
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Arc::new(PgRelationStore::new(pool))
}
