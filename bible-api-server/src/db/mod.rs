//! Database layer - connection pool, schema and repositories
//!
//! # Design Principles
//!
//! - Connection pool (max 5 connections by default)
//! - Lists come back from a single query (JOIN / ARRAY_AGG), no N+1
//! - Rely on DB constraints and classify violations, no check-then-insert
//! - Transactions for multi-step writes

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repos;

pub use error::DbError;
pub use pool::{create_pool, create_pool_with_options};
pub use repos::*;
pub use sqlx::PgPool;
