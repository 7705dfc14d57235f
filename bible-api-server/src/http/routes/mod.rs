//! Route handlers organized by resource

pub mod health;
pub mod bible;
pub mod search;
pub mod auth;
pub mod devotionals;
