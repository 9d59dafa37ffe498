//! A small user registry: JSON CRUD endpoints, an HTML listing page and a
//! health check, backed by SQLite.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
