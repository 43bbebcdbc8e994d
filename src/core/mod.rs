//! Platform layer shared by every route module: configuration, database
//! pool, error taxonomy, bootstrap and API docs plumbing.

pub mod aliases;
pub mod app_error;
pub mod app_state;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod swagger;
