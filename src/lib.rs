//! Chika - average land-price records over HTTP
//!
//! Stores one flat table of priced real-estate records in SQLite and serves
//! it through validated list/get/create endpoints. All modules are public so
//! the integration tests can drive them directly.

pub mod entities;
pub mod errors;
pub mod import;
pub mod schemas;
pub mod settings;
pub mod storage;
pub mod web;
