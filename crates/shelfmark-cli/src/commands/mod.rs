pub mod auth;
pub mod collection;
pub mod config;
pub mod entry;
pub mod snapshot;
pub mod status;
