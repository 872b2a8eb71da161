//! Anime Catalog Library
//!
//! Server-rendered anime streaming catalog backed by a remote content API:
//! a cached upstream client, paginated and debounced catalog sessions, the
//! ad-gated episode player and the actix-web routes that render it all.

pub mod client;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod error;
pub mod loader;
pub mod models;
pub mod player;
pub mod routes;
pub mod session;
pub mod views;
