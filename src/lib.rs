// src/lib.rs

//! Tickets For Good event feeds.
//!
//! Scrapes the ticketing site's listing pages, merges events into bounded
//! per-location feeds and serves them as RSS.

pub mod error;
pub mod feed;
pub mod models;
pub mod pipeline;
pub mod server;
pub mod services;
pub mod utils;
