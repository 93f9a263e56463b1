//! Brick Quote library crate.
//!
//! This crate turns a photo-based masonry estimate into a priced quote.
//! The estimation core (`validate`, `fallback`, `normalize`, `pricing`)
//! is synchronous and pure; `engine` drives it from a vision model
//! provider, and `api` serves the whole pipeline over HTTP.  External
//! applications may call [`engine::estimate_job`] and
//! [`pricing::price`] directly or embed the API via [`api::router`].

pub mod models;
pub mod error;
pub mod validate;
pub mod fallback;
pub mod normalize;
pub mod pricing;
pub mod format;
pub mod prompt;
pub mod provider;
pub mod engine;
pub mod store;
pub mod quote;
pub mod config;
pub mod logging;
pub mod api;
