//! Core types and trait definitions for the pubsync publication pipeline.
//!
//! This crate is deliberately free of HTTP, browser, and filesystem
//! dependencies. Every other crate depends on it.

pub mod collection;
pub mod publication;
pub mod run_log;
pub mod scrape;
pub mod store;
pub mod subject;
pub mod timestamp;
