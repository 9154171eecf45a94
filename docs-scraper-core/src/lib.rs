#![doc = "docs-scraper-core: core logic library for docs-scraper."]

//! Aggregates documentation from local trees, cloned repositories, Go module
//! docs and crate docs into a single Markdown/text document for LLM context.
//!
//! # Usage
//! The CLI crate builds a config, picks real collaborators from [`download`]
//! and [`command`], and calls one of the flows in [`pipeline`].

pub mod aggregate;
pub mod command;
pub mod config;
pub mod contract;
pub mod download;
pub mod extensions;
pub mod line_filter;
pub mod pipeline;
pub mod resolve;
pub mod walk;
