//! Search-and-scrape pipeline: resolve a query into ranked web results,
//! fetch each page, extract its readable content, and segment it into
//! bounded chunks.

pub mod api;
pub mod chunker;
pub mod config;
pub mod data_models;
pub mod extractor;
pub mod fetcher;
pub mod pipeline;
pub mod providers;
pub mod resolver;
