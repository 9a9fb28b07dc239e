//! Client code for mcp-fetchserp.
//!
//! This crate provides the authenticated FetchSERP REST client, request
//! validation, and response normalization used by the server tools.

pub mod fetchserp;

pub use fetchserp::{
    FetchSerpClient, FetchSerpConfig, FetchSerpError, Method, ScrapedPage, SearchEngine, SerpRequest, SerpResponse,
    SerpResult, Upstream, scrape_page, search_serp,
};
