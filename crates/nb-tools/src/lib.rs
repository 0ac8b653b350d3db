//! nb-tools: News fetching tools for newsbrief
//!
//! This crate provides the only capability the summarizer agent is given:
//! - `NewsDataClient`: one search request against the NewsData.io API
//! - `NewsFetcher`: picks one random article body from a search
//! - `LatestNewsTool`: the fetcher exposed to the LLM as a callable tool

pub mod news;

pub use news::{
    select_article, Article, LatestNewsTool, NewsDataClient, NewsFetcher, NewsQueryConfig,
    DEFAULT_NEWS_BASE_URL,
};
