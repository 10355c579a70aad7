pub mod config;
pub mod constants;
pub mod error;
pub mod expiry;
pub mod extractor;
pub mod fetcher;
pub mod formatter;
pub mod logging;
pub mod normalizer;
pub mod notifier;
pub mod novelty;
pub mod pipeline;
pub mod rates;
pub mod storage;
pub mod subscribers;
pub mod telegram;
pub mod types;
