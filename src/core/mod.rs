//! Core translation engine module

pub mod cancel;
pub mod chunker;
pub mod client;
pub mod config;
pub mod errors;
pub mod models;
pub mod pacing;
pub mod retry;
pub mod translator;

#[cfg(test)]
pub(crate) mod testing;
