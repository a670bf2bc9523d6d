//! Multilingual music metadata name matching - shared modules for the CLI.

pub mod album;
pub mod artists;
pub mod enclosure;
pub mod error;
pub mod lang;
pub mod models;
pub mod name;
pub mod normalize;
pub mod numbers;
pub mod progress;
pub mod romanize;
pub mod scoring;
pub mod spellcheck;
