//! vocab-retention: terminal vocabulary trainer.

pub mod account;
pub mod config;
pub mod deck;
pub mod identity;
pub mod report;
pub mod review;
pub mod stats;
pub mod tui;
pub mod types;
