pub mod args;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod evaluate;
pub mod inference;
pub mod output;
pub mod types;
