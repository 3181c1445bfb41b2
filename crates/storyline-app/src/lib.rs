//! Text robot of an automated video pipeline: fetches an encyclopedia
//! article, cleans and segments it, and annotates the kept sentences with
//! keywords.

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod paths;
pub mod pipeline;
pub mod services;
pub mod state;
pub mod text;
