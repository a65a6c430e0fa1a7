// src/lib.rs

//! Rufus: a focused, score-bounded web crawler.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
