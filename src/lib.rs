// src/lib.rs

//! oaisync Library
//!
//! Keeps local mirrors of member institution collections in step with their
//! ResourceSync sources and propagates every change into a Solr index.

pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
