//! Core functionality: document records, file stores, loading and configuration

pub mod config;
pub mod demo;
pub mod document;
pub mod file_store;
pub mod loader;
pub mod task;
