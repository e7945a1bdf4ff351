//! UI components for Docshelf

pub mod documents;
pub mod route;
