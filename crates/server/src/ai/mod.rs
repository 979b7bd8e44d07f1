//! Language model integration: note generation and imaging extraction

pub mod client;
pub mod imaging;
pub mod sse;

pub use client::{ClaudeClient, ClaudeError};
pub use imaging::ImagingService;
