//! Language model adapters

pub mod gemini;
pub mod sse;

pub use gemini::{GeminiAnalyzer, GeminiSession};
