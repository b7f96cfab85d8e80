//! repo-guide: sample a GitHub repository, get an architectural analysis from
//! a language model, and ask follow-up questions about the code.

pub mod analysis;
pub mod chat;
pub mod cli;
pub mod config;
pub mod domain;
pub mod fetch;
pub mod llm;
pub mod pipeline;
pub mod rank;
pub mod render;
pub mod scan;
pub mod utils;

#[cfg(test)]
mod testing;
