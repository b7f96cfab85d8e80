//! Tree scanning: reduce a provider listing to candidate files

pub mod filter;

pub use filter::TreeFilter;
