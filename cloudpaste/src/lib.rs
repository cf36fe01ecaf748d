// ABOUTME: Library exports for cloudpaste: image processing, placeholders, negotiation and paste flow
// ABOUTME: Makes internal modules available to the binary, integration tests and benchmarks

pub mod cli;
pub mod cli_output;
pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod interactive;
pub mod media;
pub mod negotiation;
pub mod paste;
pub mod placeholder;

pub use error::PasteError;
