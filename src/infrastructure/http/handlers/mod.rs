//! HTTP Handlers

mod ping;
mod project;

pub use ping::*;
pub use project::*;
