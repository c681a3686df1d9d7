//! Service layer for collaborators the engine needs from the host site.

pub mod file_urls;

pub use file_urls::StreamWrapperUrlResolver;
