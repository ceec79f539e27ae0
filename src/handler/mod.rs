//! Request handler module
//!
//! Content handlers and the router that dispatches requests to them.

pub mod content;
pub mod router;

// Re-export main entry point
pub use content::{BufferHandler, ContentHandler, DirHandler, DownloadHandler, IconHandler};
pub use router::{handle_request, Router};
