//! HTTP protocol layer module
//!
//! Media type resolution and response writing, independent of routing.

pub mod mime;
pub mod response;

// Re-export commonly used types
pub use mime::{resolve_media_type, MimeRegistry, MimeResolver, StaticRegistry, SystemRegistry};
pub use response::{
    build_403_response, build_404_response, build_405_response, build_500_response,
    build_error_response, write_response, ContentSource, Disposition, ResponseSpec,
};
