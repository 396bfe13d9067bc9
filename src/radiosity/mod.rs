//! Hierarchical radiosity.

mod form_factor;
mod hierarchical;

// Re-export
pub use form_factor::*;
pub use hierarchical::*;
