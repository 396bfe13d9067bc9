//! Ray intersection acceleration data structures.

mod bvh;

// Re-export
pub use bvh::*;
