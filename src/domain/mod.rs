//! Pure domain types with minimal dependencies
//!
//! Types here know nothing about the UI layer or the recorder threads.

pub mod annotation;
pub mod geometry;
pub mod selection;

pub use annotation::*;
pub use geometry::*;
pub use selection::*;
