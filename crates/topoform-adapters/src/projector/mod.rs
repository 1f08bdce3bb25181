//! Graph-to-text projection.

pub mod compose;

pub use compose::ComposeProjector;
