pub mod build;
pub mod merge;
pub mod stats;
pub mod vocabulary;

// Re-export command functions for convenience
pub use build::build;
pub use merge::{merge, MergeOverrides};
pub use stats::stats;
pub use vocabulary::vocabulary;
