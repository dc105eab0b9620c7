//! Small helpers shared across the workspace.

pub mod ids;

pub use ids::{generate_id, next_created_at};
