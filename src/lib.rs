pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod persist;
pub mod session;
pub mod tessellation;
pub mod topology;

pub use config::EditorConfig;
pub use error::{FloorgraphError, Result};
pub use session::{EditSession, Placement};
