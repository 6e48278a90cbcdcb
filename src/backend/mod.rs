//! Device abstraction layer
//!
//! Provides the capability trait the cache drives, the descriptor types it
//! passes, and a recording implementation for tests.

pub mod recording;
pub mod traits;
pub mod types;

pub use recording::{KindStats, ObjectKind, RecordingDevice};
pub use traits::*;
pub use types::*;
