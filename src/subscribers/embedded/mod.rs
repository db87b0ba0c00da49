//! # Built-in subscribers
//!
//! Small, self-contained implementations useful for demos and debugging.
//!
//! - [`LogWriter`]: logs every message through `tracing` (demo/debug).

mod log;

pub use log::LogWriter;
