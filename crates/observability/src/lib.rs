//! Tracing/logging setup shared by the binaries.
//!
//! Filtering is driven by `RUST_LOG`; without it the default keeps our own
//! spans at `info` and quiets sqlx's per-statement logging.

pub mod logging;

pub use logging::{DEFAULT_FILTER, LogFormat, UnknownLogFormat, init, init_with};
