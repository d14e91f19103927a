//! Tracing setup: structured JSON logs, plus OpenTelemetry span export when
//! an OTLP endpoint is configured.
//!
//! # Telemetry invariants
//!
//! - **No key material, passwords, or envelope contents** may appear in any
//!   span attribute or log field. Paste ids, lengths and flags are fine.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`) and may be
//!   overridden with `RUST_LOG`.

pub mod init;

pub use init::init_telemetry;
