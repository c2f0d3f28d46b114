//! Expose docsite's command layer for use in integration tests. The binary is
//! the supported interface; this API may change without notice.
pub mod cli;
pub mod commands;
