//! Progress reporting for commands

/// Sink for user-facing progress output.
///
/// Commands report each long-running phase via `step`, one-off messages via
/// `println`, and interactive confirmations via `prompt`.
pub trait Logger: Send + Sync {
    /// Announce the start of a step, e.g. `step: uploading certificate`
    fn step(&self, message: &str);

    /// Print a plain line
    fn println(&self, message: &str);

    /// Ask the operator a yes/no question; returns true when confirmed
    fn prompt(&self, message: &str) -> bool;
}
