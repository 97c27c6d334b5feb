use std::fmt;
use clap::ValueEnum;

/// Router implementation the heartbeat handler is registered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RouterKind {
    /// axum's own method-aware router.
    Axum,
    /// Path-only multiplexer, wrapped to enforce the method.
    ServeMux,
}

impl fmt::Display for RouterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => Ok(()),
        }
    }
}
