use crate::session::Mode;

/// The coordinator's own defaults. Constructed directly by the enclosing
/// service; this crate has no CLI or file/env parsing of its own, that
/// surface is owned by whatever binds the coordinator to a network listener.
#[derive(Debug, Clone, Copy)]
pub struct Config {
    /// Commit strategy used when a session's own `mode` is `Unspecified`.
    pub default_mode: Mode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_mode: Mode::Multi,
        }
    }
}

impl Config {
    pub fn new(default_mode: Mode) -> Self {
        Self { default_mode }
    }

    /// Whether a session with `Mode::Unspecified` should run 2PC.
    pub fn default_is_twopc(&self) -> bool {
        matches!(self.default_mode, Mode::Twopc)
    }
}
