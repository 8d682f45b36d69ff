use serde::Serialize;

/// Classification of a process within one server instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessRole {
    /// Launcher script that starts (and may respawn) the binary
    ShellWrapper,
    /// The game server itself; authoritative liveness signal
    ServerBinary,
    /// Any other child of a tagged process
    Descendant,
}

impl ProcessRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ShellWrapper => "shell-wrapper",
            Self::ServerBinary => "server-binary",
            Self::Descendant => "descendant",
        }
    }
}
