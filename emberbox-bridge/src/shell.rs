//! Guest shell lifecycle events.

/// A guest shell transition observed by the host. Ephemeral notifications,
/// not stored anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// The guest's startup script began executing.
    AutoexecStart,
    /// The guest's startup script finished executing.
    AutoexecEnd,
    /// Control returned to an idle guest prompt.
    ReturnToPrompt,
    /// A command was issued at the guest prompt.
    CommandIssued { name: String, args: String },
}

impl ShellEvent {
    /// Short label for log lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::AutoexecStart => "autoexec-start",
            Self::AutoexecEnd => "autoexec-end",
            Self::ReturnToPrompt => "return-to-prompt",
            Self::CommandIssued { .. } => "command-issued",
        }
    }
}
