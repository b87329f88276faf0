//! Command registry: the closed set of protocol commands.
//!
//! Maps command names to their arity, prompt text, dispatch kind, and
//! response policy. The table is built once at process start, is immutable
//! thereafter, and is shared read-only across all sessions.
//!
//! | Command           | Arity | Prompt        | Reply on success      |
//! |-------------------|-------|---------------|-----------------------|
//! | `DIR`             | 1     | `ENTER PATH`  | file list             |
//! | `DELETE`          | 1     | `ENTER PATH`  | `FILE DELETED`        |
//! | `COPY`            | 2     | `ENTER PATHS` | `FILE COPIED`         |
//! | `EXECUTE`         | 1     | `ENTER PATH`  | `PROGRAM EXECUTED`    |
//! | `TAKE SCREENSHOT` | 0     | —             | base64 image          |
//! | `EXIT`            | 0     | —             | `GOODBYE`, then close |

/// Reply sent for a command name that is not in the registry.
pub const UNKNOWN_COMMAND: &str = "Unknown command";

/// Prompt for commands taking a single path argument.
pub const PROMPT_PATH: &str = "ENTER PATH";

/// Prompt for commands taking two path arguments.
pub const PROMPT_PATHS: &str = "ENTER PATHS";

/// Dispatch target of a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// List the files in a directory.
    ListDir,
    /// Delete a file.
    Delete,
    /// Copy a file to a new destination.
    Copy,
    /// Execute a program and wait for it to finish.
    Execute,
    /// Capture a screenshot of the host display.
    Screenshot,
    /// End the session.
    Exit,
}

/// Static description of one protocol command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Dispatch target.
    pub kind: CommandKind,
    /// Canonical upper-case command name.
    pub name: &'static str,
    /// Number of string arguments required before dispatch.
    pub arity: usize,
    /// Prompt sent to the client when `arity > 0`.
    pub prompt: Option<&'static str>,
    /// Fixed acknowledgement sent on success; `None` means the operation's
    /// own output is returned to the client instead.
    pub ack: Option<&'static str>,
}

/// The full command table.
const COMMANDS: [CommandSpec; 6] = [
    CommandSpec {
        kind: CommandKind::ListDir,
        name: "DIR",
        arity: 1,
        prompt: Some(PROMPT_PATH),
        ack: None,
    },
    CommandSpec {
        kind: CommandKind::Delete,
        name: "DELETE",
        arity: 1,
        prompt: Some(PROMPT_PATH),
        ack: Some("FILE DELETED"),
    },
    CommandSpec {
        kind: CommandKind::Copy,
        name: "COPY",
        arity: 2,
        prompt: Some(PROMPT_PATHS),
        ack: Some("FILE COPIED"),
    },
    CommandSpec {
        kind: CommandKind::Execute,
        name: "EXECUTE",
        arity: 1,
        prompt: Some(PROMPT_PATH),
        ack: Some("PROGRAM EXECUTED"),
    },
    CommandSpec {
        kind: CommandKind::Screenshot,
        name: "TAKE SCREENSHOT",
        arity: 0,
        prompt: None,
        ack: None,
    },
    CommandSpec {
        kind: CommandKind::Exit,
        name: "EXIT",
        arity: 0,
        prompt: None,
        ack: Some("GOODBYE"),
    },
];

/// Process-wide, read-only command table.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    table: &'static [CommandSpec],
}

impl CommandRegistry {
    /// Build the registry over the static command table.
    #[must_use]
    pub fn new() -> Self {
        Self { table: &COMMANDS }
    }

    /// Look up a command by name, case-insensitively.
    ///
    /// The incoming text is upper-cased before comparison, so `delete` and
    /// `Take Screenshot` both resolve.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&CommandSpec> {
        let upper = name.to_uppercase();
        self.table.iter().find(|spec| spec.name == upper)
    }

    /// All registered command specs, in table order.
    #[must_use]
    pub fn commands(&self) -> &[CommandSpec] {
        self.table
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
