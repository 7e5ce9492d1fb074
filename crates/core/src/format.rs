//! Output formatting options shared by all modules.

use serde::{Deserialize, Serialize};

/// Controls how generated fragments are joined into a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatOptions {
    /// Line separator placed between fragments.
    #[serde(default = "default_new_line")]
    pub new_line: String,

    /// Whether the program ends with a trailing line separator.
    #[serde(default = "default_final_newline")]
    pub final_newline: bool,
}

fn default_new_line() -> String {
    "\n".to_string()
}

fn default_final_newline() -> bool {
    true
}

impl FormatOptions {
    /// `\n` line endings.
    pub fn unix() -> Self {
        Self {
            new_line: default_new_line(),
            final_newline: default_final_newline(),
        }
    }

    /// `\r\n` line endings.
    pub fn windows() -> Self {
        Self {
            new_line: "\r\n".to_string(),
            final_newline: default_final_newline(),
        }
    }

    /// Sets whether a trailing line separator is emitted.
    pub fn with_final_newline(mut self, enabled: bool) -> Self {
        self.final_newline = enabled;
        self
    }
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self::unix()
    }
}
