//! CLI-wide settings

use serde::{Deserialize, Serialize};

/// Default parameter name receiving unclaimed tokens
pub const DEFAULT_EXTRA_KEY: &str = "_extra";

/// Settings shared by all commands of a CLI
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Program name used in usage lines and docs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prog: Option<String>,

    /// Text printed above the commands overview
    #[serde(default)]
    pub help: String,

    /// Printed for `--version`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Parameter receiving unclaimed tokens for commands that capture them
    #[serde(default = "default_extra_key")]
    pub extra_key: String,
}

fn default_extra_key() -> String {
    DEFAULT_EXTRA_KEY.to_string()
}

impl Settings {
    pub fn new() -> Self {
        Settings {
            prog: None,
            help: String::new(),
            version: None,
            extra_key: default_extra_key(),
        }
    }

    pub fn with_prog(mut self, prog: impl Into<String>) -> Self {
        self.prog = Some(prog.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into().trim().to_string();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_extra_key(mut self, key: impl Into<String>) -> Self {
        self.extra_key = key.into();
        self
    }

    /// `prog` followed by `rest`, skipping empty parts
    pub fn bin_name(&self, rest: &str) -> String {
        crate::utils::join_strings([self.prog.as_deref(), Some(rest)], " ")
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}
