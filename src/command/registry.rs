//! Command registry
//!
//! Two scopes: top-level commands, and subcommands grouped by parent name.
//! Names are unique per scope; registering a name again replaces the entry in
//! place.

use crate::command::CommandSpec;
use crate::error::CliError;
use std::borrow::Cow;

/// All registered commands
#[derive(Debug, Clone, Default)]
pub struct Registry {
    commands: Vec<CommandSpec>,
    subcommands: Vec<(String, Vec<CommandSpec>)>,
}

/// A top-level command picked from the raw tokens
#[derive(Debug)]
pub struct Selection<'r, 'a> {
    pub command: Cow<'r, CommandSpec>,
    pub subcommands: &'r [CommandSpec],
    pub args: &'a [String],
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a command, or a subcommand when it has a parent
    pub fn insert(&mut self, spec: CommandSpec) {
        let scope = match &spec.parent {
            Some(parent) => self.scope_mut(parent),
            None => &mut self.commands,
        };
        match scope.iter_mut().find(|c| c.name == spec.name) {
            Some(existing) => {
                tracing::debug!(command = %spec.display_name(), "replacing command");
                *existing = spec;
            }
            None => {
                tracing::debug!(command = %spec.display_name(), "registered command");
                scope.push(spec);
            }
        }
    }

    /// Add a parent without a function that only groups subcommands
    pub fn insert_placeholder(&mut self, name: &str, description: Option<String>) {
        self.insert(CommandSpec::placeholder(name, description));
    }

    fn scope_mut(&mut self, parent: &str) -> &mut Vec<CommandSpec> {
        let index = match self.subcommands.iter().position(|(p, _)| p == parent) {
            Some(index) => index,
            None => {
                self.subcommands.push((parent.to_string(), Vec::new()));
                self.subcommands.len() - 1
            }
        };
        &mut self.subcommands[index].1
    }

    /// Top-level commands in registration order
    pub fn commands(&self) -> &[CommandSpec] {
        &self.commands
    }

    pub fn command(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.iter().find(|c| c.name == name)
    }

    /// Subcommands of `parent` in registration order
    pub fn subcommands(&self, parent: &str) -> &[CommandSpec] {
        self.subcommands
            .iter()
            .find(|(p, _)| p == parent)
            .map(|(_, subs)| subs.as_slice())
            .unwrap_or(&[])
    }

    pub fn subcommand(&self, parent: &str, name: &str) -> Option<&CommandSpec> {
        self.subcommands(parent).iter().find(|c| c.name == name)
    }

    /// Parent names that have subcommands
    pub fn parents(&self) -> impl Iterator<Item = &str> {
        self.subcommands.iter().map(|(p, _)| p.as_str())
    }

    pub fn has_subcommands(&self, name: &str) -> bool {
        !self.subcommands(name).is_empty()
    }

    /// The registered command, or an implicit placeholder for a parent that
    /// only has subcommands
    pub fn top_level(&self, name: &str) -> Option<Cow<'_, CommandSpec>> {
        match self.command(name) {
            Some(spec) => Some(Cow::Borrowed(spec)),
            None if self.has_subcommands(name) => {
                Some(Cow::Owned(CommandSpec::placeholder(name, None)))
            }
            None => None,
        }
    }

    /// The only command, when exactly one is registered and nothing has
    /// subcommands
    pub fn sole_command(&self) -> Option<&CommandSpec> {
        match (self.commands.as_slice(), self.subcommands.is_empty()) {
            ([only], true) => Some(only),
            _ => None,
        }
    }

    /// Every top-level name: commands first, then parents without an entry
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.iter().map(|c| c.name.clone()).collect();
        for parent in self.parents() {
            if self.command(parent).is_none() {
                names.push(parent.to_string());
            }
        }
        names
    }

    /// Pick the top-level command the tokens address
    pub fn select<'r, 'a>(&'r self, tokens: &'a [String]) -> Result<Selection<'r, 'a>, CliError> {
        let first = tokens.first().map(String::as_str).unwrap_or_default();
        if let Some(command) = self.top_level(first) {
            return Ok(Selection {
                subcommands: self.subcommands(first),
                command,
                args: &tokens[1..],
            });
        }
        if let Some(only) = self.sole_command() {
            tracing::debug!(command = %only.name, "single command mode");
            return Ok(Selection {
                command: Cow::Borrowed(only),
                subcommands: &[],
                args: tokens,
            });
        }
        Err(CliError::CommandNotFound {
            name: first.to_string(),
            available: self.names(),
        })
    }
}
