//! Command definitions and their resolved specs

use crate::command::{build_arguments, Arg, ArgumentSpec, Param};
use crate::error::RegistrationResult;
use crate::types::{ConverterTable, Values};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// The function bound to a command
pub type CommandFn = Rc<dyn Fn(&Values) -> anyhow::Result<()>>;

/// A command as the caller declares it: signature, metadata and function
#[derive(Clone)]
pub struct CommandDef {
    pub name: String,
    pub parent: Option<String>,
    pub description: Option<String>,
    pub params: Vec<Param>,
    pub args: HashMap<String, Arg>,
    pub allow_extra: bool,
    pub func: Option<CommandFn>,
}

impl CommandDef {
    pub fn new(name: impl Into<String>) -> Self {
        CommandDef {
            name: name.into(),
            parent: None,
            description: None,
            params: Vec::new(),
            args: HashMap::new(),
            allow_extra: false,
            func: None,
        }
    }

    /// Make this a subcommand of `parent`
    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declare the next parameter
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Attach CLI metadata to a declared parameter
    pub fn arg(mut self, name: impl Into<String>, arg: Arg) -> Self {
        self.args.insert(name.into(), arg);
        self
    }

    /// Capture unclaimed tokens into the extra parameter
    pub fn allow_extra(mut self) -> Self {
        self.allow_extra = true;
        self
    }

    pub fn func<F>(mut self, f: F) -> Self
    where
        F: Fn(&Values) -> anyhow::Result<()> + 'static,
    {
        self.func = Some(Rc::new(f));
        self
    }

    /// Resolve the declaration into a spec
    pub fn build(
        self,
        converters: &ConverterTable,
        extra_key: &str,
    ) -> RegistrationResult<CommandSpec> {
        let display = match &self.parent {
            Some(parent) => format!("{} {}", parent, self.name),
            None => self.name.clone(),
        };
        let extra_key = self.allow_extra.then_some(extra_key);
        let args = build_arguments(&display, &self.params, &self.args, converters, extra_key)?;
        Ok(CommandSpec {
            name: self.name,
            parent: self.parent,
            description: self.description,
            args,
            allow_extra: self.allow_extra,
            is_placeholder: false,
            func: self.func,
        })
    }
}

/// A registered command
#[derive(Clone)]
pub struct CommandSpec {
    pub name: String,
    pub parent: Option<String>,
    pub description: Option<String>,
    pub args: Vec<ArgumentSpec>,
    pub allow_extra: bool,

    /// Exists only to group subcommands
    pub is_placeholder: bool,

    /// Absent for placeholders and for commands loaded from a static export
    pub func: Option<CommandFn>,
}

impl CommandSpec {
    pub fn placeholder(name: impl Into<String>, description: Option<String>) -> Self {
        CommandSpec {
            name: name.into(),
            parent: None,
            description,
            args: Vec::new(),
            allow_extra: false,
            is_placeholder: true,
            func: None,
        }
    }

    /// `parent name` for subcommands
    pub fn display_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{} {}", parent, self.name),
            None => self.name.clone(),
        }
    }

    pub fn arg(&self, id: &str) -> Option<&ArgumentSpec> {
        self.args.iter().find(|a| a.id == id)
    }
}

impl fmt::Debug for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSpec")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("description", &self.description)
            .field("args", &self.args)
            .field("allow_extra", &self.allow_extra)
            .field("is_placeholder", &self.is_placeholder)
            .finish_non_exhaustive()
    }
}
