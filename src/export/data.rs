//! Static export data model
//!
//! A static export is a plain description of every command: enough to show
//! help, validate tokens and report errors without the functions or custom
//! converters that only exist in the live program. JSON by default, YAML for
//! `.yml`/`.yaml` files.

use crate::cli::{Cli, Settings};
use crate::command::{ArgKind, ArgumentSpec, CommandSpec, DefaultValue, Registry};
use crate::error::{StaticError, StaticResult};
use crate::types::{converter, Converter, ConverterTable, TypeTag, Value};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The whole exported CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticData {
    #[serde(flatten)]
    pub settings: Settings,

    /// Top-level commands in registration order
    #[serde(default)]
    pub commands: Vec<StaticCommand>,

    /// Subcommands grouped by parent
    #[serde(default)]
    pub subcommands: Vec<StaticGroup>,
}

/// The subcommands of one parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticGroup {
    pub parent: String,
    pub commands: Vec<StaticCommand>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticCommand {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub args: Vec<StaticArg>,

    #[serde(default)]
    pub allow_extra: bool,

    #[serde(default)]
    pub is_placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticArg {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub option: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,

    pub kind: ArgKind,

    #[serde(rename = "type")]
    pub ty: TypeTag,

    /// The type as written, e.g. `list[int]`
    #[serde(default)]
    pub type_name: String,

    pub default: DefaultValue,

    #[serde(default)]
    pub repeated: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,

    /// The live program converts this argument with its own converter
    #[serde(default)]
    pub has_converter: bool,
}

impl From<&ArgumentSpec> for StaticArg {
    fn from(spec: &ArgumentSpec) -> Self {
        StaticArg {
            id: spec.id.clone(),
            option: spec.option.clone(),
            short: spec.short.clone(),
            help: spec.help.clone(),
            kind: spec.kind,
            ty: spec.ty.clone(),
            type_name: spec.ty.to_string(),
            default: match &spec.default {
                DefaultValue::Value(value) => DefaultValue::Value(exportable(value)),
                DefaultValue::Required => DefaultValue::Required,
            },
            repeated: spec.repeated,
            choices: spec.choices.clone(),
            has_converter: spec.has_converter,
        }
    }
}

/// Custom values only survive as their display string
fn exportable(value: &Value) -> Value {
    match value {
        Value::Custom(custom) => Value::Str(custom.repr().to_string()),
        Value::List(items) => Value::List(items.iter().map(exportable).collect()),
        other => other.clone(),
    }
}

impl StaticArg {
    /// Rebuild the argument. Types the default table knows keep their converter;
    /// anything the live program converts itself passes through as a string.
    fn into_spec(self, table: &ConverterTable) -> ArgumentSpec {
        let converter = match self.kind {
            ArgKind::Positional | ArgKind::Option => Some(static_converter(&self, table)),
            _ => None,
        };
        ArgumentSpec {
            id: self.id,
            option: self.option,
            short: self.short,
            help: self.help,
            kind: self.kind,
            ty: self.ty,
            default: self.default,
            converter,
            repeated: self.repeated,
            choices: self.choices,
            has_converter: self.has_converter,
        }
    }
}

fn static_converter(arg: &StaticArg, table: &ConverterTable) -> Converter {
    match table.resolve(&arg.ty) {
        Ok(resolution) if !arg.has_converter || resolution.from_table => resolution.converter,
        _ => converter(|s| Ok(Value::Str(s.to_string()))),
    }
}

impl From<&CommandSpec> for StaticCommand {
    fn from(spec: &CommandSpec) -> Self {
        StaticCommand {
            name: spec.name.clone(),
            parent: spec.parent.clone(),
            description: spec.description.clone(),
            args: spec.args.iter().map(StaticArg::from).collect(),
            allow_extra: spec.allow_extra,
            is_placeholder: spec.is_placeholder,
        }
    }
}

impl StaticCommand {
    fn into_spec(self, table: &ConverterTable) -> CommandSpec {
        CommandSpec {
            name: self.name,
            parent: self.parent,
            description: self.description,
            args: self.args.into_iter().map(|a| a.into_spec(table)).collect(),
            allow_extra: self.allow_extra,
            is_placeholder: self.is_placeholder,
            func: None,
        }
    }
}

impl StaticData {
    /// Load from a JSON or YAML file
    pub fn read(path: impl AsRef<Path>) -> StaticResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(StaticError::InvalidPath(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|e| StaticError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loading static data");
        if is_yaml(path) {
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }

    /// Write as JSON, or YAML when the extension asks for it
    pub fn write(&self, path: impl AsRef<Path>) -> StaticResult<()> {
        let path = path.as_ref();
        let content = if is_yaml(path) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        fs::write(path, content)
            .map_err(|e| StaticError::Write(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "wrote static data");
        Ok(())
    }

    /// Rebuild a CLI without functions. Running it only checks the tokens.
    pub fn into_cli(self) -> Cli {
        let table = ConverterTable::default();
        let mut registry = Registry::new();
        for cmd in self.commands {
            registry.insert(cmd.into_spec(&table));
        }
        for group in self.subcommands {
            for cmd in group.commands {
                let mut spec = cmd.into_spec(&table);
                spec.parent.get_or_insert_with(|| group.parent.clone());
                registry.insert(spec);
            }
        }
        Cli::from_registry(self.settings, registry)
    }
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

impl Cli {
    /// The static description of this CLI
    pub fn to_static_data(&self) -> StaticData {
        let registry = self.registry();
        StaticData {
            settings: self.settings().clone(),
            commands: registry.commands().iter().map(StaticCommand::from).collect(),
            subcommands: registry
                .parents()
                .map(|parent| StaticGroup {
                    parent: parent.to_string(),
                    commands: registry
                        .subcommands(parent)
                        .iter()
                        .map(StaticCommand::from)
                        .collect(),
                })
                .collect(),
        }
    }

    /// Write the static description to `path`
    pub fn to_static(&self, path: impl AsRef<Path>) -> StaticResult<()> {
        self.to_static_data().write(path)
    }
}
