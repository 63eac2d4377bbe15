//! Argument metadata and descriptor building
//!
//! A command declares its parameters explicitly ([`Param`]) and attaches CLI
//! metadata to some of them ([`Arg`]). [`build_arguments`] combines both with
//! the converter table into one [`ArgumentSpec`] per parameter.

use crate::error::{RegistrationError, RegistrationResult};
use crate::types::{converter, Converter, ConverterTable, Resolution, TypeTag, Value};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// CLI metadata for one parameter
#[derive(Clone, Default)]
pub struct Arg {
    /// Long flag, e.g. `--age`
    pub option: Option<String>,

    /// Short flag, e.g. `-a`
    pub short: Option<String>,

    /// Help text
    pub help: Option<String>,

    /// Converter for this argument only
    pub converter: Option<Converter>,

    /// Count occurrences of the flag instead of taking a value
    pub count: bool,
}

impl Arg {
    /// A positional argument
    pub fn new() -> Self {
        Self::default()
    }

    /// A flagged argument
    pub fn option(option: impl Into<String>) -> Self {
        Arg {
            option: Some(option.into()),
            ..Self::default()
        }
    }

    pub fn short(mut self, short: impl Into<String>) -> Self {
        self.short = Some(short.into());
        self
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn converter<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<Value> + 'static,
    {
        self.converter = Some(converter(f));
        self
    }

    pub fn count(mut self) -> Self {
        self.count = true;
        self
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arg")
            .field("option", &self.option)
            .field("short", &self.short)
            .field("help", &self.help)
            .field("converter", &self.converter.is_some())
            .field("count", &self.count)
            .finish()
    }
}

/// A parameter default, or the marker that it has none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    Required,
    Value(Value),
}

impl DefaultValue {
    pub fn is_required(&self) -> bool {
        matches!(self, DefaultValue::Required)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            DefaultValue::Required => None,
            DefaultValue::Value(v) => Some(v),
        }
    }
}

/// One declared parameter of a command function
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: TypeTag,
    pub default: DefaultValue,
}

impl Param {
    /// A parameter without a default
    pub fn new(name: impl Into<String>, ty: TypeTag) -> Self {
        Param {
            name: name.into(),
            ty,
            default: DefaultValue::Required,
        }
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultValue::Value(value.into());
        self
    }
}

/// How an argument is presented to the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    /// Taken by position
    Positional,
    /// `--flag value`
    Option,
    /// `--flag` sets true; a negatable switch also accepts `--no-flag`
    Switch { negatable: bool },
    /// Number of `--flag` occurrences
    Count,
    /// Unclaimed trailing tokens
    Extra,
}

/// The normalized CLI presentation of one parameter
#[derive(Clone)]
pub struct ArgumentSpec {
    pub id: String,
    pub option: Option<String>,
    pub short: Option<String>,
    pub help: Option<String>,
    pub kind: ArgKind,

    /// The declared type
    pub ty: TypeTag,
    pub default: DefaultValue,

    /// Set for positionals and options
    pub converter: Option<Converter>,
    pub repeated: bool,
    pub choices: Option<Vec<String>>,

    /// The converter came from a local or registered override
    pub has_converter: bool,
}

impl ArgumentSpec {
    /// Flag or positional name, as shown in messages
    pub fn display_name(&self) -> &str {
        self.option.as_deref().unwrap_or(&self.id)
    }

    pub fn is_flagged(&self) -> bool {
        !matches!(self.kind, ArgKind::Positional | ArgKind::Extra)
    }

    /// Help text with the type and default appended
    pub fn full_help(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(help) = &self.help {
            parts.push(help.clone());
        }
        if self.kind != ArgKind::Extra {
            parts.push(format!("({})", self.ty));
        }
        if let Some(default) = self.default.value() {
            if !default.is_none() && !matches!(self.kind, ArgKind::Switch { negatable: false }) {
                parts.push(format!("[default: {}]", default));
            }
        }
        parts.join(" ")
    }
}

impl fmt::Debug for ArgumentSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgumentSpec")
            .field("id", &self.id)
            .field("option", &self.option)
            .field("short", &self.short)
            .field("kind", &self.kind)
            .field("ty", &self.ty)
            .field("default", &self.default)
            .field("repeated", &self.repeated)
            .field("has_converter", &self.has_converter)
            .finish_non_exhaustive()
    }
}

/// `--some-name` for parameter `some_name`
pub fn derive_flag(name: &str) -> String {
    format!("--{}", name.replace('_', "-"))
}

/// Build one spec per parameter, in declaration order
///
/// `extra_key` names the parameter that receives unclaimed tokens when the
/// command captures them.
pub fn build_arguments(
    command: &str,
    params: &[Param],
    meta: &HashMap<String, Arg>,
    converters: &ConverterTable,
    extra_key: Option<&str>,
) -> RegistrationResult<Vec<ArgumentSpec>> {
    if let Some(unknown) = meta
        .keys()
        .find(|name| !params.iter().any(|p| &p.name == *name))
    {
        return Err(RegistrationError::UnknownArgument {
            command: command.to_string(),
            arg: unknown.clone(),
        });
    }

    let mut specs = Vec::with_capacity(params.len());
    let mut has_extra = false;
    for param in params {
        if extra_key == Some(param.name.as_str()) {
            if meta.contains_key(&param.name) {
                return Err(invalid(&param.name, "extra arguments can't have metadata"));
            }
            if param.ty != TypeTag::list(TypeTag::Str) {
                return Err(invalid(
                    &param.name,
                    format!("extra arguments must be list[str], not {}", param.ty),
                ));
            }
            specs.push(extra_spec(&param.name));
            has_extra = true;
            continue;
        }
        let arg = meta.get(&param.name).cloned().unwrap_or_default();
        let spec = build_argument(param, &arg, converters)?;
        tracing::trace!(command, ?spec, "built argument");
        specs.push(spec);
    }
    if let (Some(key), false) = (extra_key, has_extra) {
        specs.push(extra_spec(key));
    }

    check_positional_order(command, &specs)?;
    check_duplicate_flags(command, &specs)?;
    Ok(specs)
}

fn extra_spec(id: &str) -> ArgumentSpec {
    ArgumentSpec {
        id: id.to_string(),
        option: None,
        short: None,
        help: None,
        kind: ArgKind::Extra,
        ty: TypeTag::list(TypeTag::Str),
        default: DefaultValue::Value(Value::List(Vec::new())),
        converter: None,
        repeated: true,
        choices: None,
        has_converter: false,
    }
}

/// Build the argument spec for a single parameter
pub fn build_argument(
    param: &Param,
    arg: &Arg,
    converters: &ConverterTable,
) -> RegistrationResult<ArgumentSpec> {
    validate_flags(&param.name, arg)?;
    let spec = resolve_argument(param, arg, converters)?;
    if !spec.is_flagged() && spec.short.is_some() {
        return Err(invalid(&param.name, "a short flag needs an option as well"));
    }
    Ok(spec)
}

fn resolve_argument(
    param: &Param,
    arg: &Arg,
    converters: &ConverterTable,
) -> RegistrationResult<ArgumentSpec> {
    let mut spec = ArgumentSpec {
        id: param.name.clone(),
        option: arg.option.clone(),
        short: arg.short.clone(),
        help: arg.help.clone(),
        kind: if arg.option.is_some() {
            ArgKind::Option
        } else {
            ArgKind::Positional
        },
        ty: param.ty.clone(),
        default: param.default.clone(),
        converter: None,
        repeated: false,
        choices: None,
        has_converter: false,
    };

    if arg.count {
        spec.kind = ArgKind::Count;
        spec.option.get_or_insert_with(|| derive_flag(&param.name));
        if !matches!(spec.default, DefaultValue::Value(Value::Int(_))) {
            spec.default = DefaultValue::Value(Value::Int(0));
        }
        return Ok(spec);
    }

    // A local converter wins; a registered one for the exact type next
    let local = arg.converter.clone().or_else(|| converters.lookup(&param.ty).cloned());
    if let Some(conv) = local {
        let base = param.ty.strip_optional();
        spec.repeated = matches!(base, TypeTag::List(_)) && arg.converter.is_some();
        if param.ty.is_optional() && spec.default.is_required() {
            spec.default = DefaultValue::Value(Value::None);
        }
        spec.converter = Some(conv);
        spec.has_converter = true;
        return Ok(spec);
    }

    if *param.ty.strip_optional() == TypeTag::Bool {
        return build_switch(param, spec);
    }

    let Resolution {
        converter,
        repeated,
        optional,
        choices,
        from_table,
    } = converters
        .resolve(&param.ty)
        .map_err(|e| RegistrationError::UnsupportedType {
            arg: param.name.clone(),
            ty: e.0,
        })?;
    spec.converter = Some(converter);
    spec.repeated = repeated;
    spec.choices = choices;
    spec.has_converter = from_table;
    if optional && spec.default.is_required() {
        spec.default = DefaultValue::Value(Value::None);
    }
    Ok(spec)
}

fn build_switch(param: &Param, mut spec: ArgumentSpec) -> RegistrationResult<ArgumentSpec> {
    let negatable = match &spec.default {
        DefaultValue::Required | DefaultValue::Value(Value::None) => false,
        DefaultValue::Value(Value::Bool(b)) => *b,
        DefaultValue::Value(other) => {
            return Err(invalid(
                &param.name,
                format!("boolean flags need a bool default, not {}", other.kind()),
            ));
        }
    };
    spec.option.get_or_insert_with(|| derive_flag(&param.name));
    spec.kind = ArgKind::Switch { negatable };
    spec.default = DefaultValue::Value(Value::Bool(negatable));
    Ok(spec)
}

fn validate_flags(name: &str, arg: &Arg) -> RegistrationResult<()> {
    if let Some(option) = &arg.option {
        let long = option.strip_prefix("--").unwrap_or_default();
        if long.is_empty() || long.starts_with('-') {
            return Err(invalid(
                name,
                format!("option must look like '--name', got '{}'", option),
            ));
        }
    }
    if let Some(short) = &arg.short {
        if short_char(short).is_none() {
            return Err(invalid(
                name,
                format!("short flag must be '-' and one character, got '{}'", short),
            ));
        }
    }
    Ok(())
}

/// The character of a `-x` short flag
pub fn short_char(short: &str) -> Option<char> {
    let mut chars = short.strip_prefix('-')?.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '-' => Some(c),
        _ => None,
    }
}

fn check_positional_order(command: &str, specs: &[ArgumentSpec]) -> RegistrationResult<()> {
    let positionals: Vec<&ArgumentSpec> = specs
        .iter()
        .filter(|s| s.kind == ArgKind::Positional)
        .collect();
    let has_extra = specs.iter().any(|s| s.kind == ArgKind::Extra);
    for (i, spec) in positionals.iter().enumerate() {
        if spec.repeated && (i + 1 < positionals.len() || has_extra) {
            return Err(invalid(
                &spec.id,
                "only the last positional argument can be repeated",
            ));
        }
    }

    let mut seen_optional = false;
    for spec in positionals {
        if spec.default.is_required() && seen_optional {
            return Err(RegistrationError::PositionalOrder {
                command: command.to_string(),
                arg: spec.id.clone(),
            });
        }
        seen_optional |= !spec.default.is_required();
    }
    Ok(())
}

fn check_duplicate_flags(command: &str, specs: &[ArgumentSpec]) -> RegistrationResult<()> {
    let mut seen = HashSet::new();
    for spec in specs {
        let negation = match (&spec.kind, &spec.option) {
            (ArgKind::Switch { negatable: true }, Some(option)) => {
                Some(format!("--no-{}", &option[2..]))
            }
            _ => None,
        };
        let flags = spec
            .option
            .iter()
            .chain(spec.short.iter())
            .cloned()
            .chain(negation);
        for flag in flags {
            if !seen.insert(flag.clone()) {
                return Err(RegistrationError::DuplicateFlag {
                    command: command.to_string(),
                    flag,
                });
            }
        }
    }
    Ok(())
}

fn invalid(arg: &str, message: impl Into<String>) -> RegistrationError {
    RegistrationError::InvalidArgument {
        arg: arg.to_string(),
        message: message.into(),
    }
}
