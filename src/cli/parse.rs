//! Parsing through clap
//!
//! Every resolved command is translated into a `clap::Command` that only
//! knows raw strings. Once clap accepted the tokens, each argument's
//! converter turns its raw values into typed [`Value`]s.

use crate::cli::Settings;
use crate::command::{ArgKind, ArgumentSpec, CommandSpec, DefaultValue};
use crate::error::{CliError, ConversionError};
use crate::types::{Value, Values};
use clap::builder::{PossibleValue, StringValueParser, TypedValueParser};
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::collections::HashMap;
use std::ffi::OsStr;

/// The outcome of a successful parse
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    /// Top-level command name
    pub command: String,
    /// Selected subcommand, if any
    pub subcommand: Option<String>,
    pub values: Values,
}

/// Build the clap command for `spec`, with `subcommands` nested below it.
/// In partial mode nothing is required.
pub fn build_command(
    settings: &Settings,
    spec: &CommandSpec,
    subcommands: &[CommandSpec],
    partial: bool,
) -> Command {
    let mut cmd = Command::new(spec.name.clone())
        .bin_name(settings.bin_name(&spec.display_name()))
        .no_binary_name(true)
        .disable_help_subcommand(true);

    if let Some(description) = &spec.description {
        cmd = cmd.about(crate::utils::collapse_whitespace(description));
    }

    if uses_flag(spec, "--help", "-h") {
        cmd = cmd.disable_help_flag(true);
    }

    match &settings.version {
        Some(version) if !uses_flag(spec, "--version", "-V") => {
            cmd = cmd.version(version.clone());
        }
        _ => cmd = cmd.disable_version_flag(true),
    }

    for arg in &spec.args {
        cmd = cmd.args(clap_args(arg, partial));
    }

    // A parent's own required arguments don't apply to its subcommands
    if !subcommands.is_empty() {
        cmd = cmd.subcommand_negates_reqs(true);
    }
    for sub in subcommands {
        let sub_cmd = build_command(settings, sub, &[], partial);
        cmd = cmd.subcommand(sub_cmd);
    }

    cmd
}

/// The command claims clap's built-in flag or its id for itself
fn uses_flag(spec: &CommandSpec, long: &str, short: &str) -> bool {
    let id = long.trim_start_matches('-');
    spec.args.iter().any(|a| {
        a.id == id || a.option.as_deref() == Some(long) || a.short.as_deref() == Some(short)
    })
}

/// Id of the `--no-<flag>` half of a negatable switch
pub fn negated_id(id: &str) -> String {
    format!("no-{}", id)
}

fn clap_args(spec: &ArgumentSpec, partial: bool) -> Vec<Arg> {
    let required = spec.default.is_required() && !partial;
    let mut arg = Arg::new(spec.id.clone()).help(spec.full_help());
    let long = spec
        .option
        .as_deref()
        .and_then(|o| o.strip_prefix("--"))
        .map(str::to_string);
    if let Some(long) = &long {
        arg = arg.long(long.clone());
    }
    if let Some(c) = spec.short.as_deref().and_then(crate::command::short_char) {
        arg = arg.short(c);
    }

    match spec.kind {
        ArgKind::Positional | ArgKind::Option => {
            arg = arg.value_name(spec.id.to_uppercase()).required(required);
            if let Some(choices) = &spec.choices {
                arg = arg.value_parser(Choices(choices.clone()));
            }
            if spec.repeated {
                arg = arg.action(ArgAction::Append);
                if spec.kind == ArgKind::Positional {
                    arg = arg.num_args(1..);
                }
            } else {
                arg = arg.action(ArgAction::Set);
            }
            vec![arg]
        }
        ArgKind::Count => vec![arg.action(ArgAction::Count)],
        ArgKind::Switch { negatable: false } => vec![arg.action(ArgAction::SetTrue)],
        ArgKind::Switch { negatable: true } => {
            let negated = negated_id(&spec.id);
            let mut off = Arg::new(negated.clone())
                .action(ArgAction::SetTrue)
                .overrides_with(spec.id.clone());
            if let Some(long) = &long {
                off = off.long(format!("no-{}", long));
            }
            vec![
                arg.action(ArgAction::SetTrue).overrides_with(negated),
                off,
            ]
        }
        // Split off before clap sees the tokens
        ArgKind::Extra => Vec::new(),
    }
}

/// Lists the allowed values for help and completions. Any string passes;
/// the converter reports invalid choices.
#[derive(Clone)]
struct Choices(Vec<String>);

impl TypedValueParser for Choices {
    type Value = String;

    fn parse_ref(
        &self,
        cmd: &Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<String, clap::Error> {
        StringValueParser::new().parse_ref(cmd, arg, value)
    }

    fn possible_values(&self) -> Option<Box<dyn Iterator<Item = PossibleValue> + '_>> {
        Some(Box::new(self.0.iter().map(|c| PossibleValue::new(c.clone()))))
    }
}

/// How a token relates to the flags a command knows
enum Token {
    Flag { needs_value: bool },
    Unknown,
    Plain,
}

/// Every flag clap will accept for `spec`, and whether it takes a value
fn known_flags(settings: &Settings, spec: &CommandSpec) -> HashMap<String, bool> {
    let mut flags = HashMap::new();
    for arg in &spec.args {
        let takes_value = arg.kind == ArgKind::Option;
        if let Some(option) = &arg.option {
            if matches!(arg.kind, ArgKind::Switch { negatable: true }) {
                flags.insert(format!("--no-{}", &option[2..]), false);
            }
            flags.insert(option.clone(), takes_value);
        }
        if let Some(short) = &arg.short {
            flags.insert(short.clone(), takes_value);
        }
    }
    if !uses_flag(spec, "--help", "-h") {
        flags.insert("--help".to_string(), false);
        flags.insert("-h".to_string(), false);
    }
    if settings.version.is_some() && !uses_flag(spec, "--version", "-V") {
        flags.insert("--version".to_string(), false);
        flags.insert("-V".to_string(), false);
    }
    flags
}

fn classify(flags: &HashMap<String, bool>, token: &str) -> Token {
    if let Some(long) = token.strip_prefix("--").filter(|l| !l.is_empty()) {
        let (name, inline) = match long.split_once('=') {
            Some((name, _)) => (name, true),
            None => (long, false),
        };
        return match flags.get(&format!("--{}", name)) {
            Some(takes_value) => Token::Flag {
                needs_value: *takes_value && !inline,
            },
            None => Token::Unknown,
        };
    }
    let cluster = match token.strip_prefix('-') {
        Some(rest) if rest.starts_with(|c: char| !c.is_ascii_digit()) => rest,
        _ => return Token::Plain,
    };
    // `-vv`, `-ab`, or `-n3` with the value attached
    for (i, c) in cluster.char_indices() {
        match flags.get(&format!("-{}", c)) {
            Some(false) => {}
            Some(true) => {
                return Token::Flag {
                    needs_value: i + c.len_utf8() == cluster.len(),
                }
            }
            None => return Token::Unknown,
        }
    }
    Token::Flag { needs_value: false }
}

/// Split `args` into the tokens `spec` claims and the extra ones, both in
/// their original order
fn split_extra(
    settings: &Settings,
    spec: &CommandSpec,
    args: &[String],
) -> (Vec<String>, Vec<String>) {
    let flags = known_flags(settings, spec);
    let mut slots = spec
        .args
        .iter()
        .filter(|a| a.kind == ArgKind::Positional)
        .map(|a| if a.repeated { usize::MAX } else { 1 })
        .fold(0usize, usize::saturating_add);
    let mut claimed = Vec::new();
    let mut extra = Vec::new();
    let mut after_separator = false;
    let mut tokens = args.iter();

    while let Some(token) = tokens.next() {
        if after_separator {
            if slots > 0 {
                slots -= 1;
                claimed.push(token.clone());
            } else {
                extra.push(token.clone());
            }
            continue;
        }
        if token == "--" {
            after_separator = true;
            claimed.push(token.clone());
            continue;
        }
        match classify(&flags, token) {
            Token::Flag { needs_value } => {
                claimed.push(token.clone());
                if needs_value {
                    claimed.extend(tokens.next().cloned());
                }
            }
            Token::Unknown => extra.push(token.clone()),
            Token::Plain if slots > 0 => {
                slots -= 1;
                claimed.push(token.clone());
            }
            Token::Plain => extra.push(token.clone()),
        }
    }
    tracing::trace!(command = %spec.display_name(), ?extra, "split extra tokens");
    (claimed, extra)
}

/// The tokens for clap, and the extra ones for whichever command captures them
fn split_tokens(
    settings: &Settings,
    spec: &CommandSpec,
    subcommands: &[CommandSpec],
    args: &[String],
) -> (Vec<String>, Vec<String>) {
    if let Some((first, rest)) = args.split_first() {
        if let Some(sub) = subcommands.iter().find(|s| &s.name == first) {
            if !sub.allow_extra {
                return (args.to_vec(), Vec::new());
            }
            let (claimed, extra) = split_extra(settings, sub, rest);
            let tokens = std::iter::once(first.clone()).chain(claimed).collect();
            return (tokens, extra);
        }
    }
    if spec.allow_extra {
        split_extra(settings, spec, args)
    } else {
        (args.to_vec(), Vec::new())
    }
}

/// Parse `args` for `spec` and convert every value
pub fn parse_args(
    settings: &Settings,
    spec: &CommandSpec,
    subcommands: &[CommandSpec],
    args: &[String],
    partial: bool,
) -> Result<Parsed, CliError> {
    let (tokens, extra) = split_tokens(settings, spec, subcommands, args);
    let mut cmd = build_command(settings, spec, subcommands, partial);
    let matches = cmd.try_get_matches_from_mut(tokens)?;

    if let Some((name, sub_matches)) = matches.subcommand() {
        let sub = subcommands
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| CliError::CommandNotFound {
                name: name.to_string(),
                available: subcommands.iter().map(|s| s.name.clone()).collect(),
            })?;
        let usage = cmd
            .find_subcommand_mut(name)
            .map(|c| c.render_usage().to_string())
            .unwrap_or_default();
        tracing::debug!(command = %sub.display_name(), "parsed subcommand");
        return Ok(Parsed {
            command: spec.name.clone(),
            subcommand: Some(name.to_string()),
            values: collect_values(sub, sub_matches, &extra, &usage, partial)?,
        });
    }

    let usage = cmd.render_usage().to_string();
    tracing::debug!(command = %spec.display_name(), "parsed command");
    Ok(Parsed {
        command: spec.name.clone(),
        subcommand: None,
        values: collect_values(spec, &matches, &extra, &usage, partial)?,
    })
}

/// Convert the raw matches of one command into values
pub fn collect_values(
    spec: &CommandSpec,
    matches: &ArgMatches,
    extra: &[String],
    usage: &str,
    partial: bool,
) -> Result<Values, ConversionError> {
    let mut values = Values::new();
    for arg in &spec.args {
        let default = arg.default.value().cloned();
        let value = match arg.kind {
            ArgKind::Switch { negatable } => {
                if negatable && matches.get_flag(&negated_id(&arg.id)) {
                    Some(Value::Bool(false))
                } else if matches.get_flag(&arg.id) {
                    Some(Value::Bool(true))
                } else {
                    default
                }
            }
            ArgKind::Count => {
                let base = match &arg.default {
                    DefaultValue::Value(Value::Int(i)) => *i,
                    _ => 0,
                };
                Some(Value::Int(base + i64::from(matches.get_count(&arg.id))))
            }
            ArgKind::Extra => Some(Value::List(
                extra.iter().map(|s| Value::Str(s.clone())).collect(),
            )),
            ArgKind::Positional | ArgKind::Option => {
                if arg.repeated {
                    match matches.get_many::<String>(&arg.id) {
                        Some(raw) => Some(Value::List(
                            raw.map(|s| convert(arg, s, usage))
                                .collect::<Result<Vec<_>, _>>()?,
                        )),
                        None => default,
                    }
                } else {
                    match matches.get_one::<String>(&arg.id) {
                        Some(raw) => Some(convert(arg, raw, usage)?),
                        None => default,
                    }
                }
            }
        };
        match value {
            Some(value) => values.insert(arg.id.clone(), value),
            None if partial => {}
            None => tracing::warn!(arg = %arg.id, "no value for required argument"),
        }
    }
    Ok(values)
}

fn convert(arg: &ArgumentSpec, raw: &str, usage: &str) -> Result<Value, ConversionError> {
    let converter = match &arg.converter {
        Some(converter) => converter,
        None => return Ok(Value::Str(raw.to_string())),
    };
    converter(raw).map_err(|e| ConversionError {
        arg: arg.display_name().to_string(),
        value: raw.to_string(),
        message: format!("{:#}", e),
        usage: usage.to_string(),
    })
}
