//! Main CLI application

use crate::cli::parse::{build_command, parse_args, Parsed};
use crate::cli::{ErrorHandlers, Settings};
use crate::command::{CommandDef, CommandSpec, Registry};
use crate::error::{CliError, RegistrationResult, Result};
use crate::types::{converter, ConverterTable, Origin, TypeTag, Value};
use crate::utils::{format_arg_help, format_table, join_strings};
use clap::error::ErrorKind;
use colored::Colorize;
use std::error::Error as StdError;
use std::process;

/// Width of the description column in the commands overview
const OVERVIEW_HELP_WIDTH: usize = 70;

/// How a run ended, when it didn't fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The command ran, or there was nothing left to do
    Completed,
    /// Help or version text to show the user
    Printed(String),
    /// An error handler asked for this exit code
    ExitCode(i32),
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::ExitCode(code) => *code,
            _ => 0,
        }
    }
}

/// CLI application
pub struct Cli {
    settings: Settings,
    converters: ConverterTable,
    registry: Registry,
    errors: ErrorHandlers,
}

impl Cli {
    pub fn new(settings: Settings) -> Self {
        Cli {
            settings,
            converters: ConverterTable::default(),
            registry: Registry::new(),
            errors: ErrorHandlers::new(),
        }
    }

    /// A CLI over an already resolved registry
    pub(crate) fn from_registry(settings: Settings, registry: Registry) -> Self {
        Cli {
            registry,
            ..Cli::new(settings)
        }
    }

    /// Use `f` for every argument declared with exactly `ty`. Only affects
    /// commands registered afterwards.
    pub fn with_converter<F>(mut self, ty: TypeTag, f: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<Value> + 'static,
    {
        self.converters.insert(ty, converter(f));
        self
    }

    /// Use `f` for every argument whose type has the given origin
    pub fn with_origin_converter<F>(mut self, origin: Origin, f: F) -> Self
    where
        F: Fn(&str) -> anyhow::Result<Value> + 'static,
    {
        self.converters.insert_origin(origin, converter(f));
        self
    }

    /// Handle errors of type `E` raised by commands. A returned code ends the
    /// program with that code, `None` ends it normally.
    pub fn with_error_handler<E, F>(mut self, handler: F) -> Self
    where
        E: StdError + 'static,
        F: Fn(&E) -> Option<i32> + 'static,
    {
        self.errors.register(handler);
        self
    }

    /// Register a command or subcommand
    pub fn register(&mut self, def: CommandDef) -> RegistrationResult<()> {
        let spec = def.build(&self.converters, &self.settings.extra_key)?;
        self.registry.insert(spec);
        Ok(())
    }

    /// Register a parent that only groups subcommands
    pub fn placeholder(&mut self, name: &str, description: Option<&str>) {
        self.registry
            .insert_placeholder(name, description.map(str::to_string));
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Parse `args` (command name first) without running anything
    pub fn parse<I, S>(&self, args: I) -> Result<Parsed>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse_tokens(&collect_tokens(args), false)
    }

    /// Like [`Cli::parse`], but missing required arguments are left out
    /// instead of failing
    pub fn parse_partial<I, S>(&self, args: I) -> Result<Parsed>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse_tokens(&collect_tokens(args), true)
    }

    fn parse_tokens(&self, args: &[String], partial: bool) -> Result<Parsed> {
        let selection = self.registry.select(args)?;
        parse_args(
            &self.settings,
            &selection.command,
            selection.subcommands,
            selection.args,
            partial,
        )
    }

    /// Parse `args` and run the selected command
    pub fn try_run_from<I, S>(&self, args: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = collect_tokens(args);
        match args.first().map(String::as_str) {
            None | Some("--help") | Some("-h") => return Ok(Outcome::Printed(self.format_info())),
            Some("--version") => {
                if let Some(version) = &self.settings.version {
                    return Ok(Outcome::Printed(version.clone()));
                }
            }
            _ => {}
        }

        let selection = self.registry.select(&args)?;
        let parsed = match parse_args(
            &self.settings,
            &selection.command,
            selection.subcommands,
            selection.args,
            false,
        ) {
            Ok(parsed) => parsed,
            Err(err) => return help_or_error(err),
        };

        let target = match &parsed.subcommand {
            Some(sub) => selection
                .subcommands
                .iter()
                .find(|s| &s.name == sub)
                .ok_or_else(|| CliError::CommandNotFound {
                    name: sub.clone(),
                    available: selection.subcommands.iter().map(|s| s.name.clone()).collect(),
                })?,
            None => &*selection.command,
        };

        if target.is_placeholder {
            let mut cmd = build_command(&self.settings, target, selection.subcommands, false);
            return Ok(Outcome::Printed(cmd.render_help().to_string()));
        }
        self.invoke(target, parsed)
    }

    /// Parse `args` for `def` alone and run it. The command doesn't have to be
    /// registered; converters and settings of this CLI still apply.
    pub fn call<I, S>(&self, def: CommandDef, args: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = def.build(&self.converters, &self.settings.extra_key)?;
        match parse_args(&self.settings, &spec, &[], &collect_tokens(args), false) {
            Ok(parsed) => self.invoke(&spec, parsed),
            Err(err) => help_or_error(err),
        }
    }

    fn invoke(&self, spec: &CommandSpec, parsed: Parsed) -> Result<Outcome> {
        let func = match &spec.func {
            Some(func) => func,
            None => {
                tracing::debug!(command = %spec.display_name(), "no function bound, handing over");
                return Ok(Outcome::Completed);
            }
        };
        tracing::debug!(command = %spec.display_name(), "running command");
        match func(&parsed.values) {
            Ok(()) => Ok(Outcome::Completed),
            Err(err) => match self.errors.handle(&err) {
                Some(Some(code)) => Ok(Outcome::ExitCode(code)),
                Some(None) => Ok(Outcome::Completed),
                None => Err(CliError::Application(err)),
            },
        }
    }

    /// Run with `args` and report the result. Returns the exit code.
    pub fn run_from<I, S>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        finish(self.try_run_from(args))
    }

    /// Run with the process arguments and exit
    pub fn run(&self) -> ! {
        let args = std::env::args_os()
            .skip(1)
            .map(|arg| arg.to_string_lossy().into_owned());
        process::exit(self.run_from(args))
    }

    /// The help text followed by the overview of all commands
    pub fn format_info(&self) -> String {
        let registry = &self.registry;
        let subcommand_list = |parent: &str| {
            let names: Vec<&str> = registry
                .subcommands(parent)
                .iter()
                .map(|s| s.name.as_str())
                .collect();
            format!("Subcommands: {}", names.join(", "))
        };

        let mut rows = Vec::new();
        for cmd in registry.commands() {
            rows.push((
                format!("  {}", cmd.name),
                format_arg_help(cmd.description.as_deref(), OVERVIEW_HELP_WIDTH),
            ));
            if registry.has_subcommands(&cmd.name) {
                rows.push((String::new(), subcommand_list(&cmd.name)));
            }
        }
        for parent in registry.parents() {
            if registry.command(parent).is_none() {
                rows.push((format!("  {}", parent), subcommand_list(parent)));
            }
        }
        let table = format_table(&rows);
        join_strings(
            [
                Some(self.settings.help.as_str()),
                Some("\nAvailable commands:"),
                Some(table.as_str()),
            ],
            "\n",
        )
    }
}

impl Default for Cli {
    fn default() -> Self {
        Cli::new(Settings::default())
    }
}

/// Help and version requests are output, not failures
fn help_or_error(err: CliError) -> Result<Outcome> {
    match err {
        CliError::Usage(err)
            if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            Ok(Outcome::Printed(err.render().to_string()))
        }
        err => Err(err),
    }
}

fn collect_tokens<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    args.into_iter().map(Into::into).collect()
}

/// Print whatever a run produced and turn it into an exit code
pub(crate) fn finish(result: Result<Outcome>) -> i32 {
    match result {
        Ok(Outcome::Printed(text)) => {
            println!("{}", text.trim_end());
            0
        }
        Ok(outcome) => outcome.exit_code(),
        Err(err) => {
            report_error(&err);
            err.exit_code()
        }
    }
}

/// Print an error to stderr
pub fn report_error(err: &CliError) {
    let prefix = "error:".red().bold();
    match err {
        CliError::Usage(err) => eprint!("{}", err.render()),
        CliError::Conversion(err) => eprintln!("{}\n{} {}", err.usage.trim_end(), prefix, err),
        CliError::Application(err) => eprintln!("{} {:?}", prefix, err),
        other => eprintln!("{} {}", prefix, other),
    }
}
