//! Shell completion generation

use crate::cli::parse::build_command;
use crate::cli::Cli;
use clap::Command;
use clap_complete::{generate, Shell};
use std::io::Write;

/// Fallback program name when none is configured
const DEFAULT_PROG: &str = "cli";

impl Cli {
    /// One clap tree holding every command of the registry
    pub fn build_app(&self) -> Command {
        let settings = self.settings();
        let registry = self.registry();
        let prog = settings.prog.clone().unwrap_or_else(|| DEFAULT_PROG.to_string());
        let mut app = Command::new(prog)
            .no_binary_name(true)
            .disable_help_subcommand(true);
        if !settings.help.is_empty() {
            app = app.about(settings.help.clone());
        }
        match &settings.version {
            Some(version) => app = app.version(version.clone()),
            None => app = app.disable_version_flag(true),
        }

        for name in registry.names() {
            if let Some(spec) = registry.top_level(&name) {
                app = app.subcommand(build_command(
                    settings,
                    &spec,
                    registry.subcommands(&name),
                    true,
                ));
            }
        }
        app
    }

    /// Write a completion script for `shell`
    pub fn completions(&self, shell: Shell, out: &mut dyn Write) {
        let mut app = self.build_app();
        let name = app.get_name().to_string();
        tracing::debug!(%shell, prog = %name, "generating completions");
        generate(shell, &mut app, name, out);
    }
}

#[cfg(test)]
mod tests {
    use crate::cli::{Cli, Settings};
    use crate::command::{Arg, CommandDef, Param};
    use crate::types::TypeTag;
    use clap_complete::Shell;

    #[test]
    fn test_bash_completions_name_commands_and_flags() {
        let mut cli = Cli::new(Settings::new().with_prog("rdc"));
        cli.register(
            CommandDef::new("hello")
                .param(Param::new("name", TypeTag::Str))
                .param(Param::new("age", TypeTag::Int).default(0))
                .arg("age", Arg::option("--age")),
        )
        .unwrap();
        cli.register(CommandDef::new("child").parent("parent")).unwrap();

        let mut out = Vec::new();
        cli.completions(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("rdc"));
        assert!(script.contains("hello"));
        assert!(script.contains("--age"));
        assert!(script.contains("child"));
    }

    #[test]
    fn test_completions_offer_choices() {
        let mut cli = Cli::new(Settings::new().with_prog("rdc"));
        cli.register(
            CommandDef::new("pick")
                .param(Param::new("size", TypeTag::literal(["small", "large"])))
                .arg("size", Arg::option("--size")),
        )
        .unwrap();

        let mut out = Vec::new();
        cli.completions(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("compgen -W \"small large\""));
    }
}
