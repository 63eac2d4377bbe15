//! Markdown documentation for a CLI

use crate::cli::Cli;
use crate::command::{ArgKind, ArgumentSpec, CommandSpec, DefaultValue};
use crate::types::Value;
use crate::utils::collapse_whitespace;
use std::path::PathBuf;

/// Comment placed at the top of generated docs
pub const DEFAULT_DOCS_COMMENT: &str = "This file is auto-generated";

const TABLE_HEADER: [&str; 4] = ["Argument", "Type", "Description", "Default"];

/// What to put around the generated command sections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocOptions {
    pub title: Option<String>,
    pub description: Option<String>,
    /// HTML comment on the first line, left out when `None`
    pub comment: Option<String>,
    /// Path defaults are shown relative to this directory
    pub path_root: Option<PathBuf>,
}

impl Default for DocOptions {
    fn default() -> Self {
        DocOptions {
            title: None,
            description: None,
            comment: Some(DEFAULT_DOCS_COMMENT.to_string()),
            path_root: None,
        }
    }
}

impl DocOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_comment(mut self, comment: Option<String>) -> Self {
        self.comment = comment;
        self
    }

    pub fn with_path_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.path_root = Some(root.into());
        self
    }
}

impl Cli {
    /// Render every command and subcommand as Markdown
    pub fn document(&self, options: &DocOptions) -> String {
        let settings = self.settings();
        let registry = self.registry();
        let start = if options.title.is_some() { 2 } else { 1 };
        let prefix = settings
            .prog
            .as_ref()
            .map(|p| format!("{} ", p))
            .unwrap_or_default();

        let mut blocks = Vec::new();
        if let Some(comment) = &options.comment {
            blocks.push(format!("<!-- {} -->", comment));
        }
        if let Some(title) = &options.title {
            blocks.push(format!("# {}", title));
        }
        if let Some(description) = &options.description {
            blocks.push(collapse_whitespace(description));
        }
        let cli_title = match &settings.prog {
            Some(prog) => format!("`{}`", prog),
            None => "CLI".to_string(),
        };
        blocks.push(format!("{} {}", heading(start), cli_title));
        if !settings.help.is_empty() {
            blocks.push(settings.help.clone());
        }

        for cmd in registry.commands() {
            blocks.extend(command_blocks(cmd, start + 1, &prefix, options));
            for sub in registry.subcommands(&cmd.name) {
                blocks.extend(command_blocks(sub, start + 2, &prefix, options));
            }
        }
        for parent in registry.parents() {
            if registry.command(parent).is_some() {
                continue;
            }
            blocks.push(format!("{} `{}{}`", heading(start + 1), prefix, parent));
            for sub in registry.subcommands(parent) {
                blocks.extend(command_blocks(sub, start + 2, &prefix, options));
            }
        }
        blocks.join("\n\n")
    }
}

fn heading(level: usize) -> String {
    "#".repeat(level)
}

fn command_blocks(
    cmd: &CommandSpec,
    level: usize,
    prefix: &str,
    options: &DocOptions,
) -> Vec<String> {
    let mut blocks = vec![format!("{} `{}{}`", heading(level), prefix, cmd.display_name())];
    if let Some(description) = &cmd.description {
        blocks.push(collapse_whitespace(description));
    }
    let rows: Vec<[String; 4]> = cmd
        .args
        .iter()
        .filter(|a| a.kind != ArgKind::Extra)
        .map(|a| arg_row(a, options))
        .collect();
    if !rows.is_empty() {
        let mut lines = vec![
            format!("| {} |", TABLE_HEADER.join(" | ")),
            format!("| {} |", ["---"; 4].join(" | ")),
        ];
        lines.extend(rows.iter().map(|row| format!("| {} |", row.join(" | "))));
        blocks.push(lines.join("\n"));
    }
    blocks
}

fn arg_row(arg: &ArgumentSpec, options: &DocOptions) -> [String; 4] {
    let mut name = format!("`{}`", arg.display_name());
    if let (ArgKind::Switch { negatable: true }, Some(option)) = (arg.kind, &arg.option) {
        name.push_str(&format!("/`--no-{}`", option.trim_start_matches('-')));
    }
    if let Some(short) = &arg.short {
        name.push_str(&format!(", `{}`", short));
    }
    let default = match &arg.default {
        DefaultValue::Required => String::new(),
        DefaultValue::Value(value) => format!("`{}`", doc_default(value, options)),
    };
    [
        name,
        format!("`{}`", arg.ty),
        arg.help.clone().unwrap_or_default(),
        default,
    ]
}

fn doc_default(value: &Value, options: &DocOptions) -> String {
    match (value, &options.path_root) {
        (Value::Path(path), Some(root)) => path
            .strip_prefix(root)
            .unwrap_or(path)
            .display()
            .to_string(),
        (Value::Path(path), None) => path.display().to_string(),
        (other, _) => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Settings;
    use crate::command::{Arg, CommandDef, Param};
    use crate::types::TypeTag;

    #[test]
    fn test_document_without_title() {
        let mut cli = Cli::default();
        cli.register(CommandDef::new("hello").description("Say\n   hello")).unwrap();
        let docs = cli.document(&DocOptions::default().with_comment(None));
        assert_eq!(docs, "# CLI\n\n## `hello`\n\nSay hello");
    }

    #[test]
    fn test_path_default_relative_to_root() {
        let mut cli = Cli::new(Settings::new().with_prog("rdc"));
        cli.register(
            CommandDef::new("build")
                .param(Param::new("out", TypeTag::Path).default(PathBuf::from("/srv/app/dist")))
                .arg("out", Arg::option("--out")),
        )
        .unwrap();
        let docs = cli.document(&DocOptions::default().with_path_root("/srv/app"));
        assert!(docs.contains("| `--out` | `path` |  | `dist` |"));
    }
}
