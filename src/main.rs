use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use radicli::cli::report_error;
use radicli::{CliError, DocOptions, StaticCli, StaticData};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

fn build_command() -> Command {
    let file = || {
        Arg::new("file")
            .value_name("FILE")
            .help("Path to a static export (.json, .yml or .yaml)")
            .value_parser(value_parser!(PathBuf))
            .required(true)
    };

    Command::new("radicli")
        .version(radicli::VERSION)
        .about("Run, document and complete CLIs from their static export")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print debug logs")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(
            Command::new("run")
                .about("Check arguments against a static export")
                .arg(file())
                .arg(
                    Arg::new("debug")
                        .long("debug")
                        .help("Wrap the output in start and end markers")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("args")
                        .value_name("ARGS")
                        .help("Arguments for the exported CLI")
                        .num_args(0..)
                        .trailing_var_arg(true)
                        .allow_hyphen_values(true),
                ),
        )
        .subcommand(
            Command::new("doc")
                .about("Write Markdown documentation for a static export")
                .arg(file())
                .arg(Arg::new("title").long("title").value_name("TITLE").help("Document title"))
                .arg(
                    Arg::new("description")
                        .long("description")
                        .value_name("TEXT")
                        .help("Text below the title"),
                )
                .arg(
                    Arg::new("path_root")
                        .long("path-root")
                        .value_name("DIR")
                        .help("Show path defaults relative to this directory")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Print a shell completion script for a static export")
                .arg(file())
                .arg(
                    Arg::new("shell")
                        .value_name("SHELL")
                        .required(true)
                        .value_parser(value_parser!(Shell)),
                ),
        )
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "radicli=debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn file_arg(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<PathBuf>("file")
        .cloned()
        .unwrap_or_default()
}

fn run(matches: &ArgMatches) -> Result<i32, CliError> {
    match matches.subcommand() {
        Some(("run", sub)) => {
            let cli = StaticCli::load(file_arg(sub))?.with_debug(sub.get_flag("debug"));
            let args: Vec<String> = sub
                .get_many::<String>("args")
                .map(|values| values.cloned().collect())
                .unwrap_or_default();
            Ok(cli.run_from(args))
        }
        Some(("doc", sub)) => {
            let cli = StaticData::read(file_arg(sub))?.into_cli();
            let mut options = DocOptions::default();
            if let Some(title) = sub.get_one::<String>("title") {
                options = options.with_title(title.clone());
            }
            if let Some(description) = sub.get_one::<String>("description") {
                options = options.with_description(description.clone());
            }
            if let Some(root) = sub.get_one::<PathBuf>("path_root") {
                options = options.with_path_root(root.clone());
            }
            println!("{}", cli.document(&options));
            Ok(0)
        }
        Some(("completions", sub)) => {
            let cli = StaticData::read(file_arg(sub))?.into_cli();
            let shell = sub.get_one::<Shell>("shell").copied().unwrap_or(Shell::Bash);
            cli.completions(shell, &mut io::stdout());
            Ok(0)
        }
        _ => Ok(0),
    }
}

fn main() {
    let matches = build_command().get_matches();
    init_logging(matches.get_flag("verbose"));

    let code = match run(&matches) {
        Ok(code) => code,
        Err(e) => {
            report_error(&e);
            e.exit_code()
        }
    };
    process::exit(code);
}
