//! Integration tests for registering and running commands

mod common;

use common::{recording, single_call};
use radicli::error::RegistrationError;
use radicli::types::{converter, list_converter};
use radicli::{Arg, Cli, CliError, CommandDef, Origin, Outcome, Param, Settings, TypeTag, Value};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("custom failure")]
struct CustomError;

fn hello() -> CommandDef {
    CommandDef::new("hello")
        .description("Say hello")
        .param(Param::new("name", TypeTag::Str))
        .param(Param::new("age", TypeTag::Int).default(0))
        .param(Param::new("greet", TypeTag::Bool).default(false))
        .arg("name", Arg::new().help("Your name"))
        .arg("age", Arg::option("--age").short("-a").help("Your age"))
        .arg("greet", Arg::option("--greet").short("-g"))
}

#[test]
fn test_single_command_without_name() {
    let (def, calls) = recording(hello());
    let mut cli = Cli::default();
    cli.register(def).unwrap();

    let outcome = cli.try_run_from(["Alex", "--age", "35", "--greet"]).unwrap();
    assert_eq!(outcome, Outcome::Completed);

    let values = single_call(&calls);
    assert_eq!(values.get::<String>("name").unwrap(), "Alex");
    assert_eq!(values.get::<i64>("age").unwrap(), 35);
    assert!(values.get::<bool>("greet").unwrap());
}

#[test]
fn test_single_command_with_name() {
    let (def, calls) = recording(hello());
    let mut cli = Cli::default();
    cli.register(def).unwrap();

    cli.try_run_from(["hello", "Alex", "-a", "3"]).unwrap();
    let values = single_call(&calls);
    assert_eq!(values.get::<i64>("age").unwrap(), 3);
    assert!(!values.get::<bool>("greet").unwrap());
}

#[test]
fn test_repeated_list_option() {
    let (def, calls) = recording(
        CommandDef::new("hello")
            .param(Param::new("fruits", TypeTag::list(TypeTag::Str)))
            .arg("fruits", Arg::option("--fruits")),
    );
    let mut cli = Cli::default();
    cli.register(def).unwrap();

    cli.try_run_from(["--fruits", "apple", "--fruits", "banana"]).unwrap();
    assert_eq!(
        single_call(&calls).get::<Vec<String>>("fruits").unwrap(),
        vec!["apple", "banana"]
    );
}

#[test]
fn test_error_handler_sets_exit_code() {
    let mut cli = Cli::default().with_error_handler(|_: &CustomError| Some(16));
    cli.register(CommandDef::new("fail").func(|_| Err(CustomError.into())))
        .unwrap();

    assert_eq!(cli.try_run_from(["fail"]).unwrap(), Outcome::ExitCode(16));
    assert_eq!(cli.run_from(["fail"]), 16);
}

#[test]
fn test_error_handler_without_code_completes() {
    let mut cli = Cli::default().with_error_handler(|_: &CustomError| None);
    cli.register(CommandDef::new("fail").func(|_| Err(CustomError.into())))
        .unwrap();
    assert_eq!(cli.try_run_from(["fail"]).unwrap(), Outcome::Completed);
}

#[test]
fn test_unhandled_error_is_application_error() {
    let mut cli = Cli::default();
    cli.register(CommandDef::new("fail").func(|_| Err(CustomError.into())))
        .unwrap();

    match cli.try_run_from(["fail"]) {
        Err(CliError::Application(err)) => assert!(err.is::<CustomError>()),
        other => panic!("expected application error, got {:?}", other),
    }
    assert_eq!(cli.run_from(["fail"]), 1);
}

#[test]
fn test_unknown_command() {
    let mut cli = Cli::default();
    cli.register(hello()).unwrap();
    cli.register(CommandDef::new("world")).unwrap();

    let err = cli.try_run_from(["nope"]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Can't find command 'nope'. Available: hello, world"
    );
    assert_eq!(cli.run_from(["nope"]), 1);
}

#[test]
fn test_subcommands() {
    let (parent, parent_calls) = recording(
        CommandDef::new("parent").param(Param::new("a", TypeTag::Str)),
    );
    let (child, child_calls) = recording(
        CommandDef::new("child")
            .parent("parent")
            .param(Param::new("b", TypeTag::Int))
            .arg("b", Arg::option("--b")),
    );
    let mut cli = Cli::default();
    cli.register(parent).unwrap();
    cli.register(child).unwrap();

    cli.try_run_from(["parent", "child", "--b", "4"]).unwrap();
    assert_eq!(single_call(&child_calls).get::<i64>("b").unwrap(), 4);
    assert!(parent_calls.borrow().is_empty());

    cli.try_run_from(["parent", "x"]).unwrap();
    assert_eq!(single_call(&parent_calls).get::<String>("a").unwrap(), "x");
}

#[test]
fn test_subcommand_without_parent_entry() {
    let (child, calls) = recording(CommandDef::new("child").parent("group"));
    let mut cli = Cli::default();
    cli.register(child).unwrap();

    cli.try_run_from(["group", "child"]).unwrap();
    assert_eq!(calls.borrow().len(), 1);

    match cli.try_run_from(["group"]).unwrap() {
        Outcome::Printed(help) => assert!(help.contains("child")),
        other => panic!("expected parent help, got {:?}", other),
    }
}

#[test]
fn test_explicit_placeholder() {
    let mut cli = Cli::new(Settings::new().with_prog("rdc"));
    cli.placeholder("group", Some("Grouped commands"));
    cli.register(CommandDef::new("child").parent("group")).unwrap();

    assert!(cli.format_info().contains("  group   Grouped commands."));
    match cli.try_run_from(["group"]).unwrap() {
        Outcome::Printed(help) => assert!(help.contains("Grouped commands")),
        other => panic!("expected parent help, got {:?}", other),
    }
}

#[test]
fn test_literal_and_enum() {
    let (def, calls) = recording(
        CommandDef::new("pick")
            .param(Param::new("size", TypeTag::literal(["small", "large"])))
            .param(Param::new(
                "color",
                TypeTag::enumeration("Color", ["red", "green"]),
            ))
            .arg("color", Arg::option("--color")),
    );
    let mut cli = Cli::default();
    cli.register(def).unwrap();

    cli.try_run_from(["large", "--color", "green"]).unwrap();
    let values = single_call(&calls);
    assert_eq!(values.get::<String>("size").unwrap(), "large");
    assert_eq!(values.get::<String>("color").unwrap(), "green");

    match cli.try_run_from(["medium", "--color", "red"]) {
        Err(CliError::Conversion(err)) => assert_eq!(
            err.message,
            "invalid choice: 'medium' (choose from 'small', 'large')"
        ),
        other => panic!("expected conversion error, got {:?}", other),
    }
}

#[test]
fn test_count_and_negatable_switch() {
    let (def, calls) = recording(
        CommandDef::new("run")
            .param(Param::new("verbose", TypeTag::Int))
            .param(Param::new("color", TypeTag::Bool).default(true))
            .arg("verbose", Arg::option("--verbose").short("-v").count()),
    );
    let mut cli = Cli::default();
    cli.register(def).unwrap();

    cli.try_run_from(["-vv", "--no-color"]).unwrap();
    let values = single_call(&calls);
    assert_eq!(values.get::<i64>("verbose").unwrap(), 2);
    assert!(!values.get::<bool>("color").unwrap());
}

#[test]
fn test_optional_values() {
    let (def, calls) = recording(
        CommandDef::new("opt")
            .param(Param::new("limit", TypeTag::optional(TypeTag::Int)))
            .arg("limit", Arg::option("--limit")),
    );
    let mut cli = Cli::default();
    cli.register(def).unwrap();

    cli.try_run_from(["opt"]).unwrap();
    assert_eq!(single_call(&calls).get::<Option<i64>>("limit").unwrap(), None);
}

#[test]
fn test_extra_tokens() {
    let (def, calls) = recording(
        CommandDef::new("wrap")
            .param(Param::new("cmd", TypeTag::Str))
            .allow_extra(),
    );
    let mut cli = Cli::default();
    cli.register(def).unwrap();

    cli.try_run_from(["ls", "-la", "--color"]).unwrap();
    let values = single_call(&calls);
    assert_eq!(values.get::<String>("cmd").unwrap(), "ls");
    assert_eq!(
        values.get::<Vec<String>>("_extra").unwrap(),
        vec!["-la", "--color"]
    );
}

#[test]
fn test_unknown_flag_without_extra_is_usage_error() {
    let mut cli = Cli::default();
    cli.register(hello()).unwrap();
    assert!(matches!(
        cli.try_run_from(["Alex", "--nope"]),
        Err(CliError::Usage(_))
    ));
}

#[test]
fn test_local_and_global_converters() {
    #[derive(Debug, PartialEq)]
    struct Person(String);

    let (def, calls) = recording(
        CommandDef::new("convert")
            .param(Param::new("shout", TypeTag::Str))
            .param(Param::new("person", TypeTag::named("Person")))
            .param(Param::new("numbers", TypeTag::list(TypeTag::Int)))
            .arg(
                "shout",
                Arg::new().converter(|s| Ok(Value::from(s.to_uppercase()))),
            )
            .arg("person", Arg::option("--person"))
            .arg("numbers", Arg::option("--numbers")),
    );
    let to_list = list_converter(converter(|x| Ok(Value::from(x))));
    let mut cli = Cli::default()
        .with_converter(TypeTag::named("Person"), |s| Ok(Value::custom(Person(s.to_string()))))
        .with_origin_converter(Origin::List, move |s| to_list(s));
    cli.register(def).unwrap();

    cli.try_run_from(["hey", "--person", "Alex", "--numbers", "1,2"])
        .unwrap();
    let values = single_call(&calls);
    assert_eq!(values.get::<String>("shout").unwrap(), "HEY");
    assert_eq!(
        values.get_custom::<Person>("person").unwrap(),
        &Person("Alex".to_string())
    );
    assert_eq!(
        values.get::<Vec<String>>("numbers").unwrap(),
        vec!["1", "2"]
    );
}

#[test]
fn test_existing_path_converters() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("input.txt");
    std::fs::write(&file, "data").unwrap();

    let (def, calls) = recording(
        CommandDef::new("read")
            .param(Param::new("input", TypeTag::existing_file_path_or_dash())),
    );
    let mut cli = Cli::default();
    cli.register(def).unwrap();

    cli.try_run_from([file.to_string_lossy().to_string()]).unwrap();
    assert_eq!(single_call(&calls).get::<PathBuf>("input").unwrap(), file);

    calls.borrow_mut().clear();
    cli.try_run_from(["-"]).unwrap();
    assert_eq!(single_call(&calls).get::<String>("input").unwrap(), "-");

    let missing = dir.path().join("missing.txt");
    match cli.try_run_from([missing.to_string_lossy().to_string()]) {
        Err(CliError::Conversion(err)) => {
            assert!(err.message.starts_with("path does not exist"))
        }
        other => panic!("expected conversion error, got {:?}", other),
    }
}

#[test]
fn test_partial_parse() {
    let mut cli = Cli::default();
    cli.register(hello()).unwrap();

    let parsed = cli.parse_partial(["hello", "--age", "3"]).unwrap();
    assert!(!parsed.values.contains("name"));
    assert_eq!(parsed.values.get::<i64>("age").unwrap(), 3);
    assert!(cli.parse(["hello", "--age", "3"]).is_err());
}

#[test]
fn test_registration_errors() {
    let mut cli = Cli::default();
    let err = cli
        .register(
            CommandDef::new("bad")
                .param(Param::new("a", TypeTag::named("Unknown"))),
        )
        .unwrap_err();
    assert!(matches!(err, RegistrationError::UnsupportedType { .. }));

    let err = cli
        .register(CommandDef::new("bad").arg("missing", Arg::option("--missing")))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "argument not found in signature for 'bad': missing"
    );
}

#[test]
fn test_reregistering_replaces_command() {
    let (first, first_calls) = recording(CommandDef::new("hello"));
    let (second, second_calls) = recording(CommandDef::new("hello"));
    let mut cli = Cli::default();
    cli.register(first).unwrap();
    cli.register(second).unwrap();

    cli.try_run_from(["hello"]).unwrap();
    assert!(first_calls.borrow().is_empty());
    assert_eq!(second_calls.borrow().len(), 1);
}
