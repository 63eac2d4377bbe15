//! Integration tests for static exports and the static runner

mod common;

use common::{recording, single_call, write_static};
use radicli::{
    Arg, Cli, CliError, CommandDef, DocOptions, Outcome, Param, Settings, StaticCli, TypeTag,
};

fn live_cli() -> Cli {
    let mut cli = Cli::new(
        Settings::new()
            .with_prog("rdc")
            .with_help("This is a CLI")
            .with_version("1.2.3"),
    );
    cli.register(
        CommandDef::new("hello")
            .description("Say hello")
            .param(Param::new("name", TypeTag::Str))
            .param(Param::new("age", TypeTag::Int).default(0))
            .param(Param::new("color", TypeTag::Bool).default(true))
            .arg("name", Arg::new().help("Your name"))
            .arg("age", Arg::option("--age").short("-a").help("Your age"))
            .func(|_| Ok(())),
    )
    .unwrap();
    cli.placeholder("group", Some("Grouped commands"));
    cli.register(
        CommandDef::new("child")
            .parent("group")
            .description("A child")
            .param(Param::new("size", TypeTag::literal(["s", "m"])))
            .arg("size", Arg::option("--size"))
            .func(|_| Ok(())),
    )
    .unwrap();
    cli
}

fn assert_same_outcome(args: &[&str], live: &Cli, stat: &StaticCli) {
    let live_result = live.try_run_from(args.iter().copied());
    let static_result = stat.try_run_from(args.iter().copied());
    match (live_result, static_result) {
        (Ok(a), Ok(b)) => assert_eq!(a, b, "outcome differs for {:?}", args),
        (Err(a), Err(b)) => {
            assert_eq!(a.to_string(), b.to_string(), "error differs for {:?}", args)
        }
        (a, b) => panic!("live {:?} and static {:?} disagree for {:?}", a, b, args),
    }
}

#[test]
fn test_static_answers_like_live() {
    let live = live_cli();
    for file_name in ["static.json", "static.yaml"] {
        let (_dir, path) = write_static(&live, file_name);
        let stat = StaticCli::load(&path).unwrap();

        assert_same_outcome(&[], &live, &stat);
        assert_same_outcome(&["--version"], &live, &stat);
        assert_same_outcome(&["hello", "--help"], &live, &stat);
        assert_same_outcome(&["group"], &live, &stat);
        assert_same_outcome(&["group", "child", "--help"], &live, &stat);
        assert_same_outcome(&["nope"], &live, &stat);
        assert_same_outcome(&["hello", "Alex", "--age", "old"], &live, &stat);
        assert_same_outcome(&["group", "child", "--size", "xl"], &live, &stat);
        assert_same_outcome(&["hello", "Alex", "--unknown"], &live, &stat);
    }
}

#[test]
fn test_static_completes_valid_tokens() {
    let (_dir, path) = write_static(&live_cli(), "static.json");
    let stat = StaticCli::load(&path).unwrap();

    assert_eq!(
        stat.try_run_from(["hello", "Alex", "--no-color"]).unwrap(),
        Outcome::Completed
    );
    assert_eq!(
        stat.try_run_from(["group", "child", "--size", "m"]).unwrap(),
        Outcome::Completed
    );
    assert!(matches!(
        stat.try_run_from(["hello"]),
        Err(CliError::Usage(_))
    ));
}

#[test]
fn test_run_then_runs_live_command() {
    let (_dir, path) = write_static(&live_cli(), "static.json");
    let stat = StaticCli::load(&path).unwrap().with_debug(true);

    let (def, calls) = recording(
        CommandDef::new("hello")
            .param(Param::new("name", TypeTag::Str))
            .param(Param::new("age", TypeTag::Int).default(0))
            .param(Param::new("color", TypeTag::Bool).default(true))
            .arg("age", Arg::option("--age").short("-a")),
    );
    let code = stat.run_then(["hello", "Alex", "-a", "4"], move || {
        let mut cli = Cli::new(Settings::new().with_prog("rdc"));
        cli.register(def).unwrap();
        cli
    });
    assert_eq!(code, 0);
    let values = single_call(&calls);
    assert_eq!(values.get::<i64>("age").unwrap(), 4);
    assert!(values.get::<bool>("color").unwrap());
}

#[test]
fn test_documentation_from_static_matches_live() {
    let live = live_cli();
    let (_dir, path) = write_static(&live, "static.json");
    let stat = StaticCli::load(&path).unwrap();
    let options = DocOptions::default()
        .with_title("Documentation")
        .with_description("Here are the docs for my CLI");

    let docs = live.document(&options);
    assert_eq!(stat.cli().document(&options), docs);

    let expected = "<!-- This file is auto-generated -->

# Documentation

Here are the docs for my CLI

## `rdc`

This is a CLI

### `rdc hello`

Say hello

| Argument | Type | Description | Default |
| --- | --- | --- | --- |
| `name` | `str` | Your name |  |
| `--age`, `-a` | `int` | Your age | `0` |
| `--color`/`--no-color` | `bool` |  | `true` |

### `rdc group`

Grouped commands

#### `rdc group child`

A child

| Argument | Type | Description | Default |
| --- | --- | --- | --- |
| `--size` | `literal[s, m]` |  |  |";
    assert_eq!(docs, expected);
}
