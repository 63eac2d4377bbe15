//! Common test utilities

#![allow(dead_code)]

use radicli::{Cli, CommandDef, Values};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;
use tempfile::TempDir;

/// Values of the last call of a recording command
pub type Calls = Rc<RefCell<Vec<Values>>>;

/// Bind a function to `def` that records every call
pub fn recording(def: CommandDef) -> (CommandDef, Calls) {
    let calls: Calls = Rc::new(RefCell::new(Vec::new()));
    let sink = calls.clone();
    let def = def.func(move |values| {
        sink.borrow_mut().push(values.clone());
        Ok(())
    });
    (def, calls)
}

/// The values of the only recorded call
pub fn single_call(calls: &Calls) -> Values {
    let calls = calls.borrow();
    assert_eq!(calls.len(), 1, "expected exactly one call");
    calls[0].clone()
}

/// Export `cli` into a temporary directory
pub fn write_static(cli: &Cli, file_name: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(file_name);
    cli.to_static(&path).unwrap();
    (temp_dir, path)
}
