//! Running a CLI from its static export
//!
//! The static runner answers help, version and validation errors from the
//! exported data alone. Only when the tokens were accepted does the live CLI
//! need to be built and run.

use crate::cli::app::finish;
use crate::cli::{Cli, Outcome};
use crate::error::{Result, StaticResult};
use crate::export::StaticData;
use std::path::{Path, PathBuf};

const DEBUG_START: &str = "===== STATIC =====";
const DEBUG_END: &str = "=== END STATIC ===";

/// A CLI loaded from a static export
pub struct StaticCli {
    path: PathBuf,
    cli: Cli,
    debug: bool,
}

impl StaticCli {
    pub fn load(path: impl AsRef<Path>) -> StaticResult<Self> {
        let path = path.as_ref();
        let data = StaticData::read(path)?;
        Ok(StaticCli {
            path: path.to_path_buf(),
            cli: data.into_cli(),
            debug: false,
        })
    }

    /// Wrap output in start and end markers
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The function-less CLI rebuilt from the export
    pub fn cli(&self) -> &Cli {
        &self.cli
    }

    /// Check `args` against the export. [`Outcome::Completed`] means the
    /// live CLI should take over.
    pub fn try_run_from<I, S>(&self, args: I) -> Result<Outcome>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        tracing::debug!(path = %self.path.display(), "running static CLI");
        self.cli.try_run_from(args)
    }

    /// Run with `args` and report the result. Returns the exit code.
    pub fn run_from<I, S>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if self.debug {
            println!("{}", DEBUG_START);
        }
        let code = finish(self.try_run_from(args));
        if self.debug {
            println!("{}", DEBUG_END);
        }
        code
    }

    /// Run the static CLI and hand over to the live one built by `live` when
    /// the tokens were accepted and nothing was printed. Returns the exit
    /// code.
    pub fn run_then<I, S, F>(&self, args: I, live: F) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: FnOnce() -> Cli,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        if self.debug {
            println!("{}", DEBUG_START);
        }
        let result = self.try_run_from(args.iter().cloned());
        let handover = matches!(result, Ok(Outcome::Completed));
        let code = if handover { 0 } else { finish(result) };
        if self.debug {
            println!("{}", DEBUG_END);
        }
        if !handover {
            return code;
        }
        tracing::debug!("static checks passed, running live CLI");
        live().run_from(args)
    }
}
