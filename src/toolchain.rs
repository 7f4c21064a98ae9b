//! External toolchain invocation
//!
//! Everything that spawns a process goes through [`Launcher`]. The pipeline only
//! builds [`Invocation`]s and inspects the [`Exit`] it gets back, which keeps
//! the spawning itself swappable: [`SystemLauncher`] runs real programs with the
//! caller's stdio, tests record invocations instead.

use crate::artifact::Artifact;
use crate::error::{RunnerError, RunnerResult};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const DEFAULT_COMPILER: &str = "dmd";
pub const DEFAULT_INCLUDE_FLAG: &str = "-I";
pub const DEFAULT_INCLUDE_PATH: &str = "~/.dub/packages/tinyredis-2.1.1/tinyredis/source";
pub const DEFAULT_LIBRARY: &str = "~/.dub/packages/tinyredis-2.1.1/tinyredis/libtinyredis.a";

/// A program to run, with its arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub current_dir: PathBuf,
}

impl Invocation {
    pub fn new(program: impl Into<PathBuf>, current_dir: impl Into<PathBuf>) -> Self {
        Invocation {
            program: program.into(),
            args: Vec::new(),
            current_dir: current_dir.into(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }
}

/// Shell-like rendering, used for echoing and error messages.
impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program.to_string_lossy()))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    if !word.is_empty() && !word.contains(|c: char| c.is_whitespace() || c == '\'') {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// How a launched program ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
}

impl Exit {
    pub const SUCCESS: Exit = Exit { code: Some(0) };

    pub fn with_code(code: i32) -> Self {
        Exit { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Spawns external programs and waits for them.
pub trait Launcher {
    fn launch(&self, invocation: &Invocation) -> RunnerResult<Exit>;
}

/// Runs programs for real, inheriting stdin, stdout and stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, invocation: &Invocation) -> RunnerResult<Exit> {
        let program = resolve_program(&invocation.program)?;
        let status = Command::new(&program)
            .args(&invocation.args)
            .current_dir(&invocation.current_dir)
            .status()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => RunnerError::ProgramNotFound {
                    program: invocation.program.display().to_string(),
                },
                _ => RunnerError::io(&program, e),
            })?;
        Ok(Exit {
            code: status.code(),
        })
    }
}

/// Bare program names are looked up on `PATH`; anything with a path
/// separator is used as given.
fn resolve_program(program: &Path) -> RunnerResult<PathBuf> {
    if program.components().count() > 1 || program.is_absolute() {
        return Ok(program.to_path_buf());
    }
    which::which(program).map_err(|_| RunnerError::ProgramNotFound {
        program: program.display().to_string(),
    })
}

/// The compiler and the fixed third-party library snippets are built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub compiler: String,
    pub include_flag: String,
    pub include_paths: Vec<String>,
    pub libraries: Vec<String>,
}

impl Default for Toolchain {
    fn default() -> Self {
        Toolchain {
            compiler: DEFAULT_COMPILER.to_string(),
            include_flag: DEFAULT_INCLUDE_FLAG.to_string(),
            include_paths: vec![DEFAULT_INCLUDE_PATH.to_string()],
            libraries: vec![DEFAULT_LIBRARY.to_string()],
        }
    }
}

impl Toolchain {
    /// `<compiler> <flag><include>... <source> <library>...`, run in `work_dir`.
    pub fn compile_invocation(&self, artifact: &Artifact, work_dir: &Path) -> Invocation {
        let includes = self
            .include_paths
            .iter()
            .map(|path| format!("{}{}", self.include_flag, expand_home(path)));
        let libraries = self.libraries.iter().map(|lib| expand_home(lib));

        Invocation::new(&self.compiler, work_dir)
            .args(includes)
            .arg(artifact.source_name())
            .args(libraries)
    }

    /// The compiled snippet, run with no arguments in `work_dir`.
    pub fn run_invocation(&self, artifact: &Artifact, work_dir: &Path) -> Invocation {
        Invocation::new(&artifact.binary, work_dir)
    }
}

/// Expand a leading `~` to the user's home directory. Left untouched when
/// there is no home directory.
pub fn expand_home(path: &str) -> String {
    let rest = match path.strip_prefix('~') {
        Some("") => "",
        Some(rest) if rest.starts_with('/') => &rest[1..],
        _ => return path.to_string(),
    };
    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home.display().to_string(),
        Some(home) => home.join(rest).display().to_string(),
        None => path.to_string(),
    }
}
