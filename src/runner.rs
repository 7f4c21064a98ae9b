//! The extract, compile and run pipeline
//!
//! [`SnippetRunner::run`] is strictly sequential, with at most one snippet in
//! flight:
//!
//! 1. remove artifacts left by earlier runs
//! 2. load the document (a missing document fails here, before anything is
//!    extracted or written)
//! 3. for each snippet, in document order: report progress, write the source,
//!    compile it, run the executable
//!
//! A compiler failure aborts the run on the spot, so no later snippet is
//! written. The executable's own exit status is only reported unless
//! [`RunnerOptions::fail_on_error`] is set.

use crate::artifact::{Artifact, ArtifactNaming};
use crate::document::Document;
use crate::error::{RunnerError, RunnerResult};
use crate::extract::Extractor;
use crate::toolchain::{Exit, Invocation, Launcher, SystemLauncher, Toolchain};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

pub const DEFAULT_DOCUMENT: &str = "index.html";

/// Everything the pipeline needs to know, minus how to spawn processes.
#[derive(Debug, Clone)]
pub struct RunnerOptions {
    /// Directory artifacts are written to and commands run in.
    pub work_dir: PathBuf,
    /// Document to scan; relative paths are taken from `work_dir`.
    pub document: PathBuf,
    pub extractor: Extractor,
    pub naming: ArtifactNaming,
    pub toolchain: Toolchain,
    /// Treat a non-zero exit of a compiled snippet as a failure.
    pub fail_on_error: bool,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        RunnerOptions {
            work_dir: PathBuf::from("."),
            document: PathBuf::from(DEFAULT_DOCUMENT),
            extractor: Extractor::default(),
            naming: ArtifactNaming::default(),
            toolchain: Toolchain::default(),
            fail_on_error: false,
        }
    }
}

/// Outcome of one snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRun {
    pub artifact: Artifact,
    /// Exit status of the compiled snippet itself.
    pub exit: Exit,
}

/// What a completed run did, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub runs: Vec<ArtifactRun>,
}

impl RunReport {
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Snippets whose executable exited unsuccessfully.
    pub fn failures(&self) -> impl Iterator<Item = &ArtifactRun> {
        self.runs.iter().filter(|run| !run.exit.success())
    }
}

pub struct SnippetRunner {
    options: RunnerOptions,
    launcher: Box<dyn Launcher>,
}

impl SnippetRunner {
    pub fn new(options: RunnerOptions) -> Self {
        SnippetRunner {
            options,
            launcher: Box::new(SystemLauncher),
        }
    }

    /// Use `launcher` to spawn the compiler and the snippets.
    pub fn with_launcher(mut self, launcher: impl Launcher + 'static) -> Self {
        self.launcher = Box::new(launcher);
        self
    }

    pub fn options(&self) -> &RunnerOptions {
        &self.options
    }

    /// Remove every artifact in the working directory.
    pub fn clean(&self) -> RunnerResult<Vec<PathBuf>> {
        let removed = self.options.naming.clean(&self.options.work_dir)?;
        tracing::info!(count = removed.len(), "cleaned snippet artifacts");
        Ok(removed)
    }

    /// Run the whole pipeline, writing progress lines to `progress`.
    pub fn run(&self, progress: &mut dyn Write) -> RunnerResult<RunReport> {
        let work_dir = fs::canonicalize(&self.options.work_dir)
            .map_err(|e| RunnerError::io(&self.options.work_dir, e))?;

        self.options.naming.clean(&work_dir)?;
        let document = Document::from_path(work_dir.join(&self.options.document))?;

        let mut report = RunReport::default();
        for snippet in self.options.extractor.snippets(&document) {
            let artifact = self.options.naming.artifact(&work_dir, snippet.index);
            writeln!(
                progress,
                "-------------------- Working on {}",
                artifact.source_name()
            )
            .and_then(|_| progress.flush())
            .map_err(RunnerError::Progress)?;

            artifact.persist(snippet.body)?;

            let compile = self.options.toolchain.compile_invocation(&artifact, &work_dir);
            self.sh(&compile)?;

            let run = self.options.toolchain.run_invocation(&artifact, &work_dir);
            let exit = self.launch(&run)?;
            if !exit.success() {
                if self.options.fail_on_error {
                    return Err(RunnerError::CommandFailed {
                        command: run.to_string(),
                        code: exit.code,
                    });
                }
                tracing::warn!(
                    artifact = %artifact.source_name(),
                    code = ?exit.code,
                    "snippet exited unsuccessfully"
                );
            }
            report.runs.push(ArtifactRun { artifact, exit });
        }

        tracing::info!(snippets = report.len(), "finished snippet run");
        Ok(report)
    }

    /// Launch and require success.
    fn sh(&self, invocation: &Invocation) -> RunnerResult<()> {
        let exit = self.launch(invocation)?;
        if exit.success() {
            Ok(())
        } else {
            Err(RunnerError::CommandFailed {
                command: invocation.to_string(),
                code: exit.code,
            })
        }
    }

    fn launch(&self, invocation: &Invocation) -> RunnerResult<Exit> {
        tracing::info!("{}", invocation);
        self.launcher.launch(invocation)
    }
}
