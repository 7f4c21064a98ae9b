//! # snippet-runner
//!
//! Extracts the code snippets embedded in a documentation file, writes each to
//! its own source file, compiles it against a fixed third-party library and
//! runs the result.
//!
//! The pipeline is deliberately linear and sequential:
//!
//!     document ──extract──▶ snippets ──persist──▶ snippet_N.d ──compile──▶ snippet_N ──run
//!
//! Modules:
//!
//! - [`document`] - loading the scanned document
//! - [`extract`] - regex based snippet extraction
//! - [`artifact`] - artifact naming, writing and cleanup
//! - [`toolchain`] - compiler invocation and the process [`Launcher`] seam
//! - [`runner`] - the pipeline itself
//! - [`tasks`] - named tasks and the default task
//!
//! This is a pure lib: it never prints on its own.
//! Progress lines go to a caller-supplied writer and diagnostics go through
//! `tracing`, so the front end decides where both end up.

pub mod artifact;
pub mod document;
pub mod error;
pub mod extract;
pub mod runner;
pub mod tasks;
pub mod toolchain;

pub use artifact::{Artifact, ArtifactNaming};
pub use document::Document;
pub use error::{RunnerError, RunnerResult};
pub use extract::{Extractor, Snippet};
pub use runner::{RunReport, RunnerOptions, SnippetRunner};
pub use tasks::{Task, TaskOutcome, TaskRegistry};
pub use toolchain::{Exit, Invocation, Launcher, SystemLauncher, Toolchain};
