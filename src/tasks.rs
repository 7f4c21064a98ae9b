//! Named tasks
//!
//! A task is a named, described unit of work over a [`SnippetRunner`], chosen
//! from the command line. The registry also knows which task runs when none is
//! named.
//!
//! Built-in tasks:
//!
//! | name      | does                                   |
//! |-----------|----------------------------------------|
//! | `extract` | clean, extract, compile and run        |
//! | `clean`   | remove generated snippet artifacts     |

use crate::error::{RunnerError, RunnerResult};
use crate::runner::{RunReport, SnippetRunner};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

pub const EXTRACT_TASK: &str = "extract";
pub const CLEAN_TASK: &str = "clean";

/// What a task produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Ran(RunReport),
    Cleaned(Vec<PathBuf>),
}

/// A unit of work selectable by name.
pub trait Task {
    fn name(&self) -> &str;

    /// One line, shown by `--list-tasks`.
    fn description(&self) -> &str {
        ""
    }

    fn run(&self, runner: &SnippetRunner, progress: &mut dyn Write) -> RunnerResult<TaskOutcome>;
}

/// Clean, then extract, compile and run every snippet.
pub struct ExtractTask;

impl Task for ExtractTask {
    fn name(&self) -> &str {
        EXTRACT_TASK
    }

    fn description(&self) -> &str {
        "extract code snippets, compile and run them"
    }

    fn run(&self, runner: &SnippetRunner, progress: &mut dyn Write) -> RunnerResult<TaskOutcome> {
        runner.run(progress).map(TaskOutcome::Ran)
    }
}

/// Remove artifacts left by earlier runs.
pub struct CleanTask;

impl Task for CleanTask {
    fn name(&self) -> &str {
        CLEAN_TASK
    }

    fn description(&self) -> &str {
        "remove generated snippet artifacts"
    }

    fn run(&self, runner: &SnippetRunner, _progress: &mut dyn Write) -> RunnerResult<TaskOutcome> {
        runner.clean().map(TaskOutcome::Cleaned)
    }
}

/// Registry of tasks, looked up by name.
pub struct TaskRegistry {
    tasks: HashMap<String, Box<dyn Task>>,
    default_task: String,
}

impl TaskRegistry {
    /// An empty registry whose default is `extract`.
    pub fn new() -> Self {
        TaskRegistry {
            tasks: HashMap::new(),
            default_task: EXTRACT_TASK.to_string(),
        }
    }

    /// The built-in tasks.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(ExtractTask);
        registry.register(CleanTask);
        registry
    }

    /// Register a task, replacing any task with the same name.
    pub fn register<T: Task + 'static>(&mut self, task: T) {
        self.tasks.insert(task.name().to_string(), Box::new(task));
    }

    /// Choose the task that runs when none is named.
    pub fn set_default(&mut self, name: impl Into<String>) -> RunnerResult<()> {
        let name = name.into();
        self.get(&name)?;
        self.default_task = name;
        Ok(())
    }

    pub fn default_task(&self) -> &str {
        &self.default_task
    }

    pub fn get(&self, name: &str) -> RunnerResult<&dyn Task> {
        self.tasks
            .get(name)
            .map(|t| t.as_ref())
            .ok_or_else(|| RunnerError::UnknownTask {
                name: name.to_string(),
                available: self.list_tasks(),
            })
    }

    pub fn has(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// All task names, sorted.
    pub fn list_tasks(&self) -> Vec<String> {
        let mut names: Vec<_> = self.tasks.keys().cloned().collect();
        names.sort();
        names
    }

    /// `(name, description)` pairs, sorted by name.
    pub fn descriptions(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<_> = self
            .tasks
            .values()
            .map(|t| (t.name(), t.description()))
            .collect();
        entries.sort();
        entries
    }

    /// Run `name`, or the default task when `name` is `None`.
    pub fn run(
        &self,
        name: Option<&str>,
        runner: &SnippetRunner,
        progress: &mut dyn Write,
    ) -> RunnerResult<TaskOutcome> {
        let task = self.get(name.unwrap_or(&self.default_task))?;
        tracing::debug!(task = task.name(), "running task");
        task.run(runner, progress)
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
