//! Command-line interface for snippet-runner
//! Extracts the code snippets of a document, compiles them and runs them.
//!
//! Usage:
//!   snippets                  - Run the default task (extract)
//!   snippets `<task>`         - Run a named task
//!   snippets --list-tasks     - List all available tasks
mod settings;

use clap::{Arg, ArgAction, Command};
use snippet_config::Loader;
use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let matches = Command::new("snippets")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Extract code snippets from a document, compile and run them")
        .arg(
            Arg::new("task")
                .help("Task to run (default: extract)")
                .index(1),
        )
        .arg(
            Arg::new("list-tasks")
                .long("list-tasks")
                .short('T')
                .help("List available tasks")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Configuration file layered over the defaults")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("directory")
                .long("directory")
                .short('C')
                .help("Working directory holding the document and the artifacts")
                .value_parser(clap::value_parser!(PathBuf))
                .default_value("."),
        )
        .get_matches();

    let work_dir = matches
        .get_one::<PathBuf>("directory")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("."));

    let mut loader = Loader::new().with_project_dir(&work_dir);
    if let Some(path) = matches.get_one::<PathBuf>("config") {
        loader = loader.with_file(path);
    }
    let config = loader
        .build()
        .unwrap_or_else(|e| fail(format!("configuration error: {}", e), 1));
    tracing::debug!(
        work_dir = %work_dir.display(),
        document = %config.document.path.display(),
        "loaded configuration"
    );

    let registry =
        settings::task_registry(&config).unwrap_or_else(|e| fail(&e, e.exit_code()));

    if matches.get_flag("list-tasks") {
        print!("{}", settings::render_task_list(&registry));
        return;
    }

    let options =
        settings::runner_options(&config, &work_dir).unwrap_or_else(|e| fail(&e, e.exit_code()));
    let runner = snippet_runner::SnippetRunner::new(options);

    let stdout = std::io::stdout();
    let mut progress = stdout.lock();
    let task = matches.get_one::<String>("task").map(String::as_str);
    if let Err(e) = registry.run(task, &runner, &mut progress) {
        let _ = progress.flush();
        fail(&e, e.exit_code());
    }
}

/// Diagnostics go to stderr so they never interleave with snippet output on
/// stdout. `RUST_LOG` overrides the default filter.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("snippet_runner=info,snippets=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn fail(message: impl Display, code: i32) -> ! {
    eprintln!("snippets: {}", message);
    std::process::exit(code);
}
