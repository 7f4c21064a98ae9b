//! Turning a loaded [`SnippetConfig`] into runner options and a task registry.

use snippet_config::SnippetConfig;
use snippet_runner::{
    ArtifactNaming, Extractor, RunnerOptions, RunnerResult, TaskRegistry, Toolchain,
};
use std::path::Path;

/// Options for a run in `work_dir`. An invalid extraction pattern or unsafe
/// artifact naming is reported here, before anything touches the filesystem.
pub fn runner_options(config: &SnippetConfig, work_dir: &Path) -> RunnerResult<RunnerOptions> {
    let extractor = match &config.extract.pattern {
        Some(pattern) => Extractor::from_pattern(pattern)?,
        None => Extractor::for_language(&config.extract.language)?,
    };
    let artifacts = &config.artifacts;
    let toolchain = &config.toolchain;
    let naming = ArtifactNaming::new(
        &artifacts.prefix,
        &artifacts.extension,
        &artifacts.object_extension,
    );
    naming.validate()?;

    Ok(RunnerOptions {
        work_dir: work_dir.to_path_buf(),
        document: config.document.path.clone(),
        extractor,
        naming,
        toolchain: Toolchain {
            compiler: toolchain.compiler.clone(),
            include_flag: toolchain.include_flag.clone(),
            include_paths: toolchain.include_paths.clone(),
            libraries: toolchain.libraries.clone(),
        },
        fail_on_error: config.run.fail_on_error,
    })
}

/// Built-in tasks with the configured default.
pub fn task_registry(config: &SnippetConfig) -> RunnerResult<TaskRegistry> {
    let mut registry = TaskRegistry::with_defaults();
    registry.set_default(config.tasks.default.as_str())?;
    Ok(registry)
}

/// The `--list-tasks` listing.
pub fn render_task_list(registry: &TaskRegistry) -> String {
    let mut out = String::from("Available tasks:\n");
    for (name, description) in registry.descriptions() {
        let marker = if name == registry.default_task() {
            " (default)"
        } else {
            ""
        };
        out.push_str(&format!("\n  {}{}\n    {}\n", name, marker, description));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use snippet_config::{load_defaults, Loader};
    use snippet_runner::RunnerError;
    use std::path::PathBuf;

    #[test]
    fn defaults_map_onto_runner_options() {
        let config = load_defaults().unwrap();
        let options = runner_options(&config, Path::new("/work")).unwrap();

        assert_eq!(options.work_dir, PathBuf::from("/work"));
        assert_eq!(options.document, PathBuf::from("index.html"));
        assert_eq!(
            options.extractor.pattern(),
            r#"<code language="dlang">(.*?)</code>"#
        );
        assert_eq!(options.naming, ArtifactNaming::default());
        assert_eq!(options.toolchain, Toolchain::default());
        assert!(!options.fail_on_error);
    }

    #[test]
    fn pattern_takes_precedence_over_language() {
        let config = Loader::new()
            .set_override("extract.pattern", "<pre>(.*?)</pre>")
            .unwrap()
            .set_override("extract.language", "rust")
            .unwrap()
            .build()
            .unwrap();
        let options = runner_options(&config, Path::new(".")).unwrap();
        assert_eq!(options.extractor.pattern(), "<pre>(.*?)</pre>");
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let config = Loader::new()
            .set_override("extract.pattern", "<pre>.*?</pre>")
            .unwrap()
            .build()
            .unwrap();
        assert!(runner_options(&config, Path::new(".")).is_err());
    }

    #[test]
    fn prefix_with_path_separator_is_rejected() {
        let config = Loader::new()
            .set_override("artifacts.prefix", "build/snippet_")
            .unwrap()
            .build()
            .unwrap();
        match runner_options(&config, Path::new(".")) {
            Err(RunnerError::InvalidNaming(message)) => {
                assert!(message.contains("build/snippet_"), "{}", message)
            }
            other => panic!("expected invalid naming, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn empty_extension_is_rejected() {
        let config = Loader::new()
            .set_override("artifacts.extension", "")
            .unwrap()
            .build()
            .unwrap();
        assert!(matches!(
            runner_options(&config, Path::new(".")),
            Err(RunnerError::InvalidNaming(_))
        ));
    }

    #[test]
    fn unknown_default_task_is_rejected() {
        let config = Loader::new()
            .set_override("tasks.default", "deploy")
            .unwrap()
            .build()
            .unwrap();
        assert!(task_registry(&config).is_err());
    }

    #[test]
    fn task_listing() {
        let registry = task_registry(&load_defaults().unwrap()).unwrap();
        insta::assert_snapshot!(render_task_list(&registry), @r"
        Available tasks:

          clean
            remove generated snippet artifacts

          extract (default)
            extract code snippets, compile and run them
        ");
    }
}
