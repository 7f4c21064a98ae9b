//! Artifact naming, persistence and cleanup
//!
//! Every snippet owns exactly one set of files, derived from its index:
//!
//! | file        | name                         | written by |
//! |-------------|------------------------------|------------|
//! | source      | `<prefix><index>.<ext>`      | us         |
//! | object      | `<prefix><index>.<obj-ext>`  | compiler   |
//! | executable  | `<prefix><index>`            | compiler   |
//!
//! Cleanup removes any file of that shape, whatever its index, so a run never
//! leaves behind artifacts from an earlier run that found more snippets.

use crate::error::{RunnerError, RunnerResult};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PREFIX: &str = "snippet_";
pub const DEFAULT_EXTENSION: &str = "d";
pub const DEFAULT_OBJECT_EXTENSION: &str = "o";

/// How artifact files are named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNaming {
    pub prefix: String,
    pub extension: String,
    pub object_extension: String,
}

impl Default for ArtifactNaming {
    fn default() -> Self {
        ArtifactNaming {
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            object_extension: DEFAULT_OBJECT_EXTENSION.to_string(),
        }
    }
}

/// Files belonging to one snippet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub index: usize,
    /// Snippet source, written verbatim.
    pub source: PathBuf,
    /// Executable the compiler produces next to the source.
    pub binary: PathBuf,
}

impl Artifact {
    /// File name of the source, as shown in progress output.
    pub fn source_name(&self) -> String {
        file_name(&self.source)
    }

    /// Write `body` to the source file, byte for byte.
    pub fn persist(&self, body: &str) -> RunnerResult<()> {
        fs::write(&self.source, body.as_bytes()).map_err(|e| RunnerError::io(&self.source, e))
    }
}

impl ArtifactNaming {
    pub fn new(
        prefix: impl Into<String>,
        extension: impl Into<String>,
        object_extension: impl Into<String>,
    ) -> Self {
        ArtifactNaming {
            prefix: prefix.into(),
            extension: extension.into(),
            object_extension: object_extension.into(),
        }
    }

    /// Check that artifacts land directly in the working directory and that
    /// cleanup can only ever match artifact names.
    ///
    /// The prefix and both extensions must be non-empty and free of path
    /// separators.
    pub fn validate(&self) -> RunnerResult<()> {
        for (what, value) in [
            ("prefix", &self.prefix),
            ("extension", &self.extension),
            ("object extension", &self.object_extension),
        ] {
            if value.is_empty() {
                return Err(RunnerError::InvalidNaming(format!(
                    "{} must not be empty",
                    what
                )));
            }
            if value.contains(['/', '\\']) {
                return Err(RunnerError::InvalidNaming(format!(
                    "{} '{}' must not contain a path separator",
                    what, value
                )));
            }
        }
        Ok(())
    }

    pub fn stem(&self, index: usize) -> String {
        format!("{}{}", self.prefix, index)
    }

    pub fn source_file_name(&self, index: usize) -> String {
        format!("{}.{}", self.stem(index), self.extension)
    }

    /// Paths of the artifact for snippet `index` inside `work_dir`.
    pub fn artifact(&self, work_dir: &Path, index: usize) -> Artifact {
        Artifact {
            index,
            source: work_dir.join(self.source_file_name(index)),
            binary: work_dir.join(self.stem(index)),
        }
    }

    /// Whether `name` is a file this naming scheme produces.
    ///
    /// Only `<prefix><digits>` optionally followed by the source or object
    /// extension qualifies; `snippet_notes.txt` does not.
    pub fn is_artifact(&self, name: &str) -> bool {
        let Some(rest) = name.strip_prefix(self.prefix.as_str()) else {
            return false;
        };
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return false;
        }
        match &rest[digits..] {
            "" => true,
            suffix => suffix.strip_prefix('.').map_or(false, |ext| {
                ext == self.extension || ext == self.object_extension
            }),
        }
    }

    /// Remove every artifact file in `work_dir`. Returns what was removed,
    /// sorted by file name.
    ///
    /// A missing directory or an already-gone file is not an error. Unsafe
    /// naming is refused before the directory is read.
    pub fn clean(&self, work_dir: &Path) -> RunnerResult<Vec<PathBuf>> {
        self.validate()?;
        let entries = match fs::read_dir(work_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RunnerError::io(work_dir, e)),
        };

        let mut removed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| RunnerError::io(work_dir, e))?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if !self.is_artifact(&name) {
                continue;
            }
            let file_type = entry.file_type().map_err(|e| RunnerError::io(entry.path(), e))?;
            if file_type.is_dir() {
                continue;
            }
            let path = entry.path();
            match fs::remove_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "removed stale artifact");
                    removed.push(path);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(RunnerError::io(path, e)),
            }
        }
        removed.sort();
        Ok(removed)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::tempdir;

    #[test]
    fn names_are_derived_from_index() {
        let naming = ArtifactNaming::default();
        let artifact = naming.artifact(Path::new("/work"), 3);
        assert_eq!(artifact.source, PathBuf::from("/work/snippet_3.d"));
        assert_eq!(artifact.binary, PathBuf::from("/work/snippet_3"));
        assert_eq!(artifact.source_name(), "snippet_3.d");
    }

    #[rstest]
    #[case("snippet_0.d", true)]
    #[case("snippet_12.d", true)]
    #[case("snippet_12", true)]
    #[case("snippet_12.o", true)]
    #[case("snippet_.d", false)]
    #[case("snippet_notes.txt", false)]
    #[case("snippet_1.txt", false)]
    #[case("snippet_1.d.bak", false)]
    #[case("snippet_1a.d", false)]
    #[case("my_snippet_1.d", false)]
    #[case("index.html", false)]
    fn recognises_artifact_names(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(ArtifactNaming::default().is_artifact(name), expected);
    }

    #[test]
    fn custom_naming() {
        let naming = ArtifactNaming::new("ex", "c", "obj");
        assert_eq!(naming.source_file_name(0), "ex0.c");
        assert!(naming.is_artifact("ex0.obj"));
        assert!(!naming.is_artifact("ex0.o"));
    }

    #[test]
    fn default_naming_is_valid() {
        assert!(ArtifactNaming::default().validate().is_ok());
    }

    #[rstest]
    #[case("build/snippet_", "d", "o", "path separator")]
    #[case("build\\snippet_", "d", "o", "path separator")]
    #[case("snippet_", "d/x", "o", "path separator")]
    #[case("", "d", "o", "prefix must not be empty")]
    #[case("snippet_", "", "o", "extension must not be empty")]
    #[case("snippet_", "d", "", "object extension must not be empty")]
    fn rejects_unsafe_naming(
        #[case] prefix: &str,
        #[case] extension: &str,
        #[case] object_extension: &str,
        #[case] message: &str,
    ) {
        let err = ArtifactNaming::new(prefix, extension, object_extension)
            .validate()
            .unwrap_err();
        assert!(matches!(err, RunnerError::InvalidNaming(_)));
        assert!(err.to_string().contains(message), "{}", err);
    }

    #[test]
    fn persist_is_verbatim() {
        let dir = tempdir().unwrap();
        let artifact = ArtifactNaming::default().artifact(dir.path(), 0);
        artifact.persist("void main(){}").unwrap();
        assert_eq!(fs::read(&artifact.source).unwrap(), b"void main(){}");
    }

    #[test]
    fn clean_removes_only_artifacts() {
        let dir = tempdir().unwrap();
        for name in [
            "snippet_0.d",
            "snippet_0",
            "snippet_0.o",
            "snippet_7.d",
            "snippet_notes.txt",
            "index.html",
        ] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir(dir.path().join("snippet_9")).unwrap();

        let removed = ArtifactNaming::default().clean(dir.path()).unwrap();
        let removed: Vec<_> = removed.iter().map(|p| file_name(p)).collect();
        assert_eq!(
            removed,
            vec!["snippet_0", "snippet_0.d", "snippet_0.o", "snippet_7.d"]
        );
        assert!(dir.path().join("snippet_notes.txt").exists());
        assert!(dir.path().join("index.html").exists());
        assert!(dir.path().join("snippet_9").is_dir());
    }

    #[test]
    fn clean_with_empty_prefix_touches_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("2024"), "notes").unwrap();
        fs::write(dir.path().join("1.o"), "object").unwrap();

        let err = ArtifactNaming::new("", "d", "o").clean(dir.path()).unwrap_err();

        assert!(matches!(err, RunnerError::InvalidNaming(_)));
        assert!(dir.path().join("2024").exists());
        assert!(dir.path().join("1.o").exists());
    }

    #[test]
    fn clean_refuses_prefix_outside_work_dir() {
        let dir = tempdir().unwrap();
        let naming = ArtifactNaming::new("build/snippet_", "d", "o");

        let err = naming.clean(dir.path()).unwrap_err();

        assert!(matches!(err, RunnerError::InvalidNaming(_)));
    }

    #[test]
    fn clean_of_missing_directory_is_a_no_op() {
        let dir = tempdir().unwrap();
        let removed = ArtifactNaming::default()
            .clean(&dir.path().join("absent"))
            .unwrap();
        assert!(removed.is_empty());
    }
}
