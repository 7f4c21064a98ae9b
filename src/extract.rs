//! Snippet extraction
//!
//! Snippets are found by a regular expression whose single capture group is the
//! snippet body. Matching always runs with `.` matching newlines so a body may
//! span any number of lines, and the body group is expected to be lazy
//! (`(.*?)`) so that adjacent tags are not merged into one snippet.
//!
//! The default pattern targets `<code language="dlang">...</code>`:
//!
//! ```text
//! <code language="dlang">import std.stdio;
//! void main() { writeln("hi"); }</code>
//! ```
//!
//! Extraction is lazy: [`Extractor::snippets`] walks the document match by
//! match. Zero matches is an empty sequence, never an error.

use crate::document::Document;
use crate::error::{RunnerError, RunnerResult};
use once_cell::sync::Lazy;
use regex::{CaptureMatches, Regex, RegexBuilder};

/// Language attribute the default pattern looks for.
pub const DEFAULT_LANGUAGE: &str = "dlang";

static DEFAULT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    compile(&language_pattern(DEFAULT_LANGUAGE)).expect("default snippet pattern is valid")
});

/// One embedded code block, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snippet<'a> {
    /// Zero-based position among all snippets of the document.
    pub index: usize,
    /// The text between the tags, untouched.
    pub body: &'a str,
}

/// Finds snippets in a document.
#[derive(Debug, Clone)]
pub struct Extractor {
    regex: Regex,
}

impl Extractor {
    /// Extractor for `<code language="LANG">...</code>` blocks.
    pub fn for_language(language: &str) -> RunnerResult<Self> {
        if language == DEFAULT_LANGUAGE {
            return Ok(Self::default());
        }
        Self::from_pattern(&language_pattern(language))
    }

    /// Extractor for a custom pattern with exactly one capture group.
    pub fn from_pattern(pattern: &str) -> RunnerResult<Self> {
        let regex = compile(pattern)?;
        tracing::debug!(pattern, "compiled snippet pattern");
        Ok(Extractor { regex })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Lazily iterate over the snippets of `document`.
    pub fn snippets<'r, 'd>(&'r self, document: &'d Document) -> Snippets<'r, 'd> {
        Snippets {
            captures: self.regex.captures_iter(document.source()),
            next_index: 0,
        }
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Extractor {
            regex: DEFAULT_PATTERN.clone(),
        }
    }
}

/// Iterator returned by [`Extractor::snippets`].
pub struct Snippets<'r, 'd> {
    captures: CaptureMatches<'r, 'd>,
    next_index: usize,
}

impl<'r, 'd> Iterator for Snippets<'r, 'd> {
    type Item = Snippet<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let caps = self.captures.next()?;
        let index = self.next_index;
        self.next_index += 1;
        Some(Snippet {
            index,
            body: caps.get(1).map_or("", |m| m.as_str()),
        })
    }
}

fn language_pattern(language: &str) -> String {
    format!(
        r#"<code language="{}">(.*?)</code>"#,
        regex::escape(language)
    )
}

fn compile(pattern: &str) -> RunnerResult<Regex> {
    let regex = RegexBuilder::new(pattern)
        .dot_matches_new_line(true)
        .build()
        .map_err(|e| RunnerError::InvalidPattern(e.to_string()))?;
    // captures_len counts the implicit whole-match group
    if regex.captures_len() != 2 {
        return Err(RunnerError::InvalidPattern(format!(
            "'{}' must have exactly one capture group for the snippet body, found {}",
            pattern,
            regex.captures_len() - 1
        )));
    }
    Ok(regex)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bodies(extractor: &Extractor, source: &str) -> Vec<String> {
        let doc = Document::from_string(source);
        extractor
            .snippets(&doc)
            .map(|s| s.body.to_string())
            .collect()
    }

    #[test]
    fn extracts_in_document_order() {
        let source = concat!(
            "<h1>Intro</h1>\n",
            "<code language=\"dlang\">void main(){}</code>\n",
            "<p>text</p>\n",
            "<code language=\"dlang\">import std.stdio;\nvoid main() { writeln(1); }\n</code>\n",
        );
        let doc = Document::from_string(source);
        let extractor = Extractor::default();
        let snippets: Vec<_> = extractor.snippets(&doc).collect();

        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].index, 0);
        assert_eq!(snippets[0].body, "void main(){}");
        assert_eq!(snippets[1].index, 1);
        assert_eq!(
            snippets[1].body,
            "import std.stdio;\nvoid main() { writeln(1); }\n"
        );
    }

    #[test]
    fn adjacent_tags_are_not_merged() {
        let source = r#"<code language="dlang">a</code><code language="dlang">b</code>"#;
        assert_eq!(bodies(&Extractor::default(), source), vec!["a", "b"]);
    }

    #[test]
    fn zero_matches_is_empty() {
        assert!(bodies(&Extractor::default(), "<p>no code here</p>").is_empty());
        assert!(bodies(&Extractor::default(), "").is_empty());
    }

    #[test]
    fn other_languages_are_ignored() {
        let source = concat!(
            r#"<code language="python">print(1)</code>"#,
            r#"<code language="dlang">void main(){}</code>"#,
        );
        assert_eq!(bodies(&Extractor::default(), source), vec!["void main(){}"]);
    }

    #[test]
    fn body_is_not_trimmed_or_unescaped() {
        let source = "<code language=\"dlang\">\n  auto x = a &lt; b;\n</code>";
        assert_eq!(
            bodies(&Extractor::default(), source),
            vec!["\n  auto x = a &lt; b;\n"]
        );
    }

    #[test]
    fn language_is_escaped() {
        let extractor = Extractor::for_language("c++").unwrap();
        let source = r#"<code language="c++">int main(){}</code><code language="cc">x</code>"#;
        assert_eq!(bodies(&extractor, source), vec!["int main(){}"]);
    }

    #[test]
    fn custom_pattern_spans_lines() {
        let extractor = Extractor::from_pattern(r"```d\n(.*?)```").unwrap();
        let source = "```d\nvoid main(){}\n```\n\n```d\nint x;\n```";
        assert_eq!(
            bodies(&extractor, source),
            vec!["void main(){}\n", "int x;\n"]
        );
    }

    #[test]
    fn rejects_pattern_without_capture_group() {
        let err = Extractor::from_pattern("<code>.*?</code>").unwrap_err();
        assert!(matches!(err, RunnerError::InvalidPattern(_)));
    }

    #[test]
    fn rejects_pattern_with_two_capture_groups() {
        let err = Extractor::from_pattern("<code (\\w+)>(.*?)</code>").unwrap_err();
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn rejects_invalid_regex() {
        let err = Extractor::from_pattern("<code>(.*?</code>").unwrap_err();
        assert!(matches!(err, RunnerError::InvalidPattern(_)));
    }

    #[test]
    fn default_pattern_is_the_dlang_pattern() {
        assert_eq!(
            Extractor::default().pattern(),
            r#"<code language="dlang">(.*?)</code>"#
        );
    }
}
