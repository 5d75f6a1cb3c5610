//! Script loading and block segmentation.
//!
//! A script is split into blocks at empty lines. Each block is typed and
//! executed as one shell command, so a block may span several lines
//! (backslash continuations, here-documents and the like). A line holding
//! only spaces or tabs is not empty and stays inside its block.

use std::path::Path;

use crate::error::{CastError, Result};

/// The text of a script to replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    text: String,
}

impl Script {
    /// Create a script from text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a script file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        std::fs::read_to_string(path)
            .map(Self::new)
            .map_err(|e| CastError::input_read(path, e))
    }

    /// The full script text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Iterate over the blocks of the script.
    ///
    /// Each call starts again from the first block.
    #[must_use]
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks::new(&self.text)
    }
}

/// One command block: consecutive non-empty lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block<'a> {
    lines: Vec<&'a str>,
}

impl<'a> Block<'a> {
    /// Create a block from its lines.
    #[must_use]
    pub const fn new(lines: Vec<&'a str>) -> Self {
        Self { lines }
    }

    /// The lines of the block, verbatim.
    #[must_use]
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// The block as a single command, lines joined with `\n`.
    #[must_use]
    pub fn command(&self) -> String {
        self.lines.join("\n")
    }

    /// Number of lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the block has no lines. Blocks yielded by [`Blocks`] never do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Lazy iterator over the blocks of a script.
#[derive(Debug, Clone)]
pub struct Blocks<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> Blocks<'a> {
    /// Segment `text` into blocks.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
        }
    }
}

/// Only a line with no characters at all separates blocks.
fn is_blank(line: &str) -> bool {
    line.is_empty()
}

impl<'a> Iterator for Blocks<'a> {
    type Item = Block<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut lines = Vec::new();
        for line in self.lines.by_ref() {
            if is_blank(line) {
                if !lines.is_empty() {
                    break;
                }
            } else {
                lines.push(line);
            }
        }
        (!lines.is_empty()).then(|| Block::new(lines))
    }
}

impl std::iter::FusedIterator for Blocks<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn segment(text: &str) -> Vec<Vec<&str>> {
        Blocks::new(text).map(|b| b.lines().to_vec()).collect()
    }

    #[test]
    fn two_blocks() {
        assert_eq!(segment("foo\n\nbar"), vec![vec!["foo"], vec!["bar"]]);
    }

    #[test]
    fn no_separators_is_one_block() {
        assert_eq!(
            segment("cd /tmp\nls -la\npwd\n"),
            vec![vec!["cd /tmp", "ls -la", "pwd"]]
        );
    }

    #[test]
    fn blank_runs_coalesce() {
        assert_eq!(
            segment("\n\n\na\n\n\n\nb\nc\n\n"),
            vec![vec!["a"], vec!["b", "c"]]
        );
    }

    #[test]
    fn empty_script() {
        assert!(segment("").is_empty());
        assert!(segment("\n\n\r\n").is_empty());
    }

    #[test]
    fn whitespace_only_lines_stay_in_block() {
        assert_eq!(
            segment("cat <<EOF\nfirst\n   \nsecond\nEOF\n\necho done"),
            vec![
                vec!["cat <<EOF", "first", "   ", "second", "EOF"],
                vec!["echo done"],
            ]
        );
        assert_eq!(segment("\n \n\t\n"), vec![vec![" ", "\t"]]);
    }

    #[test]
    fn lines_kept_verbatim() {
        let blocks = segment("echo one \\\n    two\n\n\t# note");
        assert_eq!(blocks, vec![vec!["echo one \\", "    two"], vec!["\t# note"]]);
    }

    #[test]
    fn crlf_lines() {
        assert_eq!(segment("a\r\n\r\nb\r\n"), vec![vec!["a"], vec!["b"]]);
    }

    #[test]
    fn blocks_restart() {
        let script = Script::new("a\n\nb");
        assert_eq!(script.blocks().count(), 2);
        assert_eq!(script.blocks().count(), 2);
        assert_eq!(script.blocks().next().unwrap().command(), "a");
    }

    #[test]
    fn command_joins_lines() {
        let block = Block::new(vec!["for i in 1 2; do", "  echo $i", "done"]);
        assert_eq!(block.command(), "for i in 1 2; do\n  echo $i\ndone");
        assert_eq!(block.len(), 3);
        assert!(!block.is_empty());
    }

    #[test]
    fn from_path_missing() {
        let err = Script::from_path("/nonexistent/demo.sh").unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("demo.sh");
        std::fs::write(&path, "echo hi\n").unwrap();
        assert_eq!(Script::from_path(&path).unwrap().text(), "echo hi\n");
    }

    fn line_strategy() -> impl Strategy<Value = String> {
        "[a-z#$\\\\ ]{0,6}[a-z]"
    }

    fn blocks_strategy() -> impl Strategy<Value = Vec<Vec<String>>> {
        prop::collection::vec(prop::collection::vec(line_strategy(), 1..5), 0..6)
    }

    proptest! {
        #[test]
        fn without_blank_lines_one_block(lines in prop::collection::vec(line_strategy(), 1..10)) {
            let text = lines.join("\n");
            let blocks = segment(&text);
            prop_assert_eq!(blocks.len(), 1);
            prop_assert_eq!(&blocks[0], &lines.iter().map(String::as_str).collect::<Vec<_>>());
        }

        #[test]
        fn join_then_segment_roundtrip(blocks in blocks_strategy()) {
            let text = blocks
                .iter()
                .map(|b| b.join("\n"))
                .collect::<Vec<_>>()
                .join("\n\n");
            let again = segment(&text);
            prop_assert_eq!(again.len(), blocks.len());
            for (got, want) in again.iter().zip(&blocks) {
                prop_assert_eq!(got, &want.iter().map(String::as_str).collect::<Vec<_>>());
            }
        }

        #[test]
        fn blocks_never_empty_or_blank(text in "[a-z \n]{0,60}") {
            for block in Blocks::new(&text) {
                prop_assert!(!block.is_empty());
                prop_assert!(block.lines().iter().all(|l| !is_blank(l)));
            }
        }
    }
}
