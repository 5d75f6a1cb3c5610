//! Property tests for block segmentation.

use proptest::prelude::*;
use rust_cast::Script;

fn command_line() -> impl Strategy<Value = String> {
    "[ \t]{0,2}[a-z][a-z0-9 ./|$'\\\\-]{0,12}"
}

fn segment(text: &str) -> Vec<Vec<String>> {
    Script::new(text)
        .blocks()
        .map(|b| b.lines().iter().map(|l| (*l).to_string()).collect())
        .collect()
}

proptest! {
    #[test]
    fn single_block_without_blank_lines(lines in prop::collection::vec(command_line(), 1..8)) {
        let blocks = segment(&lines.join("\n"));
        prop_assert_eq!(blocks, vec![lines]);
    }

    #[test]
    fn block_count_matches_groups(
        groups in prop::collection::vec(prop::collection::vec(command_line(), 1..4), 0..6),
        gap in 1usize..4,
    ) {
        let separator = "\n".repeat(gap + 1);
        let text = groups
            .iter()
            .map(|g| g.join("\n"))
            .collect::<Vec<_>>()
            .join(&separator);

        let blocks = segment(&text);
        prop_assert_eq!(blocks.len(), groups.len());

        // Joining with single blank lines and segmenting again is stable.
        let rejoined = blocks
            .iter()
            .map(|b| b.join("\n"))
            .collect::<Vec<_>>()
            .join("\n\n");
        prop_assert_eq!(segment(&rejoined), blocks);
    }

    #[test]
    fn surrounding_blank_lines_ignored(
        lines in prop::collection::vec(command_line(), 1..5),
        before in 0usize..4,
        after in 0usize..4,
    ) {
        let text = format!("{}{}{}", "\n".repeat(before), lines.join("\n"), "\n".repeat(after));
        prop_assert_eq!(segment(&text), vec![lines]);
    }
}
