use once_cell::sync::Lazy;
use regex::Regex;

static THINK_BLOCK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)<think>.*?</think>").expect("think block pattern is valid")
});

/// Strip `<think>...</think>` reasoning blocks and surrounding whitespace.
///
/// Removal repeats until no block is left, so a block that only forms once
/// an inner one is cut out is removed as well.
pub fn clean_output(text: &str) -> String {
    let mut current = text.to_string();
    while THINK_BLOCK.is_match(&current) {
        current = THINK_BLOCK.replace_all(&current, "").into_owned();
    }
    current.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_inline_block() {
        assert_eq!(clean_output("A<think>secret</think>B"), "AB");
    }

    #[test]
    fn test_removes_multiline_blocks_non_greedy() {
        let text = "<think>\nplan\nmore plan\n</think>\n# Title\nbody <think>x</think>end";
        assert_eq!(clean_output(text), "# Title\nbody end");
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(clean_output("  \n# Post\n\n"), "# Post");
    }

    #[test]
    fn test_unclosed_marker_is_left_alone() {
        assert_eq!(clean_output("keep <think> this"), "keep <think> this");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "A<think>secret</think>B",
            "<thi<think>x</think>nk>y</think>z",
            "  plain text  ",
            "<think></think>",
            "",
            "a <think>one</think> b <think>two\nlines</think> c",
        ];
        for input in inputs {
            let once = clean_output(input);
            assert_eq!(clean_output(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn test_nested_exposure_is_removed() {
        assert_eq!(clean_output("<thi<think>x</think>nk>y</think>z"), "z");
    }
}
