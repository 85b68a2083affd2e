// src/run/log_tail.rs

/// Last `max_lines` lines of `content`, in their original order.
///
/// - Content with at most `max_lines` lines is returned unchanged.
/// - A single trailing newline does not count as an extra (empty) line and
///   is preserved on the excerpt.
/// - `\r\n` endings are left intact on each line.
pub fn tail_lines(content: &str, max_lines: usize) -> String {
    if max_lines == 0 {
        return String::new();
    }

    let (body, trailing_newline) = match content.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (content, false),
    };

    let lines: Vec<&str> = body.split('\n').collect();
    if lines.len() <= max_lines {
        return content.to_string();
    }

    let mut excerpt = lines[lines.len() - max_lines..].join("\n");
    if trailing_newline {
        excerpt.push('\n');
    }
    excerpt
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_logs_are_returned_whole() {
        assert_eq!(tail_lines("", 10), "");
        assert_eq!(tail_lines("epoch 1\nepoch 2\n", 10), "epoch 1\nepoch 2\n");
        assert_eq!(tail_lines("a\nb\nc", 3), "a\nb\nc");
    }

    #[test]
    fn long_logs_keep_the_final_lines() {
        let log: String = (1..=15).map(|i| format!("line {i}\n")).collect();
        let expected: String = (6..=15).map(|i| format!("line {i}\n")).collect();
        assert_eq!(tail_lines(&log, 10), expected);
    }

    #[test]
    fn missing_trailing_newline_is_not_invented() {
        assert_eq!(tail_lines("a\nb\nc\nd", 2), "c\nd");
    }

    #[test]
    fn crlf_lines_survive() {
        assert_eq!(tail_lines("a\r\nb\r\nc\r\n", 2), "b\r\nc\r\n");
    }
}
