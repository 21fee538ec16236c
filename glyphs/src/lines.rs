//! Line splitting on `\n`, `\r\n` and bare `\r`.

/// Split `text` into lines. With `retain_endings` each line keeps its line
/// terminator; the last line may have none. Empty input yields no lines.
pub fn split_lines(text: &str, retain_endings: bool) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let ending = match bytes[i] {
            b'\n' => 1,
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => 2,
            b'\r' => 1,
            _ => {
                i += 1;
                continue;
            }
        };
        let end = if retain_endings { i + ending } else { i };
        lines.push(&text[start..end]);
        i += ending;
        start = i;
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_or_drops_endings() {
        let text = "a\nb\r\nc\rd";
        assert_eq!(split_lines(text, true), vec!["a\n", "b\r\n", "c\r", "d"]);
        assert_eq!(split_lines(text, false), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn blank_lines_survive() {
        assert_eq!(split_lines("x\n\n", true), vec!["x\n", "\n"]);
        assert_eq!(split_lines("\n\ny", false), vec!["", "", "y"]);
        assert!(split_lines("", true).is_empty());
    }
}
