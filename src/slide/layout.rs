//! Line wrapping and vertical fitting.

/// Line shown in place of text that does not fit on the slide.
pub const ELLIPSIS: &str = "...";

/// Greedily wrap `text` into lines no wider than `max_width`.
///
/// Each candidate is measured as `line + word + " "`. Words are never split,
/// so a single word wider than `max_width` gets a line of its own.
pub fn wrap_lines<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = format!("{}{} ", current, word);
        if measure(&candidate) <= max_width || current.is_empty() {
            current = candidate;
        } else {
            lines.push(current.trim_end().to_string());
            current = format!("{} ", word);
        }
    }

    if !current.trim().is_empty() {
        lines.push(current.trim_end().to_string());
    }

    lines
}

/// Keep at most `max_lines` lines, replacing the overflow with an ellipsis line.
pub fn fit_lines(mut lines: Vec<String>, max_lines: usize) -> Vec<String> {
    let max_lines = max_lines.max(1);
    if lines.len() <= max_lines {
        return lines;
    }
    lines.truncate(max_lines - 1);
    lines.push(ELLIPSIS.to_string());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    // Ten pixels per character.
    fn mono(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog";
        let lines = wrap_lines(text, 120.0, mono);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(mono(line) <= 120.0, "line too wide: {:?}", line);
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_long_word_gets_own_line() {
        let lines = wrap_lines("a supercalifragilistic b", 80.0, mono);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_wrap_empty() {
        assert!(wrap_lines("   ", 100.0, mono).is_empty());
    }

    #[test]
    fn test_fit_lines_adds_ellipsis() {
        let lines: Vec<String> = (0..5).map(|i| format!("line {}", i)).collect();
        let fitted = fit_lines(lines.clone(), 3);
        assert_eq!(fitted, vec!["line 0", "line 1", "..."]);
        assert_eq!(fit_lines(lines.clone(), 5), lines);
        assert_eq!(fit_lines(lines, 0), vec!["..."]);
    }
}
