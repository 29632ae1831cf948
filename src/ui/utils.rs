use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Format a byte count for display (B / KB / MB, one decimal place).
pub(crate) fn format_bytes(n: Option<u64>) -> String {
    let n = match n {
        Some(n) => n,
        None => return String::new(),
    };
    if n < 1024 {
        format!("{} B", n)
    } else if n < 1024 * 1024 {
        format!("{:.1} KB", n as f64 / 1024.0)
    } else {
        format!("{:.1} MB", n as f64 / (1024.0 * 1024.0))
    }
}

/// Greedy word-wrap over byte ranges of `text`, so callers can overlay
/// styling (e.g. reference spans) onto the wrapped lines afterwards.
/// Width is measured in characters. Returns at least one range.
pub(crate) fn wrap_ranges(text: &str, max_width: usize) -> Vec<(usize, usize)> {
    if max_width == 0 {
        return vec![(0, text.len())];
    }
    let mut ranges = Vec::new();
    let mut line_start = 0usize;
    for line in text.split('\n') {
        let offset = line_start;
        let mut start = 0usize;
        let mut width = 0usize;
        let mut last_space: Option<usize> = None;
        for (idx, ch) in line.char_indices() {
            width += 1;
            if ch == ' ' {
                last_space = Some(idx);
            }
            if width > max_width {
                // Break at the last space on this visual line, or hard-break
                let break_at = match last_space {
                    Some(sp) if sp >= start => sp,
                    _ => idx,
                };
                ranges.push((offset + start, offset + break_at));
                start = if line.as_bytes().get(break_at) == Some(&b' ') {
                    break_at + 1
                } else {
                    break_at
                };
                width = line[start..idx + ch.len_utf8()].chars().count();
                last_space = None;
            }
        }
        ranges.push((offset + start, offset + line.len()));
        line_start += line.len() + 1;
    }
    if ranges.is_empty() {
        ranges.push((0, 0));
    }
    ranges
}

/// Calculate a centered rectangle within an area
pub(crate) fn centered_rect(width: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(r.height.saturating_sub(height) / 2),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(r.width.saturating_sub(width) / 2),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_bytes_picks_a_sensible_unit() {
        assert_eq!(format_bytes(Some(512)), "512 B");
        assert_eq!(format_bytes(Some(2048)), "2.0 KB");
        assert_eq!(format_bytes(Some(3 * 1024 * 1024)), "3.0 MB");
        assert_eq!(format_bytes(None), "");
    }

    #[test]
    fn short_line_is_a_single_range() {
        let ranges = wrap_ranges("hello world", 40);
        assert_eq!(ranges, vec![(0, 11)]);
    }

    #[test]
    fn long_line_breaks_at_spaces() {
        let text = "alpha beta gamma delta";
        let ranges = wrap_ranges(text, 11);
        let lines: Vec<&str> = ranges.iter().map(|(s, e)| &text[*s..*e]).collect();
        assert!(lines.iter().all(|l| l.chars().count() <= 11), "{:?}", lines);
        let rejoined = lines.join(" ").replace("  ", " ");
        assert_eq!(rejoined, text);
    }

    #[test]
    fn unbroken_text_is_hard_wrapped() {
        let text = "abcdefghij";
        let ranges = wrap_ranges(text, 4);
        let lines: Vec<&str> = ranges.iter().map(|(s, e)| &text[*s..*e]).collect();
        assert!(lines.iter().all(|l| l.chars().count() <= 4));
        assert_eq!(lines.concat(), text);
    }

    #[test]
    fn newlines_split_ranges() {
        let text = "one\ntwo";
        let ranges = wrap_ranges(text, 10);
        assert_eq!(ranges, vec![(0, 3), (4, 7)]);
    }

    #[test]
    fn empty_text_yields_one_empty_range() {
        assert_eq!(wrap_ranges("", 10), vec![(0, 0)]);
    }
}
