use once_cell::sync::Lazy;
use regex::Regex;

/// A recognized file reference in assistant text.
/// `start`/`end` are half-open byte offsets, always on UTF-8 boundaries
/// since candidates come from literal substring search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub start: usize,
    pub end: usize,
    pub path: String,
}

/// One piece of the annotated text: either plain text or a reference span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Reference { text: &'a str, path: &'a str },
}

/// Explicit marker: "file:" then optional whitespace then a token running
/// up to the next whitespace, comma or semicolon.
static MARKER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)file:\s*([^\s,;]+)").unwrap());

/// Scan assistant text for file references.
///
/// Candidates come from two sources: every explicit `file:` marker (the
/// match covers the token only, at the token's exact offset), and the
/// first literal occurrence of each known path. Known paths are tried
/// longest-first so a nested path beats a short prefix occurring inside
/// it. Candidates are stable-sorted by start and swept left to right;
/// a candidate overlapping an already-kept one is dropped outright.
/// The result is non-overlapping and ascending by `start`.
pub fn annotate(text: &str, known_paths: &[String]) -> Vec<Match> {
    let mut candidates: Vec<Match> = Vec::new();

    for caps in MARKER_RE.captures_iter(text) {
        if let Some(token) = caps.get(1) {
            candidates.push(Match {
                start: token.start(),
                end: token.end(),
                path: token.as_str().to_string(),
            });
        }
    }

    let mut paths: Vec<&str> = known_paths
        .iter()
        .map(|p| p.as_str())
        .filter(|p| !p.is_empty())
        .collect();
    paths.sort_unstable_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
    paths.dedup();

    // Only the first occurrence of each known path is ever linked
    for path in paths {
        if let Some(idx) = text.find(path) {
            candidates.push(Match {
                start: idx,
                end: idx + path.len(),
                path: path.to_string(),
            });
        }
    }

    // Stable sort keeps marker candidates ahead of path candidates on ties
    candidates.sort_by_key(|m| m.start);

    let mut kept: Vec<Match> = Vec::new();
    for candidate in candidates {
        if kept.last().map_or(true, |prev| candidate.start >= prev.end) {
            kept.push(candidate);
        }
    }
    kept
}

/// Partition `text` into plain and reference spans for rendering.
/// `matches` must be the (sorted, non-overlapping) output of [`annotate`].
pub fn segments<'a>(text: &'a str, matches: &'a [Match]) -> Vec<Segment<'a>> {
    let mut out = Vec::new();
    let mut cursor = 0;
    for m in matches {
        if m.start > cursor {
            out.push(Segment::Text(&text[cursor..m.start]));
        }
        out.push(Segment::Reference {
            text: &text[m.start..m.end],
            path: &m.path,
        });
        cursor = m.end;
    }
    if cursor < text.len() {
        out.push(Segment::Text(&text[cursor..]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn assert_sorted_non_overlapping(matches: &[Match]) {
        for pair in matches.windows(2) {
            assert!(pair[0].start < pair[1].start, "not ascending: {:?}", pair);
            assert!(pair[0].end <= pair[1].start, "overlap: {:?}", pair);
        }
    }

    // ── Known-path matches ──

    #[test]
    fn single_known_path_yields_single_spanning_match() {
        let text = "The bug lives in src/a.py near the top.";
        let matches = annotate(text, &paths(&["src/a.py"]));
        assert_eq!(matches.len(), 1);
        assert_eq!(&text[matches[0].start..matches[0].end], "src/a.py");
        assert_eq!(matches[0].path, "src/a.py");
    }

    #[test]
    fn unknown_text_yields_no_matches() {
        let matches = annotate("Nothing to see here.", &paths(&["src/a.py"]));
        assert!(matches.is_empty());
    }

    #[test]
    fn no_known_paths_and_no_markers_yields_empty() {
        assert!(annotate("plain text", &[]).is_empty());
    }

    #[test]
    fn only_first_occurrence_of_a_path_is_linked() {
        let text = "src/a.py calls helper(); later src/a.py is reloaded";
        let matches = annotate(text, &paths(&["src/a.py"]));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, 0);
    }

    #[test]
    fn longer_path_wins_over_prefix_contained_within_it() {
        let text = "Look at a/b.py for the handler.";
        let matches = annotate(text, &paths(&["b.py", "a/b.py"]));
        // No overlapping shorter match for b.py inside a/b.py
        assert_sorted_non_overlapping(&matches);
        assert_eq!(matches[0].path, "a/b.py");
        assert!(!matches.iter().any(|m| m.path == "b.py" && m.start > matches[0].start && m.start < matches[0].end));
    }

    #[test]
    fn overlapped_first_occurrence_is_dropped_not_relocated() {
        // b.py first occurs inside a/b.py; that candidate is dropped and
        // the later standalone b.py mention stays plain text
        let text = "a/b.py imports b.py from the parent dir";
        let matches = annotate(text, &paths(&["a/b.py", "b.py"]));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, "a/b.py");
    }

    #[test]
    fn shorter_path_links_when_it_occurs_first_on_its_own() {
        let text = "b.py wraps a/b.py";
        let matches = annotate(text, &paths(&["a/b.py", "b.py"]));
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].path, "b.py");
        assert_eq!(matches[0].start, 0);
        assert_eq!(matches[1].path, "a/b.py");
        assert_sorted_non_overlapping(&matches);
    }

    #[test]
    fn duplicate_known_paths_do_not_produce_duplicate_matches() {
        let text = "see src/a.py";
        let matches = annotate(text, &paths(&["src/a.py", "src/a.py"]));
        assert_eq!(matches.len(), 1);
    }

    // ── Explicit markers ──

    #[test]
    fn marker_links_the_token_at_its_exact_offset() {
        let text = "See file: src/a.py for details";
        let matches = annotate(text, &paths(&["src/a.py"]));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, text.find("src/a.py").unwrap());
        assert_eq!(matches[0].end, matches[0].start + "src/a.py".len());
        assert_eq!(matches[0].path, "src/a.py");
    }

    #[test]
    fn marker_links_tokens_outside_the_known_set() {
        let text = "Check file: docs/setup.md first";
        let matches = annotate(text, &[]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, "docs/setup.md");
    }

    #[test]
    fn marker_is_case_insensitive() {
        let matches = annotate("File: a.py explains it", &[]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, "a.py");
    }

    #[test]
    fn marker_token_stops_at_comma_or_semicolon() {
        let matches = annotate("see file: a.py, then file: b.py; done", &[]);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].path, "a.py");
        assert_eq!(matches[1].path, "b.py");
    }

    #[test]
    fn marker_without_whitespace_still_matches() {
        let matches = annotate("in file:src/a.py today", &[]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, "src/a.py");
    }

    #[test]
    fn marker_repeats_link_every_occurrence() {
        let matches = annotate("file: a.py and again file: a.py", &[]);
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn marker_and_known_path_at_same_spot_collapse_to_one_match() {
        let text = "see file: src/a.py now";
        let matches = annotate(text, &paths(&["src/a.py"]));
        assert_eq!(matches.len(), 1);
    }

    // ── Merge behavior ──

    #[test]
    fn output_is_sorted_and_pairwise_non_overlapping() {
        let text = "file: x.py then src/a.py and b/c.rs plus file: y.go end";
        let matches = annotate(text, &paths(&["src/a.py", "b/c.rs", "c.rs"]));
        assert!(matches.len() >= 4);
        assert_sorted_non_overlapping(&matches);
    }

    #[test]
    fn overlapping_later_candidate_is_dropped_not_shortened() {
        // known path overlaps the tail of a marker token
        let text = "see file: src/a.py.bak today";
        let matches = annotate(text, &paths(&["a.py"]));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].path, "src/a.py.bak");
    }

    // ── Segments ──

    #[test]
    fn segments_partition_reconstructs_the_text() {
        let text = "Start src/a.py middle b.rs end";
        let known = paths(&["src/a.py", "b.rs"]);
        let matches = annotate(text, &known);
        let segs = segments(text, &matches);
        let rebuilt: String = segs
            .iter()
            .map(|s| match s {
                Segment::Text(t) => *t,
                Segment::Reference { text, .. } => *text,
            })
            .collect();
        assert_eq!(rebuilt, text);
        let refs: Vec<&str> = segs
            .iter()
            .filter_map(|s| match s {
                Segment::Reference { path, .. } => Some(*path),
                _ => None,
            })
            .collect();
        assert_eq!(refs, vec!["src/a.py", "b.rs"]);
    }

    #[test]
    fn segments_of_unannotated_text_is_one_plain_span() {
        let segs = segments("hello", &[]);
        assert_eq!(segs, vec![Segment::Text("hello")]);
    }

    #[test]
    fn segments_handle_match_at_start_and_end() {
        let text = "a.py then b.py";
        let matches = annotate(text, &paths(&["a.py", "b.py"]));
        let segs = segments(text, &matches);
        assert!(matches!(segs.first(), Some(Segment::Reference { .. })));
        assert!(matches!(segs.last(), Some(Segment::Reference { .. })));
    }
}
