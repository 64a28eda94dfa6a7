//! Decomposition of raw agent replies into displayable segments.
//!
//! The backend answers with a single prose string that may embed a
//! status/trace preamble (`Status: ... Final Answer: ...`) and fenced code
//! regions (triple backticks with an optional language tag). Decomposition is
//! total: malformed or partial markup degrades to plain text instead of
//! failing, because dropping agent output is worse than mis-tagging it.

const FENCE: &str = "```";
const DEFAULT_LANGUAGE: &str = "text";

/// One typed unit of displayable content within a turn. Segment order is
/// display order and mirrors the order the content appeared in the raw reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Plain(String),
    /// Intermediate reasoning or tool trace reported by the agent.
    Status(String),
    Code {
        language: String,
        content: String,
    },
}

/// Literal header pair that brackets an inline status/trace preamble.
///
/// The exact strings are an external contract with the agent prompt, so they
/// are carried as configuration rather than hard-coded in the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceMarkers {
    pub status_header: String,
    pub answer_header: String,
}

impl Default for TraceMarkers {
    fn default() -> Self {
        Self {
            status_header: "Status:".to_string(),
            answer_header: "Final Answer:".to_string(),
        }
    }
}

/// Decomposes a raw agent reply using the default [`TraceMarkers`].
#[must_use]
pub fn decompose(raw: &str) -> Vec<Segment> {
    decompose_with_markers(raw, &TraceMarkers::default())
}

/// Decomposes a raw agent reply into ordered segments.
///
/// A recognized marker pair yields a leading [`Segment::Status`] followed by
/// the decomposed remainder. Within the remainder, each fenced region becomes
/// a [`Segment::Code`] and the surrounding prose becomes [`Segment::Plain`].
/// The result is never empty: blank input yields a single empty plain segment
/// so a turn always has something to render.
#[must_use]
pub fn decompose_with_markers(raw: &str, markers: &TraceMarkers) -> Vec<Segment> {
    let mut segments = Vec::new();

    let remainder = match split_trace(raw, markers) {
        Some((status, remainder)) => {
            if !status.is_empty() {
                segments.push(Segment::Status(status.to_string()));
            }
            remainder
        }
        None => raw,
    };

    scan_fences(remainder, &mut segments);

    if segments.is_empty() {
        segments.push(Segment::Plain(String::new()));
    }

    segments
}

/// Splits `raw` into trimmed status content and the post-answer remainder.
///
/// The status header must be the first non-whitespace text and the answer
/// header must appear after it; otherwise the reply is treated as having no
/// inline trace at all.
fn split_trace<'a>(raw: &'a str, markers: &TraceMarkers) -> Option<(&'a str, &'a str)> {
    if markers.status_header.is_empty() || markers.answer_header.is_empty() {
        return None;
    }

    let lead = raw.trim_start();
    let after_status = lead.strip_prefix(markers.status_header.as_str())?;
    let answer_at = after_status.find(markers.answer_header.as_str())?;

    let status = after_status[..answer_at].trim();
    let remainder = after_status[answer_at + markers.answer_header.len()..].trim_start();

    Some((status, remainder))
}

fn scan_fences(remainder: &str, segments: &mut Vec<Segment>) {
    let mut rest = remainder;

    while let Some(open) = rest.find(FENCE) {
        if open > 0 {
            segments.push(Segment::Plain(rest[..open].to_string()));
        }

        let tail = &rest[open + FENCE.len()..];
        match tail.find(FENCE) {
            Some(close) => {
                segments.push(fenced_segment(&tail[..close], true));
                rest = &tail[close + FENCE.len()..];
            }
            None => {
                // Unterminated fence: keep opener-to-end as code rather than
                // discarding it.
                segments.push(fenced_segment(tail, false));
                return;
            }
        }
    }

    if !rest.is_empty() {
        segments.push(Segment::Plain(rest.to_string()));
    }
}

/// Interprets the text between an opener and its closer (or end of input).
///
/// The opener line up to the first newline is the info string; its first
/// whitespace-separated token is the language tag. A terminated fence gives
/// up one trailing newline to the closer line.
fn fenced_segment(region: &str, terminated: bool) -> Segment {
    let (info, body) = match region.find('\n') {
        Some(newline) => (&region[..newline], Some(&region[newline + 1..])),
        None => (region, None),
    };

    let language = info
        .split_whitespace()
        .next()
        .unwrap_or(DEFAULT_LANGUAGE)
        .to_string();

    let content = match body {
        Some(body) if terminated => body.strip_suffix('\n').unwrap_or(body),
        Some(body) => body,
        None => "",
    };

    Segment::Code {
        language,
        content: content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> Segment {
        Segment::Plain(text.to_string())
    }

    fn code(language: &str, content: &str) -> Segment {
        Segment::Code {
            language: language.to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn plain_reply_is_a_single_segment() {
        assert_eq!(
            decompose("The Fiesta was the best seller in 2018."),
            vec![plain("The Fiesta was the best seller in 2018.")]
        );
    }

    #[test]
    fn empty_reply_yields_one_empty_plain_segment() {
        assert_eq!(decompose(""), vec![plain("")]);
    }

    #[test]
    fn tagged_fence_splits_surrounding_prose() {
        let raw = "Here: ```sql\nSELECT * FROM cars\n``` done";

        assert_eq!(
            decompose(raw),
            vec![
                plain("Here: "),
                code("sql", "SELECT * FROM cars"),
                plain(" done"),
            ]
        );
    }

    #[test]
    fn untagged_fence_defaults_to_text_language() {
        let raw = "```\nplain block\n```";

        assert_eq!(decompose(raw), vec![code("text", "plain block")]);
    }

    #[test]
    fn fence_info_string_keeps_only_first_token_as_language() {
        let raw = "```sql title=query\nSELECT 1;\n```";

        assert_eq!(decompose(raw), vec![code("sql", "SELECT 1;")]);
    }

    #[test]
    fn multiple_fences_scan_left_to_right() {
        let raw = "a```sql\nSELECT 1;\n```b```python\nprint(1)\n```c";

        assert_eq!(
            decompose(raw),
            vec![
                plain("a"),
                code("sql", "SELECT 1;"),
                plain("b"),
                code("python", "print(1)"),
                plain("c"),
            ]
        );
    }

    #[test]
    fn unterminated_fence_keeps_content_to_end() {
        let raw = "look ```sql\nSELECT Maker FROM price_table\n";

        assert_eq!(
            decompose(raw),
            vec![plain("look "), code("sql", "SELECT Maker FROM price_table\n")]
        );
    }

    #[test]
    fn unterminated_opener_without_body_keeps_language_tag() {
        assert_eq!(decompose("see ```sql"), vec![plain("see "), code("sql", "")]);
    }

    #[test]
    fn trace_preamble_becomes_status_segment() {
        let raw = "Status: Tool Used: sql_query Final Answer: The Golf sold most.";

        assert_eq!(
            decompose(raw),
            vec![
                Segment::Status("Tool Used: sql_query".to_string()),
                plain("The Golf sold most."),
            ]
        );
    }

    #[test]
    fn trace_preamble_tolerates_leading_whitespace_and_blank_status() {
        assert_eq!(
            decompose("  Status: Final Answer: done"),
            vec![plain("done")]
        );
    }

    #[test]
    fn status_header_in_mid_reply_is_plain_text() {
        let raw = "The report said Status: pending yesterday. Final Answer: none";

        assert_eq!(decompose(raw), vec![plain(raw)]);
    }

    #[test]
    fn status_without_answer_header_is_plain_text() {
        let raw = "Status: still thinking about it";

        assert_eq!(decompose(raw), vec![plain(raw)]);
    }

    #[test]
    fn trace_remainder_still_scans_fences() {
        let raw = "Status: ran a query Final Answer: totals: ```sql\nSELECT COUNT(*) FROM sales_table\n```";

        assert_eq!(
            decompose(raw),
            vec![
                Segment::Status("ran a query".to_string()),
                plain("totals: "),
                code("sql", "SELECT COUNT(*) FROM sales_table"),
            ]
        );
    }

    #[test]
    fn custom_markers_override_defaults() {
        let markers = TraceMarkers {
            status_header: "Thought:".to_string(),
            answer_header: "Answer:".to_string(),
        };

        assert_eq!(
            decompose_with_markers("Thought: checking Answer: 42", &markers),
            vec![Segment::Status("checking".to_string()), plain("42")]
        );
    }

    #[test]
    fn segment_contents_reproduce_raw_text_modulo_fence_syntax() {
        let raw = "Here: ```sql\nSELECT * FROM cars\n``` done";
        let reconstructed: String = decompose(raw)
            .iter()
            .map(|segment| match segment {
                Segment::Plain(text) | Segment::Status(text) => text.as_str(),
                Segment::Code { content, .. } => content.as_str(),
            })
            .collect();

        assert_eq!(reconstructed, "Here: SELECT * FROM cars done");
    }
}
