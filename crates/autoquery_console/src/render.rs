//! Plain-text rendering of transcript turns.

use autoquery_chat::{Segment, Sender, Transcript, Turn};

const USER_PREFIX: &str = "You: ";
const AGENT_PREFIX: &str = "Agent: ";
const TRACE_PREFIX: &str = "· ";

/// Renders one turn, without a trailing newline.
///
/// Code segments are re-fenced so queries stay copy-pasteable; trace
/// segments are shown line by line only when `show_trace` is set.
pub fn render_turn(turn: &Turn, show_trace: bool) -> String {
    let prefix = match turn.sender {
        Sender::User => USER_PREFIX,
        Sender::Agent => AGENT_PREFIX,
    };

    let mut body = String::new();
    for segment in &turn.segments {
        match segment {
            Segment::Plain(text) => body.push_str(text),
            Segment::Status(trace) => {
                if show_trace {
                    for line in trace.lines() {
                        body.push_str(TRACE_PREFIX);
                        body.push_str(line);
                        body.push('\n');
                    }
                }
            }
            Segment::Code { language, content } => {
                if !body.is_empty() && !body.ends_with('\n') {
                    body.push('\n');
                }
                body.push_str("```");
                body.push_str(language);
                body.push('\n');
                body.push_str(content);
                body.push_str("\n```\n");
            }
        }
    }

    format!("{prefix}{}", body.trim_end_matches('\n'))
}

/// Renders every turn from `start` onward, one per line block.
pub fn render_turns_from(transcript: &Transcript, start: usize, show_trace: bool) -> String {
    transcript.all()[start.min(transcript.len())..]
        .iter()
        .map(|turn| render_turn(turn, show_trace))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_error(message: &str) -> String {
    format!("Error: {message}")
}
