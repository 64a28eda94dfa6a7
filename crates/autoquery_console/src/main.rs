use std::io::{self, BufRead, Write};

use autoquery_chat::{
    ChatSessionController, SessionConfig, SessionError, DEFAULT_WELCOME_MESSAGE,
};
use autoquery_console::commands::{parse_slash_command, SlashCommand};
use autoquery_console::render::{render_error, render_turns_from};
use autoquery_console::transports;

const HELP_TEXT: &str = "Commands: /help, /trace, /quit (or 'exit')";

fn main() -> io::Result<()> {
    let transport = transports::transport_from_env().map_err(io::Error::other)?;
    let profile = transport.profile();

    let controller = ChatSessionController::new(
        transport,
        SessionConfig::new().with_welcome_message(DEFAULT_WELCOME_MESSAGE),
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stdin = io::stdin();
    let mut input = stdin.lock();

    writeln!(out, "AutoQuery AI console ({})", profile.display_name)?;
    writeln!(out, "{HELP_TEXT}")?;

    let mut show_trace = false;
    let mut printed = flush_transcript(&mut out, &controller, 0, show_trace)?;

    let mut line = String::new();
    loop {
        write!(out, "You: ")?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("exit") {
            break;
        }

        if let Some(command) = parse_slash_command(message) {
            match command {
                SlashCommand::Help => writeln!(out, "{HELP_TEXT}")?,
                SlashCommand::Trace => {
                    show_trace = !show_trace;
                    let visibility = if show_trace { "shown" } else { "hidden" };
                    writeln!(out, "Tool traces {visibility}.")?;
                }
                SlashCommand::Quit => break,
                SlashCommand::Unknown(command) => writeln!(out, "Unknown command: {command}")?,
            }

            continue;
        }

        match controller.send(message) {
            Ok(Some(_)) => {
                // The prompt line already shows the user's text; skip its turn
                // when flushing so it is not echoed twice.
                printed += 1;
                controller.wait_until_settled();
                printed = flush_transcript(&mut out, &controller, printed, show_trace)?;

                if let Some(error_text) = controller.ui_state().error_text {
                    writeln!(out, "{}", render_error(&error_text))?;
                }
            }
            Ok(None) => {}
            Err(SessionError::Busy) => {
                writeln!(out, "Still waiting on the previous message.")?;
            }
            Err(error) => writeln!(out, "{}", render_error(&error.to_string()))?,
        }
    }

    Ok(())
}

fn flush_transcript(
    out: &mut impl Write,
    controller: &ChatSessionController,
    printed: usize,
    show_trace: bool,
) -> io::Result<usize> {
    let (rendered, len) = controller.with_transcript(|transcript| {
        (
            render_turns_from(transcript, printed, show_trace),
            transcript.len(),
        )
    });

    if !rendered.is_empty() {
        writeln!(out, "{rendered}")?;
    }

    Ok(len)
}
