//! Console driver: reads lines, hands them to the chat session, prints results

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use parley_agent::{parse_input, ChatError, ChatSession, Input, Outcome, HELP_TEXT};
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::{debug, info};

pub struct Repl<R, W> {
    input: R,
    output: W,
    spinner: bool,
}

impl<R: BufRead, W: Write> Repl<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            spinner: false,
        }
    }

    /// Show a progress spinner while waiting for a reply
    pub fn with_spinner(mut self, enabled: bool) -> Self {
        self.spinner = enabled;
        self
    }

    /// Run until `/quit` or end of input. Errors from the chat session are
    /// printed and the loop continues; only console I/O errors end it early.
    pub async fn run(&mut self, chat: &mut ChatSession) -> io::Result<()> {
        writeln!(
            self.output,
            "{}",
            style("Welcome to the CLI Chatbot! (Type '/quit' to exit, '/help' for commands)")
                .bold()
                .cyan()
        )?;
        writeln!(self.output, "{}", "-".repeat(50))?;
        info!(model = %chat.settings().model, "Chat loop started");

        loop {
            write!(self.output, "\n{} ", style("You:").bold().green())?;
            self.output.flush()?;

            // Invalid UTF-8 on the console is replaced rather than ending the loop
            let mut raw = Vec::new();
            if self.input.read_until(b'\n', &mut raw)? == 0 {
                debug!("End of input");
                writeln!(self.output, "\nGoodbye!")?;
                break;
            }
            let line = String::from_utf8_lossy(&raw);

            let waiting = self.spinner && matches!(parse_input(&line), Ok(Input::Message(_)));
            let progress = waiting.then(thinking_spinner);
            let result = chat.handle_line(&line).await;
            if let Some(progress) = progress {
                progress.finish_and_clear();
            }

            match result {
                Ok(Outcome::Quit) => {
                    writeln!(self.output, "\nGoodbye!")?;
                    break;
                }
                Ok(outcome) => self.render(outcome)?,
                Err(e) => self.render_error(&e)?,
            }
        }

        info!("Chat loop stopped");
        Ok(())
    }

    fn render(&mut self, outcome: Outcome) -> io::Result<()> {
        match outcome {
            Outcome::Ignored | Outcome::Quit => {}
            Outcome::Reply(text) => {
                writeln!(self.output, "\n{} {}", style("Assistant:").bold().blue(), text)?;
            }
            Outcome::Saved(path) => {
                writeln!(self.output, "Conversation saved to {}", path.display())?;
            }
            Outcome::Loaded { path, turns } => {
                writeln!(
                    self.output,
                    "Loaded {} messages from {}",
                    turns,
                    path.display()
                )?;
            }
            Outcome::Cleared => writeln!(self.output, "Conversation cleared.")?,
            Outcome::Tokens(count) => {
                writeln!(
                    self.output,
                    "Approximate token count: {} (word count, not a real tokenizer)",
                    count
                )?;
            }
            Outcome::Transcripts(transcripts) => {
                if transcripts.is_empty() {
                    writeln!(self.output, "No saved conversations.")?;
                }
                for transcript in transcripts {
                    let modified = transcript
                        .modified
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_default();
                    writeln!(self.output, "  {}  {}", transcript.name, style(modified).dim())?;
                }
            }
            Outcome::Help => writeln!(self.output, "{}", HELP_TEXT)?,
        }
        Ok(())
    }

    fn render_error(&mut self, error: &ChatError) -> io::Result<()> {
        match error {
            ChatError::Usage(message) => writeln!(self.output, "{}", style(message).yellow()),
            ChatError::NotFound(_) => writeln!(self.output, "{}", style(error).yellow()),
            ChatError::Service(_) => {
                writeln!(self.output, "\n{} {}", style("Error:").bold().red(), error)?;
                writeln!(self.output, "Please try again.")
            }
            ChatError::Malformed { .. } | ChatError::Storage(_) => {
                writeln!(self.output, "{} {}", style("Error:").bold().red(), error)
            }
        }
    }
}

fn thinking_spinner() -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::with_template("{spinner} {msg}") {
        progress.set_style(spinner_style);
    }
    progress.set_message("Thinking...");
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
