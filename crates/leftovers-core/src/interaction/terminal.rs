use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::sync::Mutex;

use tracing::warn;

use super::traits::{Advisor, Prompter};

/// Check if user confirmation input indicates acceptance.
/// Accepts "y" or "yes" (case-insensitive).
pub fn is_confirmation_accepted(input: &str) -> bool {
    let normalized = input.trim().to_lowercase();
    normalized == "y" || normalized == "yes"
}

/// Line-oriented prompter over any reader/writer pair.
pub struct TerminalPrompter<R, W> {
    io: Mutex<(R, W)>,
}

impl<R, W> TerminalPrompter<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            io: Mutex::new((reader, writer)),
        }
    }

    fn ask(&self, resource_type: &str, resource_name: &str) -> io::Result<bool> {
        let mut guard = self
            .io
            .lock()
            .map_err(|_| io::Error::other("prompt lock poisoned"))?;
        let (reader, writer) = &mut *guard;

        write!(
            writer,
            "Are you sure you want to delete {} {}? [y/N] ",
            resource_type, resource_name
        )?;
        writer.flush()?;

        let mut input = String::new();
        if reader.read_line(&mut input)? == 0 {
            return Ok(false);
        }

        Ok(is_confirmation_accepted(&input))
    }
}

impl TerminalPrompter<BufReader<Stdin>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R, W> Prompter for TerminalPrompter<R, W>
where
    R: BufRead + Send,
    W: Write + Send,
{
    fn prompt_with_details(&self, resource_type: &str, resource_name: &str) -> bool {
        match self.ask(resource_type, resource_name) {
            Ok(answer) => answer,
            Err(e) => {
                warn!(
                    event = "core.interaction.prompt_failed",
                    resource_type = resource_type,
                    resource = resource_name,
                    error = %e
                );
                false
            }
        }
    }
}

/// Writes advisory messages to stderr, keeping stdout for the report.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalAdvisor;

impl Advisor for TerminalAdvisor {
    fn advise(&self, message: &str) {
        eprintln!("{}", message);
    }
}
