//! Console adapter for [`OperatorPrompt`].
//!
//! Asks for one value on stdout and reads the answer from stdin:
//!
//! ```text
//!   Name: Bob
//!   Email: bob@example.com
//! ```

use async_trait::async_trait;
use colored::Colorize;
use dbassist_application::{OperatorPrompt, OperatorPromptError};
use std::io::{self, BufRead, Write};

/// Reads operator answers from the terminal.
pub struct ConsoleOperatorPrompt;

impl ConsoleOperatorPrompt {
    pub fn new() -> Self {
        Self
    }

    /// Print the label and read one trimmed line from `input`.
    fn read_answer(
        label: &str,
        input: &mut impl BufRead,
        output: &mut impl Write,
    ) -> Result<String, OperatorPromptError> {
        write!(output, "  {} ", format!("{}:", label).magenta().bold())
            .and_then(|_| output.flush())
            .map_err(|e| OperatorPromptError::IoError(format!("Failed to flush stdout: {}", e)))?;

        let mut answer = String::new();
        let read = input
            .read_line(&mut answer)
            .map_err(|e| OperatorPromptError::IoError(format!("Failed to read input: {}", e)))?;

        let answer = answer.trim();
        if read == 0 || answer.is_empty() {
            return Err(OperatorPromptError::Cancelled);
        }
        Ok(answer.to_string())
    }
}

impl Default for ConsoleOperatorPrompt {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OperatorPrompt for ConsoleOperatorPrompt {
    async fn ask(&self, label: &str) -> Result<String, OperatorPromptError> {
        let label = label.to_string();
        tokio::task::spawn_blocking(move || {
            Self::read_answer(&label, &mut io::stdin().lock(), &mut io::stdout())
        })
        .await
        .map_err(|e| OperatorPromptError::IoError(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_trimmed_answer() {
        colored::control::set_override(false);
        let mut output = Vec::new();
        let answer =
            ConsoleOperatorPrompt::read_answer("Name", &mut Cursor::new("  Bob \n"), &mut output)
                .unwrap();

        assert_eq!(answer, "Bob");
        assert_eq!(String::from_utf8(output).unwrap(), "  Name: ");
    }

    #[test]
    fn test_empty_answer_cancels() {
        let mut output = Vec::new();
        let err = ConsoleOperatorPrompt::read_answer("Email", &mut Cursor::new("\n"), &mut output)
            .unwrap_err();
        assert_eq!(err, OperatorPromptError::Cancelled);
    }

    #[test]
    fn test_end_of_input_cancels() {
        let mut output = Vec::new();
        let err = ConsoleOperatorPrompt::read_answer("Email", &mut Cursor::new(""), &mut output)
            .unwrap_err();
        assert_eq!(err, OperatorPromptError::Cancelled);
    }
}
