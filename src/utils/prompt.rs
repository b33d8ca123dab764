use crate::error::{ExtractError, Result};
use std::io::{BufRead, Write};

/// Line-oriented question/answer over any reader and writer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `question` and `hint`, read one line. End of input cancels the run.
    pub fn ask(&mut self, question: &str, hint: &str) -> Result<String> {
        writeln!(self.output, "{}", question)?;
        write!(self.output, "{} --> ", hint)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ExtractError::Cancelled);
        }
        Ok(line.trim().to_string())
    }

    /// Ask until the answer is non-empty
    pub fn ask_required(&mut self, question: &str, hint: &str) -> Result<String> {
        loop {
            let answer = self.ask(question, hint)?;
            if !answer.is_empty() {
                return Ok(answer);
            }
        }
    }

    pub fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_ask_reads_trimmed_line() -> Result<()> {
        let mut output = Vec::new();
        let mut prompter = Prompter::new(Cursor::new("  CA \n"), &mut output);

        let answer = prompter.ask("What state?", "Examples: CA, NY")?;
        assert_eq!(answer, "CA");

        let printed = String::from_utf8(output).unwrap();
        assert!(printed.contains("What state?"));
        assert!(printed.contains("Examples: CA, NY --> "));
        Ok(())
    }

    #[test]
    fn test_ask_required_skips_blank_lines() -> Result<()> {
        let mut prompter = Prompter::new(Cursor::new("\n\nCook County\n"), Vec::new());
        assert_eq!(prompter.ask_required("County?", "")?, "Cook County");
        Ok(())
    }

    #[test]
    fn test_end_of_input_cancels() {
        let mut prompter = Prompter::new(Cursor::new(""), Vec::new());
        assert!(matches!(
            prompter.ask("Year?", ""),
            Err(ExtractError::Cancelled)
        ));
    }
}
