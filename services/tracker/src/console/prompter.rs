//! services/tracker/src/console/prompter.rs
//!
//! Line-oriented prompting over any reader/writer pair. Field prompts loop on the
//! core resolver until the answer validates.

use crate::error::TrackerError;
use health_journal_core::domain::{FieldValue, MetricKindDescriptor};
use health_journal_core::resolver::resolve;
use std::fmt::Display;
use std::io::{BufRead, Write};

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Gives back the output sink, e.g. to inspect what a scripted session printed.
    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, text: impl Display) -> Result<(), TrackerError> {
        writeln!(self.output, "{}", text)?;
        Ok(())
    }

    /// Prints `prompt` and reads one line without its line ending.
    pub fn ask(&mut self, prompt: &str) -> Result<String, TrackerError> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(TrackerError::InputClosed);
        }
        let trimmed = line.trim_end_matches(|c: char| c == '\n' || c == '\r').len();
        line.truncate(trimmed);
        Ok(line)
    }

    /// Asks for a value of `descriptor` until the answer resolves.
    /// The bracketed hint is whatever a blank answer would resolve to.
    pub fn field(
        &mut self,
        label: &str,
        descriptor: &MetricKindDescriptor,
        previous: Option<FieldValue>,
        default: Option<FieldValue>,
    ) -> Result<FieldValue, TrackerError> {
        let prompt = match resolve(descriptor, previous, None, default) {
            Ok(fallback) => format!("{} [{}]: ", label, fallback),
            Err(_) => format!("{}: ", label),
        };
        loop {
            let answer = self.ask(&prompt)?;
            match resolve(descriptor, previous, Some(answer.as_str()), default) {
                Ok(value) => return Ok(value),
                Err(e) => self.say(e)?,
            }
        }
    }

    pub fn yes_no(&mut self, question: &str, default: Option<bool>) -> Result<bool, TrackerError> {
        let label = format!("{} (y/n)", question);
        let default = default.map(FieldValue::Flag);
        match self.field(&label, &MetricKindDescriptor::Boolean, None, default)? {
            FieldValue::Flag(answer) => Ok(answer),
            other => Err(TrackerError::Internal(format!("expected yes/no, resolved {:?}", other))),
        }
    }

    /// Reads lines until an empty one. An empty first line yields no lines.
    pub fn multiline(&mut self) -> Result<Vec<String>, TrackerError> {
        let mut lines = Vec::new();
        loop {
            let line = self.ask("")?;
            if line.trim().is_empty() {
                return Ok(lines);
            }
            lines.push(line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompter(script: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn field_reprompts_until_valid() {
        let mut p = prompter("11\nseven\n7\n");
        let pain = MetricKindDescriptor::Scale { min: 0, max: 10 };
        let value = p.field("Pain", &pain, None, Some(FieldValue::Level(0))).unwrap();
        assert_eq!(value, FieldValue::Level(7));

        let printed = String::from_utf8(p.into_output()).unwrap();
        assert!(printed.contains("Pain [0]: "));
        assert!(printed.contains("Value must be between 0 and 10"));
        assert!(printed.contains("Please enter a whole number"));
    }

    #[test]
    fn blank_answer_takes_the_hint() {
        let mut p = prompter("\r\n");
        let exercise = MetricKindDescriptor::Counted { repeats: 10, sets: 1 };
        let previous = Some(FieldValue::Counted { repeats: 4, sets: 2 });
        assert_eq!(
            p.field("Plank", &exercise, previous, None).unwrap(),
            FieldValue::Counted { repeats: 4, sets: 2 }
        );
        let printed = String::from_utf8(p.into_output()).unwrap();
        assert!(printed.contains("Plank [4 2]: "));
    }

    #[test]
    fn required_answer_has_no_hint() {
        let mut p = prompter("\nyes\n");
        assert!(p.yes_no("Meditation", None).unwrap());
        let printed = String::from_utf8(p.into_output()).unwrap();
        assert!(printed.starts_with("Meditation (y/n): "));
        assert!(printed.contains("A value is required"));
    }

    #[test]
    fn end_of_input_is_reported() {
        let mut p = prompter("");
        assert!(matches!(p.ask("> "), Err(TrackerError::InputClosed)));
    }

    #[test]
    fn multiline_stops_at_the_first_empty_line() {
        let mut p = prompter("first\nsecond\n\nleftover\n");
        assert_eq!(p.multiline().unwrap(), vec!["first", "second"]);
        assert_eq!(p.ask("").unwrap(), "leftover");

        let mut p = prompter("\n");
        assert!(p.multiline().unwrap().is_empty());
    }
}
