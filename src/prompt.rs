use std::io::{BufRead, Write};

use anyhow::{Result, bail};

/// How a numbered menu treats input that is not a valid choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuPolicy {
    /// Take the first option and say so.
    Fallback,
    /// Ask again.
    Reprompt,
}

/// Line-oriented terminal dialogue over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    #[cfg(test)]
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn say(&mut self, line: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", line.as_ref())?;
        Ok(())
    }

    /// Print `label` without a newline and read one trimmed line. `None` on
    /// end of input.
    pub fn read(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    /// Like [`Prompter::read`] but end of input reads as an empty answer.
    pub fn ask(&mut self, label: &str) -> Result<String> {
        Ok(self.read(label)?.unwrap_or_default())
    }

    /// `y`/`yes` (any case) is yes, anything else is no.
    pub fn confirm(&mut self, label: &str) -> Result<bool> {
        let answer = self.ask(label)?.to_ascii_lowercase();
        Ok(answer == "y" || answer == "yes")
    }

    /// Show a 1-based numbered menu and return the 0-based index picked.
    /// `options` must not be empty.
    pub fn choose(
        &mut self,
        title: &str,
        options: &[String],
        fallback_note: &str,
        policy: MenuPolicy,
    ) -> Result<usize> {
        if options.is_empty() {
            bail!("nothing to choose from for {title}");
        }

        self.say(format!("\n{title}"))?;
        for (i, option) in options.iter().enumerate() {
            self.say(format!("  {}. {}", i + 1, option))?;
        }

        loop {
            let answer = self.read("Enter number: ")?;
            let choice = answer
                .as_deref()
                .and_then(|a| a.parse::<usize>().ok())
                .filter(|n| (1..=options.len()).contains(n));

            if let Some(n) = choice {
                return Ok(n - 1);
            }

            match policy {
                MenuPolicy::Fallback => {
                    self.say(fallback_note)?;
                    return Ok(0);
                }
                MenuPolicy::Reprompt if answer.is_none() => bail!("input closed before a choice was made"),
                MenuPolicy::Reprompt => {
                    self.say(format!("Invalid choice, enter 1-{}", options.len()))?;
                }
            }
        }
    }
}
