use std::io::{stdin, stdout, Write};

use anyhow::Context;
use engine::{Engine, SessionContext};

pub struct Repl {
    engine: Engine,
    session: SessionContext,
}

#[derive(Debug, PartialEq)]
pub enum Result {
    Exit,
    Help,
    NoInput,
    UnrecognisedInput,
    Ok(String),
}

const HELP: &str = "\
Commands end with ';'. For example:
  CREATE DATABASE markbook;
  USE markbook;
  CREATE TABLE marks (name, mark);
  INSERT INTO marks VALUES ('Alice', 90);
  SELECT * FROM marks WHERE mark > 50;
Meta commands: .help, .exit";

impl Repl {
    pub fn new(engine: Engine) -> Self {
        Repl {
            engine,
            session: SessionContext::new(),
        }
    }

    pub fn run(&mut self) {
        loop {
            Repl::print_prompt();

            let mut buf = String::new();
            match stdin().read_line(&mut buf) {
                // EOF
                Ok(0) => break,
                Ok(_) => match self.handle_repl_command(&buf) {
                    Result::Ok(response) => println!("{}", pretty(&response)),
                    Result::Help => println!("{HELP}"),
                    Result::UnrecognisedInput => println!("Error! Command not recognised."),
                    Result::Exit => {
                        println!("Goodbye.");
                        break;
                    }
                    Result::NoInput => continue,
                },
                Err(err) => {
                    eprintln!("{err}");
                    break;
                }
            }
        }
    }

    /// Run one command and print the raw response.
    pub fn eval_command(&mut self, input: &str) {
        println!("{}", self.execute(input));
    }

    /// Run every non-empty line of a script as its own command.
    pub fn eval_file(&mut self, file: &str) -> anyhow::Result<()> {
        let contents =
            std::fs::read_to_string(file).with_context(|| format!("Failed to open {file}"))?;

        for line in contents.lines().filter(|l| !l.trim().is_empty()) {
            println!("{}", self.execute(line));
        }

        Ok(())
    }

    fn execute(&mut self, input: &str) -> String {
        let session = std::mem::take(&mut self.session);
        let (response, session) = self.engine.execute(input, session);
        self.session = session;

        response
    }

    /// Handle user input via REPL. This will either eval a command or
    /// short-circuit for a meta command.
    fn handle_repl_command(&mut self, buf: &str) -> Result {
        let fmt_buf = buf.trim();

        if fmt_buf.is_empty() {
            Result::NoInput
        } else if Repl::is_meta_command(fmt_buf) {
            Repl::handle_meta_command(fmt_buf)
        } else {
            Result::Ok(self.execute(fmt_buf))
        }
    }

    fn is_meta_command(buf: &str) -> bool {
        buf.starts_with('.')
    }

    fn handle_meta_command(buf: &str) -> Result {
        match buf.to_lowercase().as_ref() {
            ".exit" | ".quit" | ".close" => Result::Exit,
            ".help" | ".h" | ".?" => Result::Help,
            _ => Result::UnrecognisedInput,
        }
    }

    fn print_prompt() {
        print!("> ");
        // A prompt that fails to flush is not worth stopping for
        let _ = stdout().flush();
    }
}

/// Draw a result set as a table; status-only responses pass through.
fn pretty(response: &str) -> String {
    let mut lines = response.lines();
    let status = lines.next().unwrap_or_default();

    let mut builder = tabled::builder::Builder::default();
    let mut has_rows = false;
    for line in lines {
        builder.push_record(line.split('\t'));
        has_rows = true;
    }

    if has_rows {
        format!("{status}\n{}", builder.build())
    } else {
        status.to_string()
    }
}

#[cfg(test)]
mod repl_tests {
    use super::*;

    #[test]
    fn test_meta_commands() {
        assert_eq!(Repl::handle_meta_command(".EXIT"), Result::Exit);
        assert_eq!(Repl::handle_meta_command(".help"), Result::Help);
        assert_eq!(Repl::handle_meta_command(".dance"), Result::UnrecognisedInput);
    }

    #[test]
    fn test_pretty_passes_status_through() {
        assert_eq!(pretty("[OK]"), "[OK]");
        assert_eq!(
            pretty("[ERROR] TableNotFound: t"),
            "[ERROR] TableNotFound: t"
        );
    }

    #[test]
    fn test_pretty_draws_rows() {
        let drawn = pretty("[OK]\nid\tname\n1\tAlice");

        assert!(drawn.starts_with("[OK]\n"));
        assert!(drawn.contains("Alice"));
        assert!(drawn.contains("name"));
    }
}
