use std::fmt;
use std::path::{Path, PathBuf};

use cli_common::Result;
use lexer::Lexer;
use parser::ast::Command;
use parser::Parser;

use crate::sequence::SequenceRegistry;
use crate::session::SessionContext;
use crate::{util, vm};

pub const OK_STATUS: &str = "[OK]";
pub const ERROR_STATUS: &str = "[ERROR]";

/// Runs commands against the databases under one data root. Holds no state
/// between commands beyond where that root is; the caller owns the session.
pub struct Engine {
    root: PathBuf,
    sequences: SequenceRegistry,
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct StatementResult {
    pub result_set: Option<ResultSet>,
}

impl StatementResult {
    pub fn with_rows(result_set: ResultSet) -> Self {
        StatementResult {
            result_set: Some(result_set),
        }
    }
}

/// Rows handed back to the client by SELECT and JOIN.
#[derive(Debug, PartialEq, Clone, Default)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.columns.join("\t"))?;

        for row in &self.rows {
            write!(f, "\n{}", row.join("\t"))?;
        }

        Ok(())
    }
}

impl Engine {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let sequences = SequenceRegistry::new(&root);

        Engine { root, sequences }
    }

    /// Make sure the data root exists.
    pub fn init(&self) -> Result<()> {
        util::ensure_dir_exists(&self.root)?;
        log::info!("Data directory: {}", self.root.display());

        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The single outer boundary: one line of text in, one response out.
    /// The session comes back updated on success and untouched on failure.
    pub fn execute(&self, input: &str, session: SessionContext) -> (String, SessionContext) {
        let mut updated = session.clone();

        match self.handle(input, &mut updated) {
            Ok(result) => (render_ok(&result), updated),
            Err(err) => {
                log::warn!("Command failed: {input:?}: {err}");
                (format!("{ERROR_STATUS} {err}"), session)
            }
        }
    }

    fn handle(&self, input: &str, session: &mut SessionContext) -> Result<StatementResult> {
        let lex_result = Lexer::new(input).lex()?;
        log::debug!("Tokens: {:?}", lex_result.tokens);

        let command = Parser::new(lex_result.tokens, input).parse()?;

        self.execute_command(&command, session)
    }

    pub fn execute_command(
        &self,
        command: &Command,
        session: &mut SessionContext,
    ) -> Result<StatementResult> {
        let mut ctx = vm::ExecutionContext {
            root: &self.root,
            sequences: &self.sequences,
            session,
        };

        vm::execute(command, &mut ctx)
    }
}

fn render_ok(result: &StatementResult) -> String {
    match &result.result_set {
        Some(result_set) => format!("{OK_STATUS}\n{result_set}"),
        None => String::from(OK_STATUS),
    }
}
