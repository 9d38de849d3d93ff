/// Per-connection state carried between commands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    /// Stored directory name of the database picked by the last successful `USE`.
    pub active_database: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        SessionContext::default()
    }

    pub fn with_database(name: &str) -> Self {
        SessionContext {
            active_database: Some(name.to_string()),
        }
    }
}
