pub mod engine;
pub mod eval;
pub mod sequence;
pub mod session;
pub mod storage;
mod util;
mod vm;

pub use engine::{Engine, ResultSet, StatementResult};
pub use session::SessionContext;

/// Tables live in `<root>/<database>/<table>.tab`.
pub const TABLE_FILE_EXT: &str = "tab";

/// Shared id registry, kept directly under the data root.
pub const SEQUENCE_FILE_NAME: &str = "sequences.reg";

pub const DEFAULT_DATA_DIRECTORY: &str = "databases";

/// Column 0 of every table.
pub const ID_COLUMN: &str = "id";
