/// Keywords that open a command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CommandKeyword {
    Use,
    Create,
    Drop,
    Alter,
    Insert,
    Select,
    Update,
    Delete,
    Join,
}

/// Structural keywords that appear inside a command.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Keyword {
    From,
    Where,
    Into,
    Values,
    Set,
    And,
    Or,
    On,
    Database,
    Table,
    Add,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ident {
    pub value: Slice,
}

impl Ident {
    pub fn new(value: Slice) -> Self {
        Ident { value }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Value {
    SingleQuoted(Slice),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Comparison {
    Equal,              // =
    Equal2,             // ==
    GreaterThanOrEqual, // >=
    LessThanOrEqual,    // <=
    NotEqual,           // !=
    GreaterThan,        // >
    LessThan,           // <
    Like,               // LIKE
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slice {
    pub start: usize,
    pub end: usize,
}

impl Slice {
    pub fn new(start: usize, end: usize) -> Slice {
        Slice { start, end }
    }

    /// Resolve the slice against the buffer it was lexed from.
    pub fn as_str<'a>(&self, buf: &'a str) -> &'a str {
        &buf[self.start..self.end]
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Token {
    Comma,
    ParenOpen,
    ParenClose,
    Semicolon,
    Wildcard,
    Command(CommandKeyword),
    Keyword(Keyword),
    Comparison(Comparison),
    Numeric(Slice),
    Boolean(bool),
    Identifier(Ident),
    Value(Value),
    Null,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocatableToken {
    pub token: Token,
    pub position: usize,
}

impl LocatableToken {
    pub fn at_position(token: Token, position: usize) -> Self {
        LocatableToken { token, position }
    }
}
