use std::fmt;

/// One parsed request. Exactly one variant per supported command.
#[derive(PartialEq, Debug, Clone)]
pub enum Command {
    Use(Identifier),
    CreateDatabase(Identifier),
    CreateTable(CreateTableBody),
    DropDatabase(Identifier),
    DropTable(Identifier),
    Alter(AlterBody),
    Insert(InsertBody),
    Select(SelectBody),
    Update(UpdateBody),
    Delete(DeleteBody),
    Join(JoinBody),
}

impl Command {
    /// Whether the command runs without an active database.
    pub fn is_server_command(&self) -> bool {
        matches!(
            self,
            Command::Use(_) | Command::CreateDatabase(_) | Command::DropDatabase(_)
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Use(db) => write!(f, "USE {db};"),
            Command::CreateDatabase(db) => write!(f, "CREATE DATABASE {db};"),
            Command::CreateTable(body) => write!(f, "{body};"),
            Command::DropDatabase(db) => write!(f, "DROP DATABASE {db};"),
            Command::DropTable(table) => write!(f, "DROP TABLE {table};"),
            Command::Alter(body) => write!(f, "{body};"),
            Command::Insert(body) => write!(f, "{body};"),
            Command::Select(body) => write!(f, "{body};"),
            Command::Update(body) => write!(f, "{body};"),
            Command::Delete(body) => write!(f, "{body};"),
            Command::Join(body) => write!(f, "{body};"),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct CreateTableBody {
    pub table_name: Identifier,
    pub column_list: Vec<Identifier>,
}

impl fmt::Display for CreateTableBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CREATE TABLE {}", self.table_name)?;

        if !self.column_list.is_empty() {
            write!(f, "({})", join(&self.column_list))?;
        }

        Ok(())
    }
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum AlterationType {
    Add,
    Drop,
}

impl fmt::Display for AlterationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlterationType::Add => f.write_str("ADD"),
            AlterationType::Drop => f.write_str("DROP"),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct AlterBody {
    pub table_name: Identifier,
    pub alteration: AlterationType,
    pub column_name: Identifier,
}

impl fmt::Display for AlterBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ALTER TABLE {} {} {}",
            self.table_name, self.alteration, self.column_name
        )
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct InsertBody {
    pub table_name: Identifier,
    pub values: Vec<Value>,
}

impl fmt::Display for InsertBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "INSERT INTO {} VALUES({})",
            self.table_name,
            join(&self.values)
        )
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum SelectItemList {
    Wildcard,
    Columns(Vec<Identifier>),
}

impl fmt::Display for SelectItemList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectItemList::Wildcard => f.write_str("*"),
            SelectItemList::Columns(columns) => f.write_str(&join(columns)),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct SelectBody {
    pub select_item_list: SelectItemList,
    pub table_name: Identifier,
    pub where_clause: Option<Condition>,
}

impl fmt::Display for SelectBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM {}", self.select_item_list, self.table_name)?;

        match &self.where_clause {
            Some(c) => write!(f, " WHERE {c}"),
            None => Ok(()),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct Assignment {
    pub column_name: Identifier,
    pub value: Value,
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.column_name, self.value)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct UpdateBody {
    pub table_name: Identifier,
    pub assignments: Vec<Assignment>,
    pub where_clause: Condition,
}

impl fmt::Display for UpdateBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UPDATE {} SET {} WHERE {}",
            self.table_name,
            join(&self.assignments),
            self.where_clause
        )
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct DeleteBody {
    pub table_name: Identifier,
    pub where_clause: Condition,
}

impl fmt::Display for DeleteBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DELETE FROM {} WHERE {}", self.table_name, self.where_clause)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct JoinBody {
    pub left_table: Identifier,
    pub right_table: Identifier,
    pub left_attribute: Identifier,
    pub right_attribute: Identifier,
}

impl fmt::Display for JoinBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "JOIN {} AND {} ON {} AND {}",
            self.left_table, self.right_table, self.left_attribute, self.right_attribute
        )
    }
}

/// A WHERE clause. Boolean combinations only ever come from fully
/// parenthesised input, so the tree shape is exactly the source shape.
#[derive(PartialEq, Clone)]
pub enum Condition {
    Comparison {
        attribute: Identifier,
        op: Comparator,
        value: Value,
    },
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl Condition {
    pub fn comparison(attribute: &str, op: Comparator, value: Value) -> Self {
        Condition::Comparison {
            attribute: Identifier::from(attribute.to_string()),
            op,
            value,
        }
    }

    /// Every attribute named anywhere in the tree, left to right.
    pub fn attributes(&self) -> Vec<&Identifier> {
        match self {
            Condition::Comparison { attribute, .. } => vec![attribute],
            Condition::And(left, right) | Condition::Or(left, right) => {
                let mut attributes = left.attributes();
                attributes.extend(right.attributes());
                attributes
            }
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Comparison {
                attribute,
                op,
                value,
            } => write!(f, "{attribute}{op}{value}"),
            Condition::And(left, right) => write!(f, "({left}) AND ({right})"),
            Condition::Or(left, right) => write!(f, "({left}) OR ({right})"),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Passthrough to fmt::Display
        write!(f, "{}", self)
    }
}

#[derive(PartialEq, Clone, Copy)]
pub enum Comparator {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Like,
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::Equal => f.write_str("=="),
            Comparator::NotEqual => f.write_str("!="),
            Comparator::GreaterThan => f.write_str(">"),
            Comparator::GreaterThanOrEqual => f.write_str(">="),
            Comparator::LessThan => f.write_str("<"),
            Comparator::LessThanOrEqual => f.write_str("<="),
            Comparator::Like => f.write_str(" LIKE "),
        }
    }
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Passthrough to fmt::Display
        write!(f, "{}", self)
    }
}

/// A literal as written. Typing is decided later by whoever compares it.
#[derive(PartialEq, Clone)]
pub enum Value {
    Number(String),
    String(String),
    Char(char),
    Boolean(bool),
    Null,
}

impl Value {
    /// The text stored in a table cell for this literal.
    pub fn as_cell(&self) -> String {
        match self {
            Value::Number(n) => n.clone(),
            Value::String(s) => s.clone(),
            Value::Char(c) => c.to_string(),
            Value::Boolean(true) => String::from("TRUE"),
            Value::Boolean(false) => String::from("FALSE"),
            Value::Null => String::from("NULL"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "'{s}'"),
            other => f.write_str(&other.as_cell()),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Passthrough to fmt::Display
        write!(f, "{}", self)
    }
}

#[derive(PartialEq, Clone)]
pub struct Identifier {
    pub value: String,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Passthrough to fmt::Display
        write!(f, "{}", self)
    }
}

impl Identifier {
    pub fn from(value: String) -> Self {
        Identifier { value }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<String>>()
        .join(",")
}
