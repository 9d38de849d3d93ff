//! Production names reported by `GrammarError`.

pub const EXPECT_COMMAND: &str =
    "CommandType (one of USE, CREATE, DROP, ALTER, INSERT, SELECT, UPDATE, DELETE or JOIN)";

pub const EXPECT_SEMICOLON: &str = "';'";

pub const EXPECT_END: &str = "end of command after ';'";

pub const EXPECT_STRUCTURE: &str = "DATABASE or TABLE";

pub const EXPECT_DATABASE_NAME: &str = "DatabaseName";

pub const EXPECT_TABLE_NAME: &str = "TableName";

pub const EXPECT_ATTRIBUTE_NAME: &str = "AttributeName";

pub const EXPECT_ALTERATION_TYPE: &str = "AlterationType (ADD or DROP)";

pub const EXPECT_VALUE: &str = "Value";

pub const EXPECT_OPERATOR: &str = "Operator (one of ==, >, <, >=, <=, != or LIKE)";

pub const EXPECT_BOOL_OPERATOR: &str = "BoolOperator (AND or OR)";

pub const EXPECT_CONDITION: &str = "Condition";

pub const EXPECT_WILD_ATTRIB_LIST: &str = "WildAttribList ('*' or AttributeList)";

pub const EXPECT_ASSIGN: &str = "'='";

pub const EXPECT_PAREN_OPEN: &str = "'('";

pub const EXPECT_PAREN_CLOSE: &str = "')'";

pub const EXPECT_SHALLOWER_CONDITION: &str = "Condition nested less deeply";

pub const EXPECT_FROM: &str = "FROM";

pub const EXPECT_WHERE: &str = "WHERE";

pub const EXPECT_INTO: &str = "INTO";

pub const EXPECT_VALUES: &str = "VALUES";

pub const EXPECT_SET: &str = "SET";

pub const EXPECT_TABLE: &str = "TABLE";

pub const EXPECT_AND: &str = "AND";

pub const EXPECT_ON: &str = "ON";
