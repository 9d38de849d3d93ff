use ast::{
    AlterBody, AlterationType, Assignment, Command, Comparator, Condition, CreateTableBody,
    DeleteBody, Identifier, InsertBody, JoinBody, SelectBody, SelectItemList, UpdateBody, Value,
};
use cli_common::{DbError, Result};
use consts::*;
use lexer::token::{CommandKeyword, Comparison, Keyword, LocatableToken, Token};
use recursion::RecursionGuard;

pub mod ast;
mod consts;
mod recursion;

/// How deeply `( ... ) AND ( ... )` may nest.
pub const MAX_CONDITION_DEPTH: usize = 64;

pub struct Parser<'a> {
    tokens: Vec<LocatableToken>,
    buf: &'a str,
    pub curr_pos: usize,
    recursion: RecursionGuard,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<LocatableToken>, buf: &'a str) -> Parser<'a> {
        Parser {
            tokens,
            buf,
            curr_pos: 0,
            recursion: RecursionGuard::new(MAX_CONDITION_DEPTH),
        }
    }

    /// Command ::= CommandType ";"
    pub fn parse(&mut self) -> Result<Command> {
        let command = self.parse_command_type()?;

        self.expect(Token::Semicolon, EXPECT_SEMICOLON)?;

        if !self.is_end() {
            return Err(self.error(EXPECT_END));
        }

        log::debug!("Parsed command: {command}");

        Ok(command)
    }

    fn parse_command_type(&mut self) -> Result<Command> {
        let command = match self.eat() {
            Some(Token::Command(c)) => c,
            _ => return Err(self.error_at_previous(EXPECT_COMMAND)),
        };

        match command {
            CommandKeyword::Use => Ok(Command::Use(
                self.parse_identifier(EXPECT_DATABASE_NAME)?,
            )),
            CommandKeyword::Create => self.parse_create(),
            CommandKeyword::Drop => self.parse_drop(),
            CommandKeyword::Alter => self.parse_alter(),
            CommandKeyword::Insert => self.parse_insert(),
            CommandKeyword::Select => self.parse_select(),
            CommandKeyword::Update => self.parse_update(),
            CommandKeyword::Delete => self.parse_delete(),
            CommandKeyword::Join => self.parse_join(),
        }
    }

    /// Create ::= "CREATE" ("DATABASE" DatabaseName | "TABLE" TableName ["(" AttributeList ")"])
    fn parse_create(&mut self) -> Result<Command> {
        match self.eat() {
            Some(Token::Keyword(Keyword::Database)) => Ok(Command::CreateDatabase(
                self.parse_identifier(EXPECT_DATABASE_NAME)?,
            )),
            Some(Token::Keyword(Keyword::Table)) => {
                let table_name = self.parse_identifier(EXPECT_TABLE_NAME)?;

                let column_list = match self.peek() {
                    Some(Token::ParenOpen) => {
                        self.eat();
                        let columns = self.parse_attribute_list()?;
                        self.expect(Token::ParenClose, EXPECT_PAREN_CLOSE)?;
                        columns
                    }
                    _ => vec![],
                };

                Ok(Command::CreateTable(CreateTableBody {
                    table_name,
                    column_list,
                }))
            }
            _ => Err(self.error_at_previous(EXPECT_STRUCTURE)),
        }
    }

    /// Drop ::= "DROP" ("DATABASE" DatabaseName | "TABLE" TableName)
    fn parse_drop(&mut self) -> Result<Command> {
        match self.eat() {
            Some(Token::Keyword(Keyword::Database)) => Ok(Command::DropDatabase(
                self.parse_identifier(EXPECT_DATABASE_NAME)?,
            )),
            Some(Token::Keyword(Keyword::Table)) => Ok(Command::DropTable(
                self.parse_identifier(EXPECT_TABLE_NAME)?,
            )),
            _ => Err(self.error_at_previous(EXPECT_STRUCTURE)),
        }
    }

    /// Alter ::= "ALTER" "TABLE" TableName ("ADD" | "DROP") AttributeName
    fn parse_alter(&mut self) -> Result<Command> {
        self.expect(Token::Keyword(Keyword::Table), EXPECT_TABLE)?;
        let table_name = self.parse_identifier(EXPECT_TABLE_NAME)?;

        let alteration = match self.eat() {
            Some(Token::Keyword(Keyword::Add)) => AlterationType::Add,
            // DROP lexes as a command keyword wherever it appears
            Some(Token::Command(CommandKeyword::Drop)) => AlterationType::Drop,
            _ => return Err(self.error_at_previous(EXPECT_ALTERATION_TYPE)),
        };

        let column_name = self.parse_identifier(EXPECT_ATTRIBUTE_NAME)?;

        Ok(Command::Alter(AlterBody {
            table_name,
            alteration,
            column_name,
        }))
    }

    /// Insert ::= "INSERT" "INTO" TableName "VALUES" "(" ValueList ")"
    fn parse_insert(&mut self) -> Result<Command> {
        self.expect(Token::Keyword(Keyword::Into), EXPECT_INTO)?;
        let table_name = self.parse_identifier(EXPECT_TABLE_NAME)?;
        self.expect(Token::Keyword(Keyword::Values), EXPECT_VALUES)?;
        self.expect(Token::ParenOpen, EXPECT_PAREN_OPEN)?;

        let mut values = vec![self.parse_value()?];
        while self.peek() == Some(&Token::Comma) {
            self.eat();
            values.push(self.parse_value()?);
        }

        self.expect(Token::ParenClose, EXPECT_PAREN_CLOSE)?;

        Ok(Command::Insert(InsertBody { table_name, values }))
    }

    /// Select ::= "SELECT" WildAttribList "FROM" TableName ["WHERE" Condition]
    fn parse_select(&mut self) -> Result<Command> {
        let select_item_list = match self.peek() {
            Some(Token::Wildcard) => {
                self.eat();
                SelectItemList::Wildcard
            }
            Some(Token::Identifier(_)) => SelectItemList::Columns(self.parse_attribute_list()?),
            _ => return Err(self.error(EXPECT_WILD_ATTRIB_LIST)),
        };

        self.expect(Token::Keyword(Keyword::From), EXPECT_FROM)?;
        let table_name = self.parse_identifier(EXPECT_TABLE_NAME)?;

        let where_clause = match self.peek() {
            Some(Token::Keyword(Keyword::Where)) => {
                self.eat();
                Some(self.parse_condition()?)
            }
            _ => None,
        };

        Ok(Command::Select(SelectBody {
            select_item_list,
            table_name,
            where_clause,
        }))
    }

    /// Update ::= "UPDATE" TableName "SET" NameValueList "WHERE" Condition
    fn parse_update(&mut self) -> Result<Command> {
        let table_name = self.parse_identifier(EXPECT_TABLE_NAME)?;
        self.expect(Token::Keyword(Keyword::Set), EXPECT_SET)?;

        let mut assignments = vec![self.parse_assignment()?];
        while self.peek() == Some(&Token::Comma) {
            self.eat();
            assignments.push(self.parse_assignment()?);
        }

        self.expect(Token::Keyword(Keyword::Where), EXPECT_WHERE)?;
        let where_clause = self.parse_condition()?;

        Ok(Command::Update(UpdateBody {
            table_name,
            assignments,
            where_clause,
        }))
    }

    /// NameValuePair ::= AttributeName "=" Value
    fn parse_assignment(&mut self) -> Result<Assignment> {
        let column_name = self.parse_identifier(EXPECT_ATTRIBUTE_NAME)?;
        self.expect(Token::Comparison(Comparison::Equal), EXPECT_ASSIGN)?;
        let value = self.parse_value()?;

        Ok(Assignment { column_name, value })
    }

    /// Delete ::= "DELETE" "FROM" TableName "WHERE" Condition
    fn parse_delete(&mut self) -> Result<Command> {
        self.expect(Token::Keyword(Keyword::From), EXPECT_FROM)?;
        let table_name = self.parse_identifier(EXPECT_TABLE_NAME)?;
        self.expect(Token::Keyword(Keyword::Where), EXPECT_WHERE)?;
        let where_clause = self.parse_condition()?;

        Ok(Command::Delete(DeleteBody {
            table_name,
            where_clause,
        }))
    }

    /// Join ::= "JOIN" TableName "AND" TableName "ON" AttributeName "AND" AttributeName
    fn parse_join(&mut self) -> Result<Command> {
        let left_table = self.parse_identifier(EXPECT_TABLE_NAME)?;
        self.expect(Token::Keyword(Keyword::And), EXPECT_AND)?;
        let right_table = self.parse_identifier(EXPECT_TABLE_NAME)?;
        self.expect(Token::Keyword(Keyword::On), EXPECT_ON)?;
        let left_attribute = self.parse_identifier(EXPECT_ATTRIBUTE_NAME)?;
        self.expect(Token::Keyword(Keyword::And), EXPECT_AND)?;
        let right_attribute = self.parse_identifier(EXPECT_ATTRIBUTE_NAME)?;

        Ok(Command::Join(JoinBody {
            left_table,
            right_table,
            left_attribute,
            right_attribute,
        }))
    }

    /// Condition ::= "(" Condition ")" BoolOperator "(" Condition ")"
    ///             | AttributeName Operator Value
    fn parse_condition(&mut self) -> Result<Condition> {
        self.recursion.dec(self.position())?;
        let condition = self.parse_condition_body();
        self.recursion.inc();

        condition
    }

    fn parse_condition_body(&mut self) -> Result<Condition> {
        match self.peek() {
            Some(Token::ParenOpen) => {
                self.eat();
                let left = self.parse_condition()?;
                self.expect(Token::ParenClose, EXPECT_PAREN_CLOSE)?;

                let is_and = match self.eat() {
                    Some(Token::Keyword(Keyword::And)) => true,
                    Some(Token::Keyword(Keyword::Or)) => false,
                    _ => return Err(self.error_at_previous(EXPECT_BOOL_OPERATOR)),
                };

                self.expect(Token::ParenOpen, EXPECT_PAREN_OPEN)?;
                let right = self.parse_condition()?;
                self.expect(Token::ParenClose, EXPECT_PAREN_CLOSE)?;

                Ok(match is_and {
                    true => Condition::And(Box::new(left), Box::new(right)),
                    false => Condition::Or(Box::new(left), Box::new(right)),
                })
            }
            Some(Token::Identifier(_)) => {
                let attribute = self.parse_identifier(EXPECT_ATTRIBUTE_NAME)?;
                let op = self.parse_operator()?;
                let value = self.parse_value()?;

                Ok(Condition::Comparison {
                    attribute,
                    op,
                    value,
                })
            }
            _ => Err(self.error(EXPECT_CONDITION)),
        }
    }

    fn parse_operator(&mut self) -> Result<Comparator> {
        match self.eat() {
            Some(Token::Comparison(c)) => match c {
                Comparison::Equal2 => Ok(Comparator::Equal),
                Comparison::NotEqual => Ok(Comparator::NotEqual),
                Comparison::GreaterThan => Ok(Comparator::GreaterThan),
                Comparison::GreaterThanOrEqual => Ok(Comparator::GreaterThanOrEqual),
                Comparison::LessThan => Ok(Comparator::LessThan),
                Comparison::LessThanOrEqual => Ok(Comparator::LessThanOrEqual),
                Comparison::Like => Ok(Comparator::Like),
                // A lone '=' only ever assigns
                Comparison::Equal => Err(self.error_at_previous(EXPECT_OPERATOR)),
            },
            _ => Err(self.error_at_previous(EXPECT_OPERATOR)),
        }
    }

    /// Value ::= quoted-string | boolean | float | integer | single-char | "NULL"
    fn parse_value(&mut self) -> Result<Value> {
        match self.eat() {
            Some(Token::Value(lexer::token::Value::SingleQuoted(s))) => {
                Ok(Value::String(s.as_str(self.buf).to_string()))
            }
            Some(Token::Numeric(s)) => Ok(Value::Number(s.as_str(self.buf).to_string())),
            Some(Token::Boolean(b)) => Ok(Value::Boolean(b)),
            Some(Token::Null) => Ok(Value::Null),
            Some(Token::Identifier(ident)) => {
                let mut chars = ident.value.as_str(self.buf).chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Value::Char(c)),
                    _ => Err(self.error_at_previous(EXPECT_VALUE)),
                }
            }
            _ => Err(self.error_at_previous(EXPECT_VALUE)),
        }
    }

    /// AttributeList ::= AttributeName ("," AttributeName)*
    fn parse_attribute_list(&mut self) -> Result<Vec<Identifier>> {
        let mut attributes = vec![self.parse_identifier(EXPECT_ATTRIBUTE_NAME)?];

        while self.peek() == Some(&Token::Comma) {
            self.eat();
            attributes.push(self.parse_identifier(EXPECT_ATTRIBUTE_NAME)?);
        }

        Ok(attributes)
    }

    fn parse_identifier(&mut self, production: &'static str) -> Result<Identifier> {
        match self.eat() {
            Some(Token::Identifier(ident)) => Ok(Identifier::from(
                ident.value.as_str(self.buf).to_string(),
            )),
            _ => Err(self.error_at_previous(production)),
        }
    }

    // Consume the next token, failing with `production` if it isn't `token`
    fn expect(&mut self, token: Token, production: &'static str) -> Result<()> {
        match self.eat() {
            Some(t) if t == token => Ok(()),
            _ => Err(self.error_at_previous(production)),
        }
    }

    // Get the next token without consuming it
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.curr_pos).map(|t| &t.token)
    }

    // Consume and return the next token. The cursor advances even past the
    // end so that errors can always point at the token just eaten.
    fn eat(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.curr_pos).map(|t| t.token);
        self.curr_pos += 1;

        token
    }

    // Byte offset of the next token, or the end of the input
    fn position(&self) -> usize {
        self.position_of(self.curr_pos)
    }

    fn position_of(&self, index: usize) -> usize {
        match self.tokens.get(index) {
            Some(t) => t.position,
            None => self.buf.len(),
        }
    }

    fn error(&self, production: &'static str) -> DbError {
        DbError::grammar(production, self.position())
    }

    // Error pointing at the token just consumed by `eat`
    fn error_at_previous(&self, production: &'static str) -> DbError {
        DbError::grammar(production, self.position_of(self.curr_pos - 1))
    }

    // True if all tokens parsed
    fn is_end(&self) -> bool {
        self.curr_pos >= self.tokens.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::*;
    use crate::*;
    use lexer::Lexer;
    use pretty_assertions::assert_eq;

    fn parse(input: &str) -> Result<Command> {
        let lex_result = Lexer::new(input).lex()?;
        Parser::new(lex_result.tokens, input).parse()
    }

    fn ident(value: &str) -> Identifier {
        Identifier::from(value.to_string())
    }

    fn expected(err: Result<Command>) -> &'static str {
        match err {
            Err(DbError::Grammar { expected, .. }) => expected,
            other => panic!("Expected a grammar error, got {other:?}"),
        }
    }

    #[test]
    fn test_use() {
        assert_eq!(parse("USE markbook;"), Ok(Command::Use(ident("markbook"))));
    }

    #[test]
    fn test_missing_semicolon() {
        assert_eq!(expected(parse("USE markbook")), EXPECT_SEMICOLON);
    }

    #[test]
    fn test_trailing_tokens_after_semicolon() {
        assert_eq!(expected(parse("USE markbook; USE other;")), EXPECT_END);
    }

    #[test]
    fn test_empty_input() {
        let actual = parse("   ");

        assert_eq!(actual, Err(DbError::grammar(EXPECT_COMMAND, 3)));
    }

    #[test]
    fn test_create_database() {
        assert_eq!(
            parse("create database markbook;"),
            Ok(Command::CreateDatabase(ident("markbook")))
        );
    }

    #[test]
    fn test_create_table_without_columns() {
        assert_eq!(
            parse("CREATE TABLE marks;"),
            Ok(Command::CreateTable(CreateTableBody {
                table_name: ident("marks"),
                column_list: vec![],
            }))
        );
    }

    #[test]
    fn test_create_table_with_columns() {
        assert_eq!(
            parse("CREATE TABLE marks (name, mark, pass);"),
            Ok(Command::CreateTable(CreateTableBody {
                table_name: ident("marks"),
                column_list: vec![ident("name"), ident("mark"), ident("pass")],
            }))
        );
    }

    #[test]
    fn test_create_table_unclosed_columns() {
        assert_eq!(expected(parse("CREATE TABLE marks (name, mark;")), EXPECT_PAREN_CLOSE);
    }

    #[test]
    fn test_drop() {
        assert_eq!(
            parse("DROP DATABASE markbook;"),
            Ok(Command::DropDatabase(ident("markbook")))
        );
        assert_eq!(
            parse("DROP TABLE marks;"),
            Ok(Command::DropTable(ident("marks")))
        );
        assert_eq!(expected(parse("DROP marks;")), EXPECT_STRUCTURE);
    }

    #[test]
    fn test_alter() {
        assert_eq!(
            parse("ALTER TABLE marks ADD age;"),
            Ok(Command::Alter(AlterBody {
                table_name: ident("marks"),
                alteration: AlterationType::Add,
                column_name: ident("age"),
            }))
        );
        assert_eq!(
            parse("ALTER TABLE marks DROP age;"),
            Ok(Command::Alter(AlterBody {
                table_name: ident("marks"),
                alteration: AlterationType::Drop,
                column_name: ident("age"),
            }))
        );
        assert_eq!(
            expected(parse("ALTER TABLE marks RENAME age;")),
            EXPECT_ALTERATION_TYPE
        );
    }

    #[test]
    fn test_insert_values() {
        assert_eq!(
            parse("INSERT INTO marks VALUES('Alice', 90, -2.5, TRUE, NULL, x);"),
            Ok(Command::Insert(InsertBody {
                table_name: ident("marks"),
                values: vec![
                    Value::String(String::from("Alice")),
                    Value::Number(String::from("90")),
                    Value::Number(String::from("-2.5")),
                    Value::Boolean(true),
                    Value::Null,
                    Value::Char('x'),
                ],
            }))
        );
    }

    #[test]
    fn test_insert_rejects_bare_word_value() {
        assert_eq!(
            expected(parse("INSERT INTO marks VALUES(Alice);")),
            EXPECT_VALUE
        );
    }

    #[test]
    fn test_select_wildcard() {
        assert_eq!(
            parse("SELECT * FROM marks;"),
            Ok(Command::Select(SelectBody {
                select_item_list: SelectItemList::Wildcard,
                table_name: ident("marks"),
                where_clause: None,
            }))
        );
    }

    #[test]
    fn test_select_columns_with_where() {
        assert_eq!(
            parse("SELECT name, mark FROM marks WHERE mark>50;"),
            Ok(Command::Select(SelectBody {
                select_item_list: SelectItemList::Columns(vec![ident("name"), ident("mark")]),
                table_name: ident("marks"),
                where_clause: Some(Condition::comparison(
                    "mark",
                    Comparator::GreaterThan,
                    Value::Number(String::from("50"))
                )),
            }))
        );
    }

    #[test]
    fn test_select_without_item_list() {
        assert_eq!(
            expected(parse("SELECT FROM marks;")),
            EXPECT_WILD_ATTRIB_LIST
        );
    }

    #[test]
    fn test_nested_condition() {
        let actual = parse("SELECT * FROM marks WHERE ((pass == FALSE) AND (mark > 35)) OR (name LIKE 'ali');");

        let expected_condition = Condition::Or(
            Box::new(Condition::And(
                Box::new(Condition::comparison(
                    "pass",
                    Comparator::Equal,
                    Value::Boolean(false),
                )),
                Box::new(Condition::comparison(
                    "mark",
                    Comparator::GreaterThan,
                    Value::Number(String::from("35")),
                )),
            )),
            Box::new(Condition::comparison(
                "name",
                Comparator::Like,
                Value::String(String::from("ali")),
            )),
        );

        assert_eq!(
            actual,
            Ok(Command::Select(SelectBody {
                select_item_list: SelectItemList::Wildcard,
                table_name: ident("marks"),
                where_clause: Some(expected_condition),
            }))
        );
    }

    #[test]
    fn test_unparenthesised_boolean_is_rejected() {
        assert_eq!(
            expected(parse("SELECT * FROM marks WHERE a==1 AND b==2;")),
            EXPECT_SEMICOLON
        );
    }

    #[test]
    fn test_parenthesised_comparison_needs_bool_operator() {
        assert_eq!(
            expected(parse("SELECT * FROM marks WHERE (a==1);")),
            EXPECT_BOOL_OPERATOR
        );
    }

    #[test]
    fn test_single_equals_is_not_an_operator() {
        assert_eq!(
            expected(parse("SELECT * FROM marks WHERE a=1;")),
            EXPECT_OPERATOR
        );
    }

    #[test]
    fn test_update() {
        assert_eq!(
            parse("UPDATE marks SET mark = 38, pass = FALSE WHERE name == 'Chris';"),
            Ok(Command::Update(UpdateBody {
                table_name: ident("marks"),
                assignments: vec![
                    Assignment {
                        column_name: ident("mark"),
                        value: Value::Number(String::from("38")),
                    },
                    Assignment {
                        column_name: ident("pass"),
                        value: Value::Boolean(false),
                    },
                ],
                where_clause: Condition::comparison(
                    "name",
                    Comparator::Equal,
                    Value::String(String::from("Chris"))
                ),
            }))
        );
    }

    #[test]
    fn test_update_requires_where() {
        assert_eq!(
            expected(parse("UPDATE marks SET mark = 38;")),
            EXPECT_WHERE
        );
    }

    #[test]
    fn test_delete() {
        assert_eq!(
            parse("DELETE FROM marks WHERE id != 3;"),
            Ok(Command::Delete(DeleteBody {
                table_name: ident("marks"),
                where_clause: Condition::comparison(
                    "id",
                    Comparator::NotEqual,
                    Value::Number(String::from("3"))
                ),
            }))
        );
    }

    #[test]
    fn test_join() {
        assert_eq!(
            parse("JOIN coursework AND marks ON submission AND id;"),
            Ok(Command::Join(JoinBody {
                left_table: ident("coursework"),
                right_table: ident("marks"),
                left_attribute: ident("submission"),
                right_attribute: ident("id"),
            }))
        );
        assert_eq!(
            expected(parse("JOIN coursework, marks ON submission AND id;")),
            EXPECT_AND
        );
    }

    #[test]
    fn test_error_position() {
        let actual = parse("SELECT * FROM 42;");

        assert_eq!(actual, Err(DbError::grammar(EXPECT_TABLE_NAME, 14)));
    }

    #[test]
    fn test_maximum_condition_depth() {
        let depth = MAX_CONDITION_DEPTH + 1;
        let mut condition = String::from("a==1");
        for _ in 0..depth {
            condition = format!("({condition}) AND (b==2)");
        }
        let input = format!("SELECT * FROM t WHERE {condition};");

        assert_eq!(expected(parse(&input)), EXPECT_SHALLOWER_CONDITION);
    }

    #[test]
    fn test_display_round_trips_through_parser() {
        let input = "UPDATE marks SET mark=38 WHERE ((pass==FALSE) AND (mark>35)) OR (name LIKE 'ali');";
        let command = parse(input).unwrap();

        assert_eq!(parse(&command.to_string()), Ok(command));
    }
}
