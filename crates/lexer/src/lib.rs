use cli_common::{DbError, LexErrorKind, Result};
use token::*;
pub mod token;

pub struct Lexer<'a> {
    buf: &'a str,
    chars: Vec<(usize, char)>,
    len: usize,
    pos: usize,
}

#[derive(Debug)]
pub struct LexResult<'a> {
    pub tokens: Vec<LocatableToken>,
    pub buf: &'a str,
}

const COMMAND_KEYWORDS: [(&str, CommandKeyword); 9] = [
    ("use", CommandKeyword::Use),
    ("create", CommandKeyword::Create),
    ("drop", CommandKeyword::Drop),
    ("alter", CommandKeyword::Alter),
    ("insert", CommandKeyword::Insert),
    ("select", CommandKeyword::Select),
    ("update", CommandKeyword::Update),
    ("delete", CommandKeyword::Delete),
    ("join", CommandKeyword::Join),
];

const KEYWORDS: [(&str, Keyword); 11] = [
    ("from", Keyword::From),
    ("where", Keyword::Where),
    ("into", Keyword::Into),
    ("values", Keyword::Values),
    ("set", Keyword::Set),
    ("and", Keyword::And),
    ("or", Keyword::Or),
    ("on", Keyword::On),
    ("database", Keyword::Database),
    ("table", Keyword::Table),
    ("add", Keyword::Add),
];

impl<'a> Lexer<'a> {
    pub fn new(buf: &'a str) -> Lexer<'a> {
        let chars: Vec<(usize, char)> = buf.char_indices().collect();
        let len = chars.len();
        Lexer {
            buf,
            chars,
            len,
            pos: 0,
        }
    }

    /// Split the whole buffer into tokens. Whitespace separates tokens and is
    /// never emitted. The first character no rule accepts fails the whole lex.
    pub fn lex(mut self) -> Result<LexResult<'a>> {
        let mut tokens = Vec::new();

        loop {
            self.skip_whitespace();

            if self.pos >= self.len {
                break;
            }

            let (curr_offset, curr_ch) = self.chars[self.pos];

            let token = match curr_ch {
                ',' => self.single(Token::Comma),
                '(' => self.single(Token::ParenOpen),
                ')' => self.single(Token::ParenClose),
                ';' => self.single(Token::Semicolon),
                '*' => self.single(Token::Wildcard),
                '=' if self.next_is('=') => self.double(Comparison::Equal2),
                '=' => self.single(Token::Comparison(Comparison::Equal)),
                '>' if self.next_is('=') => self.double(Comparison::GreaterThanOrEqual),
                '>' => self.single(Token::Comparison(Comparison::GreaterThan)),
                '<' if self.next_is('=') => self.double(Comparison::LessThanOrEqual),
                '<' => self.single(Token::Comparison(Comparison::LessThan)),
                '!' if self.next_is('=') => self.double(Comparison::NotEqual),
                '\'' => self.lex_quoted(curr_offset)?,
                // A sign only starts a number when a digit follows it
                '-' | '+' if self.peek_at(self.pos + 1).is_some_and(|c| c.is_ascii_digit()) => {
                    self.lex_numeric(curr_offset, true)
                }
                c if c.is_ascii_digit() => self.lex_numeric(curr_offset, false),
                c if c.is_ascii_alphabetic() => self.lex_word(curr_offset),
                c => {
                    return Err(DbError::lexical(
                        LexErrorKind::UnexpectedChar(c),
                        curr_offset,
                    ))
                }
            };

            tokens.push(LocatableToken::at_position(token, curr_offset));
        }

        log::trace!("Lexed {} tokens from {:?}", tokens.len(), self.buf);

        Ok(LexResult {
            buf: self.buf,
            tokens,
        })
    }

    fn single(&mut self, token: Token) -> Token {
        self.pos += 1;
        token
    }

    fn double(&mut self, comparison: Comparison) -> Token {
        self.pos += 2;
        Token::Comparison(comparison)
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.len && self.chars[self.pos].1.is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek_at(&self, pos: usize) -> Option<char> {
        self.chars.get(pos).map(|(_, c)| *c)
    }

    fn next_is(&self, ch: char) -> bool {
        self.peek_at(self.pos + 1) == Some(ch)
    }

    /// Byte offset of the char at `pos`, or the end of the buffer.
    fn offset_at(&self, pos: usize) -> usize {
        match self.chars.get(pos) {
            Some((offset, _)) => *offset,
            None => self.buf.len(),
        }
    }

    fn lex_quoted(&mut self, start_offset: usize) -> Result<Token> {
        let mut cursor = self.pos + 1;

        loop {
            match self.peek_at(cursor) {
                None => {
                    return Err(DbError::lexical(
                        LexErrorKind::UnterminatedString,
                        start_offset,
                    ))
                }
                Some('\t') => {
                    return Err(DbError::lexical(
                        LexErrorKind::TabInString,
                        self.offset_at(cursor),
                    ))
                }
                // Rows are stored one per line
                Some('\n' | '\r') => {
                    return Err(DbError::lexical(
                        LexErrorKind::LineBreakInString,
                        self.offset_at(cursor),
                    ))
                }
                Some('\'') => break,
                Some(_) => cursor += 1,
            }
        }

        let end_offset = self.offset_at(cursor);
        self.pos = cursor + 1;

        Ok(Token::Value(Value::SingleQuoted(Slice::new(
            start_offset + 1,
            end_offset,
        ))))
    }

    /// Numbers are an optional sign, digits, then an optional fraction. An
    /// unsigned digit run glued to letters is an identifier instead.
    fn lex_numeric(&mut self, start_offset: usize, signed: bool) -> Token {
        let mut cursor = self.pos + usize::from(signed);
        cursor = self.scan_while(cursor, |c| c.is_ascii_digit());

        let mut fractional = false;
        if self.peek_at(cursor) == Some('.')
            && self.peek_at(cursor + 1).is_some_and(|c| c.is_ascii_digit())
        {
            fractional = true;
            cursor = self.scan_while(cursor + 1, |c| c.is_ascii_digit());
        }

        let glued = self.peek_at(cursor).is_some_and(|c| c.is_ascii_alphabetic());
        if glued && !signed && !fractional {
            return self.lex_word(start_offset);
        }

        self.pos = cursor;
        Token::Numeric(Slice::new(start_offset, self.offset_at(cursor)))
    }

    fn lex_word(&mut self, start_offset: usize) -> Token {
        let cursor = self.scan_while(self.pos, |c| c.is_ascii_alphanumeric());
        let end_offset = self.offset_at(cursor);
        self.pos = cursor;

        let word = &self.buf[start_offset..end_offset];

        if let Some((_, command)) = COMMAND_KEYWORDS
            .iter()
            .find(|(k, _)| word.eq_ignore_ascii_case(k))
        {
            return Token::Command(*command);
        }

        if let Some((_, keyword)) = KEYWORDS.iter().find(|(k, _)| word.eq_ignore_ascii_case(k)) {
            return Token::Keyword(*keyword);
        }

        match word {
            s if s.eq_ignore_ascii_case("like") => Token::Comparison(Comparison::Like),
            s if s.eq_ignore_ascii_case("true") => Token::Boolean(true),
            s if s.eq_ignore_ascii_case("false") => Token::Boolean(false),
            s if s.eq_ignore_ascii_case("null") => Token::Null,
            _ => Token::Identifier(Ident::new(Slice::new(start_offset, end_offset))),
        }
    }

    /// Given a start point, advance while `keep` holds and return the
    /// first position where it doesn't.
    fn scan_while<F>(&self, start: usize, keep: F) -> usize
    where
        F: Fn(char) -> bool,
    {
        let mut cursor = start;

        while cursor < self.len && keep(self.chars[cursor].1) {
            cursor += 1;
        }

        cursor
    }
}

#[cfg(test)]
mod lexer_tests {
    use crate::*;

    fn lex_without_locations(str: &str) -> Vec<Token> {
        let lexer = Lexer::new(str).lex().expect("lex failed");
        lexer.tokens.iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_simple_tokens() {
        let actual = lex_without_locations(",();*");

        let expected = vec![
            Token::Comma,
            Token::ParenOpen,
            Token::ParenClose,
            Token::Semicolon,
            Token::Wildcard,
        ];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert_eq!(lex_without_locations(""), vec![]);
        assert_eq!(lex_without_locations("  \t \r\n "), vec![]);
    }

    #[test]
    fn test_comparison_tokens() {
        let actual = lex_without_locations("== >= <= != > < = LIKE");

        let expected = vec![
            Token::Comparison(Comparison::Equal2),
            Token::Comparison(Comparison::GreaterThanOrEqual),
            Token::Comparison(Comparison::LessThanOrEqual),
            Token::Comparison(Comparison::NotEqual),
            Token::Comparison(Comparison::GreaterThan),
            Token::Comparison(Comparison::LessThan),
            Token::Comparison(Comparison::Equal),
            Token::Comparison(Comparison::Like),
        ];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_operators_without_spaces() {
        let actual = lex_without_locations("mark>=50");

        let expected = vec![
            Token::Identifier(Ident::new(Slice::new(0, 4))),
            Token::Comparison(Comparison::GreaterThanOrEqual),
            Token::Numeric(Slice::new(6, 8)),
        ];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_keywords() {
        let actual = lex_without_locations("select FROM wHeRe Database");

        let expected = vec![
            Token::Command(CommandKeyword::Select),
            Token::Keyword(Keyword::From),
            Token::Keyword(Keyword::Where),
            Token::Keyword(Keyword::Database),
        ];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_keywords_positioning() {
        let lexer = Lexer::new("use  markbook;").lex().unwrap();

        let expected = vec![
            LocatableToken::at_position(Token::Command(CommandKeyword::Use), 0),
            LocatableToken::at_position(Token::Identifier(Ident::new(Slice::new(5, 13))), 5),
            LocatableToken::at_position(Token::Semicolon, 13),
        ];

        assert_eq!(lexer.tokens, expected);
    }

    #[test]
    fn test_keywords_not_greedy() {
        let actual = lex_without_locations("selecting");

        // Should not match on Token::Command for Select!
        let expected = vec![Token::Identifier(Ident::new(Slice::new(0, 9)))];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_literals() {
        let actual = lex_without_locations("TRUE false NuLL");

        let expected = vec![Token::Boolean(true), Token::Boolean(false), Token::Null];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_numeric() {
        let actual = lex_without_locations("12 -4 +3.25 0.5");

        let expected = vec![
            Token::Numeric(Slice::new(0, 2)),
            Token::Numeric(Slice::new(3, 5)),
            Token::Numeric(Slice::new(6, 11)),
            Token::Numeric(Slice::new(12, 15)),
        ];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_digit_led_identifier() {
        let actual = lex_without_locations("12a0");

        let expected = vec![Token::Identifier(Ident::new(Slice::new(0, 4)))];

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_quoted_string_is_verbatim() {
        let str = "'Hello, World;  (x)'";
        let lexer = Lexer::new(str).lex().unwrap();

        let slice = match lexer.tokens[0].token {
            Token::Value(Value::SingleQuoted(s)) => s,
            other => panic!("Expected a quoted value, found {other:?}"),
        };

        assert_eq!(lexer.tokens.len(), 1);
        assert_eq!(slice.as_str(str), "Hello, World;  (x)");
    }

    #[test]
    fn test_empty_quoted_string() {
        let actual = lex_without_locations("''");

        assert_eq!(
            actual,
            vec![Token::Value(Value::SingleQuoted(Slice::new(1, 1)))]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let actual = Lexer::new("VALUES('abc").lex();

        assert_eq!(
            actual.unwrap_err(),
            DbError::lexical(LexErrorKind::UnterminatedString, 7)
        );
    }

    #[test]
    fn test_tab_in_string() {
        let actual = Lexer::new("'a\tb'").lex();

        assert_eq!(
            actual.unwrap_err(),
            DbError::lexical(LexErrorKind::TabInString, 2)
        );
    }

    #[test]
    fn test_line_break_in_string() {
        assert_eq!(
            Lexer::new("('x\ny', 1)").lex().unwrap_err(),
            DbError::lexical(LexErrorKind::LineBreakInString, 3)
        );
        assert_eq!(
            Lexer::new("'x\r'").lex().unwrap_err(),
            DbError::lexical(LexErrorKind::LineBreakInString, 2)
        );
    }

    #[test]
    fn test_unknown_character() {
        let actual = Lexer::new("SELECT * FROM t WHERE a ! 1;").lex();

        assert_eq!(
            actual.unwrap_err(),
            DbError::lexical(LexErrorKind::UnexpectedChar('!'), 24)
        );
    }

    #[test]
    fn test_lexing_is_deterministic() {
        let str = "INSERT INTO marks VALUES('Alice', 90, TRUE, NULL, -1.5);";

        let first = lex_without_locations(str);
        let second = lex_without_locations(str);

        assert_eq!(first, second);
        assert_eq!(first.len(), 16);
    }

    #[test]
    fn test_string_indexing() {
        let str = "insert into users ";
        let lexer = Lexer::new(str).lex().unwrap();

        let identifier_str = match &lexer.tokens[2].token {
            Token::Identifier(Ident { value: x }) => Some(x.as_str(str)),
            _ => None,
        };

        assert_ne!(identifier_str, None);
        assert_eq!(identifier_str.unwrap(), "users");
    }
}
