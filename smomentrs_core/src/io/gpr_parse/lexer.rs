//! Lex a GPR string into a series of tokens for later parsing

use thiserror::Error;

use crate::io::gpr_parse::token::Token;

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    /// Convert the source into tokens, terminated by [`Token::Eof`]
    pub fn lex(&mut self) -> Result<Vec<Token>, LexerError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::Eof);
        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        let c: char = self.advance();
        match c {
            // Single Character Tokens
            '(' => self.add_token(Token::LeftParen),
            ')' => self.add_token(Token::RightParen),
            // Whitespace
            c if c.is_whitespace() => {}
            // Identifiers and Operators
            c if Lexer::is_identifier_char(c) => self.read_identifier(),
            c => {
                return Err(LexerError::InvalidCharacter {
                    character: c,
                    position: self.start,
                })
            }
        };
        Ok(())
    }

    fn advance(&mut self) -> char {
        let char_at_current = self.source[self.current];
        self.current += 1;
        char_at_current
    }

    fn read_identifier(&mut self) {
        while Lexer::is_identifier_char(self.peek()) {
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        match text.as_str() {
            "and" | "And" | "AND" => self.add_token(Token::And),
            "or" | "Or" | "OR" => self.add_token(Token::Or),
            "not" | "Not" | "NOT" => self.add_token(Token::Not),
            gene => self.add_token(Token::Identifier(gene.to_string())),
        }
    }

    /// Gene identifiers may contain anything except whitespace and parentheses
    /// (e.g. `Rv0001`, `10101.1`, `YAL012W-A`)
    fn is_identifier_char(c: char) -> bool {
        !(c.is_whitespace() || c == '(' || c == ')' || c == '\0')
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            return '\0';
        }
        self.source[self.current]
    }

    fn add_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum LexerError {
    #[error("Invalid character {character:?} at position {position}")]
    InvalidCharacter { character: char, position: usize },
}

#[cfg(test)]
mod tests {
    use crate::io::gpr_parse::lexer::Lexer;
    use crate::io::gpr_parse::token::Token;

    #[test]
    fn test_single_gene() {
        let mut lexer = Lexer::new("Rv0023");
        let tokens = match lexer.lex() {
            Ok(t) => t,
            Err(_) => panic!("Failed to parse during test"),
        };
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], Token::Identifier(String::from("Rv0023")));
    }

    #[test]
    fn test_grouping() {
        let mut lexer = Lexer::new("(Rv0023 or Rv0123)");
        let tokens = match lexer.lex() {
            Ok(t) => t,
            Err(_) => panic!("Failed to parse during test"),
        };
        let expected_tokens = vec![
            Token::LeftParen,
            Token::Identifier(String::from("Rv0023")),
            Token::Or,
            Token::Identifier(String::from("Rv0123")),
            Token::RightParen,
            Token::Eof,
        ];
        assert_eq!(tokens, expected_tokens);
    }

    #[test]
    fn test_unusual_identifiers() {
        let mut lexer = Lexer::new("10101.1 AND YAL012W-A\tnot s_0001");
        let tokens = lexer.lex().unwrap();
        let expected_tokens = vec![
            Token::Identifier(String::from("10101.1")),
            Token::And,
            Token::Identifier(String::from("YAL012W-A")),
            Token::Not,
            Token::Identifier(String::from("s_0001")),
            Token::Eof,
        ];
        assert_eq!(tokens, expected_tokens);
    }
}
