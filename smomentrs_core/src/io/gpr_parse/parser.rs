use crate::io::gpr_parse::token::Token;
use crate::metabolic_model::gene::Gene;
use crate::metabolic_model::model::{Gpr, GprOperatorType};

use indexmap::IndexMap;
use thiserror::Error;
/*
GPR Grammar (`and` binds tighter than `or`):
expression -> disjunction
disjunction -> conjunction ("OR" conjunction)* ;
conjunction -> unary ("AND" unary)* ;
unary -> "NOT" unary | primary ;
primary -> GENE | "(" expression ")" ;

e.g. Gene1 AND Gene2 OR Gene3 AND NOT Gene4
 == (Gene1 AND Gene2) OR (Gene3 AND (NOT Gene4))
 */

static EOF_TOKEN: Token = Token::Eof;

/// GPR Parser
pub struct GPRParser<'gm> {
    /// Vector of tokens from the GPR string
    tokens: Vec<Token>,
    /// Current token being processed
    current: usize,
    /// Map containing the Genes, genes seen while parsing are added to it
    pub(crate) gene_map: &'gm mut IndexMap<String, Gene>,
}

impl<'gm> GPRParser<'gm> {
    /// Create a new GPRParser
    pub fn new(tokens: Vec<Token>, gene_map: &'gm mut IndexMap<String, Gene>) -> GPRParser<'gm> {
        GPRParser {
            tokens,
            current: 0,
            gene_map,
        }
    }

    // region Parsing Functions

    /// Parse the token vector into a GPR AST
    pub fn parse(&mut self) -> Result<Gpr, ParseError> {
        let gpr = self.disjunction()?;
        if !self.is_at_end() {
            // If entire expression has not been parsed, and error has occurred
            return Err(ParseError::EarlyTermination);
        }
        Ok(gpr)
    }

    fn disjunction(&mut self) -> Result<Gpr, ParseError> {
        let mut expr = self.conjunction()?;
        while self.match_token(Token::Or) {
            let right = self.conjunction()?;
            expr = Gpr::new_binary_operation(expr, GprOperatorType::Or, right)
                .map_err(|_| ParseError::InvalidBinaryOperator)?;
        }
        Ok(expr)
    }

    fn conjunction(&mut self) -> Result<Gpr, ParseError> {
        let mut expr = self.unary()?;
        while self.match_token(Token::And) {
            let right = self.unary()?;
            expr = Gpr::new_binary_operation(expr, GprOperatorType::And, right)
                .map_err(|_| ParseError::InvalidBinaryOperator)?;
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Gpr, ParseError> {
        if self.match_token(Token::Not) {
            let operand = self.unary()?;
            return Gpr::new_unary_operation(GprOperatorType::Not, operand)
                .map_err(|_| ParseError::InvalidUnaryOperator);
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Gpr, ParseError> {
        if let Some(identifier) = self.match_identifier() {
            self.insert_if_needed(&identifier);
            return Ok(Gpr::new_gene_node(&identifier));
        }

        if self.match_token(Token::LeftParen) {
            let expr = self.disjunction()?;
            self.consume(Token::RightParen, "Expect ')' after expression.")?;
            return Ok(expr);
        }

        Err(ParseError::ExpectedExpression)
    }

    // endregion Parsing Functions

    // region parsing helper functions

    /// If the current token is `token` advance past it and return true, otherwise return false
    fn match_token(&mut self, token: Token) -> bool {
        if self.check(&token) {
            self.advance();
            return true;
        }
        false
    }

    /// Similar to [`Self::match_token`], but for matching an identifier token. If the current
    /// token is an identifier return `Some(GeneId)`, otherwise return None
    fn match_identifier(&mut self) -> Option<String> {
        if let Token::Identifier(id) = self.peek() {
            let id = id.clone();
            self.advance();
            return Some(id);
        }
        None
    }

    /// Check whether the current token matches the provided `token`
    fn check(&self, token: &Token) -> bool {
        !self.is_at_end() && self.peek() == token
    }

    /// Advance `self.current` one position unless at the end of the token Vec
    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    /// Check whether the parser is at the end of the source Vec
    fn is_at_end(&self) -> bool {
        matches!(self.peek(), Token::Eof)
    }

    /// The current token (the lexer always terminates the stream with [`Token::Eof`])
    fn peek(&self) -> &Token {
        self.tokens.get(self.current).unwrap_or(&EOF_TOKEN)
    }

    /// Check whether the current token matches `token`, advancing if it does and returning
    /// an error otherwise. Used for matching parentheses.
    fn consume(&mut self, token: Token, msg: &str) -> Result<(), ParseError> {
        if self.check(&token) {
            self.advance();
            return Ok(());
        }

        Err(ParseError::MissingToken(msg.to_string()))
    }

    // endregion parsing helper functions

    /// Add a gene with `gene_id` to the gene map if it is not already there
    fn insert_if_needed(&mut self, gene_id: &str) {
        if !self.gene_map.contains_key(gene_id) {
            self.gene_map
                .insert(gene_id.to_string(), Gene::new(gene_id));
        }
    }
}

/// Enum representing possible parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseError {
    /// Token was expected to be a binary operator but was not
    #[error("Invalid binary operator encountered, expected only `and` and `or`")]
    InvalidBinaryOperator,
    /// Token was expected to be a unary operator but was not
    #[error("Invalid unary operator encountered, expected only `not`")]
    InvalidUnaryOperator,
    /// Missing expected token (e.g. a right parenthesis)
    #[error("Missing expected token: {0}")]
    MissingToken(String),
    /// No expression found when one was expected
    #[error("No expression found, check that the GPR string is not empty")]
    ExpectedExpression,
    /// Expression was not completed when parsing terminated
    #[error("Parsing terminated early, check for a `not` between two gene identifiers/grouped expressions")]
    EarlyTermination,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::gpr_parse::lexer::Lexer;
    use crate::metabolic_model::model::GprOperation;

    fn parse(rule: &str) -> Result<Gpr, ParseError> {
        let mut lexer = Lexer::new(rule);
        let token_vec: Vec<Token> = lexer.lex().unwrap();
        let mut gene_map = IndexMap::new();
        let mut parser = GPRParser::new(token_vec, &mut gene_map);
        parser.parse()
    }

    #[test]
    fn single_gene_parse() {
        match parse("Rv1304").unwrap() {
            Gpr::Operation(_) => {
                panic!("Incorrect Parse Result (Should have been single gene)")
            }
            Gpr::GeneNode(gene) => {
                if gene != "Rv1304" {
                    panic!("Wrong Gene");
                }
            }
        }
    }

    #[test]
    fn and_parse() {
        match parse("Rv1304 and Rv0023").unwrap() {
            Gpr::Operation(GprOperation::And { left, right }) => {
                assert_eq!(*left, Gpr::GeneNode("Rv1304".to_string()));
                assert_eq!(*right, Gpr::GeneNode("Rv0023".to_string()));
            }
            _ => panic!("Incorrect Parse Result (Should have been an AND operation)"),
        }
    }

    #[test]
    fn not_parse() {
        match parse("not Rv0023").unwrap() {
            Gpr::Operation(GprOperation::Not { val }) => {
                assert_eq!(*val, Gpr::GeneNode("Rv0023".to_string()))
            }
            _ => panic!("Incorrect Operation Parsed"),
        }
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let gpr = parse("Rv0001 or Rv0002 and Rv0003").unwrap();
        assert_eq!(gpr.to_string_id(), "(Rv0001 or (Rv0002 and Rv0003))");
        let gpr = parse("Rv0001 and Rv0002 or Rv0003").unwrap();
        assert_eq!(gpr.to_string_id(), "((Rv0001 and Rv0002) or Rv0003)");
    }

    #[test]
    fn grouping_parse() {
        match parse("(Rv3141 or Rv0023) and Rv0018").unwrap() {
            Gpr::Operation(GprOperation::And { left, right }) => {
                match *left {
                    Gpr::Operation(GprOperation::Or { .. }) => {}
                    _ => panic!("Should have parsed an OR operation"),
                }
                assert_eq!(*right, Gpr::GeneNode("Rv0018".to_string()));
            }
            _ => panic!("Incorrect Parse (should have been an AND operation)"),
        }
    }

    #[test]
    fn repeated_binary_parse() {
        let gpr = parse("Rv0001 and Rv0002 and Rv0003").unwrap();
        assert_eq!(gpr.to_string_id(), "((Rv0001 and Rv0002) and Rv0003)");
    }

    #[test]
    fn invalid_parse() {
        assert_eq!(
            parse("Rv0001 not Rv0023"),
            Err(ParseError::EarlyTermination)
        );
        assert!(matches!(
            parse("(Rv0001 or Rv0023"),
            Err(ParseError::MissingToken(_))
        ));
        assert_eq!(parse(""), Err(ParseError::ExpectedExpression));
    }
}
