use thiserror::Error;

use crate::document::Analyzer;

use super::lexer::{lex, Token, TokenKind};
use super::Expr;

/// Malformed boolean query. Positions are token indexes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Empty boolean query")]
    EmptyQuery,
    #[error("Unmatched parenthesis at token {position}")]
    UnmatchedParenthesis { position: usize },
    #[error("Missing operand at token {position}")]
    MissingOperand { position: usize },
    #[error("Unknown operator {token:?} at token {position}")]
    UnknownOperator { token: String, position: usize },
    #[error("Nesting deeper than {limit} levels at token {position}")]
    NestingTooDeep { position: usize, limit: usize },
    #[error("Boolean query has {tokens} tokens; at most {limit} are accepted")]
    TooManyTokens { tokens: usize, limit: usize },
}

/// Deepest accepted run of nested parentheses and `NOT`s.
pub const MAX_NESTING: usize = 64;

/// Longest accepted query. Also bounds the depth of the expression tree,
/// which evaluation walks recursively.
pub const MAX_TOKENS: usize = 1024;

/// Parse a boolean query into an expression tree.
///
/// Precedence, tightest first: `NOT`, `AND`, `OR`. Parentheses override it
/// and adjacent operands are joined by an implicit `AND`.
///
/// ```text
/// or   := and ("OR" and)*
/// and  := not (["AND"] not)*
/// not  := "NOT" not | atom
/// atom := TERM | "(" or ")"
/// ```
pub fn parse(raw: &str, analyzer: &Analyzer) -> Result<Expr, SyntaxError> {
    let tokens = lex(raw, analyzer)?;
    if tokens.is_empty() {
        return Err(SyntaxError::EmptyQuery);
    }
    if tokens.len() > MAX_TOKENS {
        return Err(SyntaxError::TooManyTokens {
            tokens: tokens.len(),
            limit: MAX_TOKENS,
        });
    }

    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        depth: 0,
    };
    let expr = parser.or_expr()?;

    // Only a stray closing parenthesis can stop the top-level loop early.
    if let Some(token) = parser.peek() {
        return Err(SyntaxError::UnmatchedParenthesis {
            position: token.position,
        });
    }
    Ok(expr)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn enter(&mut self, position: usize) -> Result<(), SyntaxError> {
        if self.depth == MAX_NESTING {
            return Err(SyntaxError::NestingTooDeep {
                position,
                limit: MAX_NESTING,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&'a TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn or_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.and_expr()?;
        while let Some(TokenKind::Or) = self.peek_kind() {
            self.pos += 1;
            let rhs = self.and_expr()?;
            lhs = Expr::Or(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn and_expr(&mut self) -> Result<Expr, SyntaxError> {
        let mut lhs = self.not_expr()?;
        loop {
            match self.peek_kind() {
                Some(TokenKind::And) => self.pos += 1,
                Some(TokenKind::Term { .. }) | Some(TokenKind::LParen) | Some(TokenKind::Not) => {}
                _ => break,
            }
            let rhs = self.not_expr()?;
            lhs = Expr::And(Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn not_expr(&mut self) -> Result<Expr, SyntaxError> {
        if let Some(TokenKind::Not) = self.peek_kind() {
            self.enter(self.pos)?;
            self.pos += 1;
            let inner = self.not_expr()?;
            self.depth -= 1;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.atom()
    }

    fn atom(&mut self) -> Result<Expr, SyntaxError> {
        match self.advance() {
            Some(Token {
                kind: TokenKind::Term { word, terms },
                ..
            }) => Ok(Expr::from_terms(word, terms)),
            Some(Token {
                kind: TokenKind::LParen,
                position,
            }) => {
                self.enter(*position)?;
                let inner = self.or_expr()?;
                self.depth -= 1;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => Ok(inner),
                    _ => Err(SyntaxError::UnmatchedParenthesis {
                        position: *position,
                    }),
                }
            }
            Some(token) => Err(SyntaxError::MissingOperand {
                position: token.position,
            }),
            None => Err(SyntaxError::MissingOperand {
                position: self.tokens.len(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(raw: &str) -> String {
        parse(raw, &Analyzer::default()).unwrap().to_string()
    }

    #[test]
    fn not_binds_tighter_than_and_than_or() {
        assert_eq!(render("cat OR dog AND NOT bird"), "(cat OR (dog AND NOT bird))");
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(render("(cat OR dog) AND bird"), "((cat OR dog) AND bird)");
    }

    #[test]
    fn adjacent_operands_are_conjoined() {
        assert_eq!(render("machine learning"), "(machine AND learning)");
    }

    #[test]
    fn empty_parentheses_miss_an_operand() {
        let err = parse("()", &Analyzer::default()).unwrap_err();
        assert_eq!(err, SyntaxError::MissingOperand { position: 1 });
    }

    #[test]
    fn stray_closing_parenthesis_is_unmatched() {
        let err = parse("cat ) dog", &Analyzer::default()).unwrap_err();
        assert_eq!(err, SyntaxError::UnmatchedParenthesis { position: 1 });
    }

    #[test]
    fn nesting_is_capped() {
        let nested = format!("{}cat{}", "(".repeat(MAX_NESTING), ")".repeat(MAX_NESTING));
        assert_eq!(render(&nested), "cat");

        let too_deep = format!("{}cat{}", "(".repeat(MAX_NESTING + 1), ")".repeat(MAX_NESTING + 1));
        assert_eq!(
            parse(&too_deep, &Analyzer::default()),
            Err(SyntaxError::NestingTooDeep { position: MAX_NESTING, limit: MAX_NESTING })
        );

        let negations = format!("{}cat", "NOT ".repeat(MAX_NESTING + 1));
        assert!(matches!(
            parse(&negations, &Analyzer::default()),
            Err(SyntaxError::NestingTooDeep { .. })
        ));
    }

    #[test]
    fn oversized_queries_are_rejected() {
        let huge = format!("{}cat", "(".repeat(100_000));
        assert_eq!(
            parse(&huge, &Analyzer::default()),
            Err(SyntaxError::TooManyTokens { tokens: 100_001, limit: MAX_TOKENS })
        );
        let long = "cat ".repeat(MAX_TOKENS + 1);
        assert!(matches!(
            parse(&long, &Analyzer::default()),
            Err(SyntaxError::TooManyTokens { .. })
        ));
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert_eq!(parse("   ", &Analyzer::default()), Err(SyntaxError::EmptyQuery));
    }
}
