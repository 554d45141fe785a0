use crate::document::Analyzer;

use super::parser::SyntaxError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    And,
    Or,
    Not,
    /// An operand word after analysis. Usually one term; empty for a stop
    /// word, several for a word the analyzer splits (`e-mail`).
    Term { word: String, terms: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Zero-based index of the token in the query.
    pub position: usize,
}

/// Split a boolean query into operators, parentheses and analyzed operands.
///
/// Operators are matched case-insensitively. A word without any alphanumeric
/// character is rejected as an unknown operator.
pub fn lex(raw: &str, analyzer: &Analyzer) -> Result<Vec<Token>, SyntaxError> {
    let mut words: Vec<String> = Vec::new();
    let mut buf = String::new();
    for ch in raw.chars() {
        if ch == '(' || ch == ')' || ch.is_whitespace() {
            if !buf.is_empty() {
                words.push(std::mem::take(&mut buf));
            }
            if !ch.is_whitespace() {
                words.push(ch.to_string());
            }
        } else {
            buf.push(ch);
        }
    }
    if !buf.is_empty() {
        words.push(buf);
    }

    words
        .into_iter()
        .enumerate()
        .map(|(position, word)| {
            let kind = match word.to_uppercase().as_str() {
                "(" => TokenKind::LParen,
                ")" => TokenKind::RParen,
                "AND" => TokenKind::And,
                "OR" => TokenKind::Or,
                "NOT" => TokenKind::Not,
                _ if !word.chars().any(char::is_alphanumeric) => {
                    return Err(SyntaxError::UnknownOperator {
                        token: word,
                        position,
                    });
                }
                _ => TokenKind::Term {
                    terms: analyzer.analyze(&word),
                    word: word.to_lowercase(),
                },
            };
            Ok(Token { kind, position })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(raw: &str) -> Vec<TokenKind> {
        lex(raw, &Analyzer::default())
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn parentheses_split_without_spaces() {
        assert_eq!(
            kinds("(cat)or dog"),
            vec![
                TokenKind::LParen,
                TokenKind::Term { word: "cat".into(), terms: vec!["cat".into()] },
                TokenKind::RParen,
                TokenKind::Or,
                TokenKind::Term { word: "dog".into(), terms: vec!["dog".into()] },
            ]
        );
    }

    #[test]
    fn symbol_operators_are_unknown() {
        let err = lex("cat && dog", &Analyzer::default()).unwrap_err();
        assert_eq!(
            err,
            SyntaxError::UnknownOperator { token: "&&".into(), position: 1 }
        );
    }
}
