//! Lexer for the native directive syntax using logos

use logos::Logos;
use std::fmt;

/// Token type for the native lexer
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")] // Skip horizontal whitespace
#[logos(skip r"#[^\n]*")] // Skip comments
pub enum Token {
    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token("\n")]
    Newline,

    // `$NAME`, stored without the sigil
    #[regex(r"\$[A-Za-z0-9_]+", |lex| lex.slice()[1..].to_string())]
    Variable(String),

    #[regex(r"[A-Za-z_][A-Za-z0-9_.:\-]*", |lex| lex.slice().to_string())]
    Key(String),

    // Everything after `=` up to a comment or the end of the line
    #[regex(r"=([^\n#]|##)*", |lex| unescape_value(lex.slice()))]
    Value(String),
}

fn unescape_value(slice: &str) -> String {
    slice[1..].trim().replace("##", "#")
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::BraceOpen => write!(f, "'{{'"),
            Token::BraceClose => write!(f, "'}}'"),
            Token::Newline => write!(f, "end of line"),
            Token::Variable(name) => write!(f, "variable '${}'", name),
            Token::Key(key) => write!(f, "key '{}'", key),
            Token::Value(value) => write!(f, "value '{}'", value),
        }
    }
}

/// Wrapper for lexer with position tracking.
///
/// Always terminates the stream with a newline so the last line does not
/// need one in the source.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, Token>,
    source: &'a str,
    last_was_newline: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            inner: Token::lexer(source),
            source,
            last_was_newline: true,
            finished: false,
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<(usize, Token, usize), LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let Some(token) = self.inner.next() else {
            self.finished = true;
            if self.last_was_newline {
                return None;
            }
            let end = self.source.len();
            return Some(Ok((end, Token::Newline, end)));
        };
        let span = self.inner.span();

        match token {
            Ok(tok) => {
                self.last_was_newline = tok == Token::Newline;
                Some(Ok((span.start, tok, span.end)))
            }
            Err(_) => Some(Err(LexerError {
                span: span.clone(),
                slice: self.source[span].to_string(),
            })),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LexerError {
    pub span: std::ops::Range<usize>,
    pub slice: String,
}

impl fmt::Display for LexerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unexpected token '{}' at position {}",
            self.slice, self.span.start
        )
    }
}

impl std::error::Error for LexerError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Vec<Token> {
        Lexer::new(source)
            .filter_map(|r| r.ok())
            .map(|(_, t, _)| t)
            .collect()
    }

    #[test]
    fn test_basic_tokens() {
        let tokens = tokens("hotspot_x = 0.5\n");

        assert_eq!(tokens[0], Token::Key("hotspot_x".to_string()));
        assert_eq!(tokens[1], Token::Value("0.5".to_string()));
        assert_eq!(tokens[2], Token::Newline);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_value_keeps_inner_spaces_and_commas() {
        let tokens = tokens("define_size = 24, left_ptr.png, 100");
        assert_eq!(tokens[1], Token::Value("24, left_ptr.png, 100".to_string()));
    }

    #[test]
    fn test_comments() {
        let source = r#"
            # full line comment
            name = Bibata # trailing comment
        "#;
        let tokens = tokens(source);

        assert!(tokens.contains(&Token::Key("name".to_string())));
        assert!(tokens.contains(&Token::Value("Bibata".to_string())));
        assert!(tokens
            .iter()
            .all(|t| !matches!(t, Token::Key(s) if s.contains("comment"))));
    }

    #[test]
    fn test_escaped_hash() {
        let tokens = tokens("description = issue ##42");
        assert_eq!(tokens[1], Token::Value("issue #42".to_string()));
    }

    #[test]
    fn test_variables_and_braces() {
        let tokens = tokens("$SIZE = 24\ngeneral {\n}");

        assert_eq!(tokens[0], Token::Variable("SIZE".to_string()));
        assert_eq!(tokens[1], Token::Value("24".to_string()));
        assert_eq!(tokens[3], Token::Key("general".to_string()));
        assert_eq!(tokens[4], Token::BraceOpen);
        assert_eq!(tokens[6], Token::BraceClose);
    }

    #[test]
    fn test_trailing_newline_is_synthesized_once() {
        let without = tokens("name = a");
        let with = tokens("name = a\n");
        assert_eq!(without, with);
        assert_eq!(without.last(), Some(&Token::Newline));
    }

    #[test]
    fn test_invalid_character_is_an_error() {
        let results: Vec<_> = Lexer::new("name = a\n@oops").collect();
        let err = results
            .into_iter()
            .find_map(|r| r.err())
            .expect("lexer should reject '@'");
        assert_eq!(err.slice, "@");
    }
}
