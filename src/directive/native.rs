//! Front-end for the native `key = value` syntax

use std::collections::HashMap;

use lalrpop_util::ParseError;

use crate::directive::ast::{Directive, Schema, Statement};
use crate::directive::hyprlang_parser;
use crate::directive::lexer::{Lexer, LexerError, Token};
use crate::error::{CursorError, CursorResult};

/// Parse native source into directives.
///
/// Categories flatten to `category:key`, `$VARIABLES` are substituted into
/// later values, and keys outside the schema are rejected.
pub fn parse(source: &str, schema: &Schema) -> CursorResult<Vec<Directive>> {
    let statements = hyprlang_parser::DocumentParser::new()
        .parse(Lexer::new(source))
        .map_err(|e| CursorError::Parse(describe_error(source, e)))?;

    let mut flattener = Flattener {
        source,
        schema,
        variables: HashMap::new(),
        directives: Vec::new(),
    };
    flattener.walk(&statements, None)?;

    Ok(flattener.directives)
}

struct Flattener<'a> {
    source: &'a str,
    schema: &'a Schema,
    variables: HashMap<String, String>,
    directives: Vec<Directive>,
}

impl<'a> Flattener<'a> {
    fn walk(&mut self, statements: &[Statement], prefix: Option<&str>) -> CursorResult<()> {
        for statement in statements {
            match statement {
                Statement::Assign { key, value, offset } => {
                    let key = match prefix {
                        Some(prefix) => format!("{}:{}", prefix, key),
                        None => key.clone(),
                    };
                    let line = line_of(self.source, *offset);

                    if !self.schema.knows(&key) {
                        return Err(CursorError::Parse(format!(
                            "config option <{}> does not exist (line {})",
                            key, line
                        )));
                    }

                    let value = self.substitute(value);
                    self.directives.push(Directive::new(key, value).at_line(line));
                }
                Statement::Define { name, value, .. } => {
                    let value = self.substitute(value);
                    self.variables.insert(name.clone(), value);
                }
                Statement::Category { name, body, .. } => {
                    let nested = match prefix {
                        Some(prefix) => format!("{}:{}", prefix, name),
                        None => name.clone(),
                    };
                    self.walk(body, Some(&nested))?;
                }
            }
        }

        Ok(())
    }

    /// Replace `$NAME` references with previously defined values
    fn substitute(&self, value: &str) -> String {
        if !value.contains('$') {
            return value.to_string();
        }

        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos + 1..];
            let len = tail
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(tail.len());
            let name = &tail[..len];

            match self.variables.get(name) {
                Some(replacement) if !name.is_empty() => out.push_str(replacement),
                _ => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &tail[len..];
        }

        out.push_str(rest);
        out
    }
}

/// 1-based line number of a byte offset
fn line_of(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

fn describe_error(source: &str, err: ParseError<usize, Token, LexerError>) -> String {
    match err {
        ParseError::InvalidToken { location } => {
            format!("invalid token on line {}", line_of(source, location))
        }
        ParseError::UnrecognizedEof { location, .. } => {
            format!("unexpected end of input on line {}", line_of(source, location))
        }
        ParseError::UnrecognizedToken {
            token: (start, token, _),
            ..
        }
        | ParseError::ExtraToken {
            token: (start, token, _),
        } => format!("unexpected {} on line {}", token, line_of(source, start)),
        ParseError::User { error } => {
            format!("{} (line {})", error, line_of(source, error.span.start))
        }
    }
}
