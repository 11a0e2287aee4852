//! AST types for the directive parser

/// One statement of the native syntax, as produced by the grammar
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `key = value`
    Assign {
        key: String,
        value: String,
        offset: usize,
    },
    /// `$NAME = value`
    Define {
        name: String,
        value: String,
        offset: usize,
    },
    /// `name { ... }`
    Category {
        name: String,
        body: Vec<Statement>,
        offset: usize,
    },
}

/// Normalized directive record.
///
/// Both syntaxes are reduced to an ordered list of these before any reader
/// interprets them.
#[derive(Debug, Clone, PartialEq)]
pub struct Directive {
    pub key: String,
    pub value: String,
    /// Source line, when the syntax tracks one
    pub line: Option<usize>,
}

impl Directive {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            line: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Human readable location suffix for error messages
    pub fn location(&self) -> String {
        match self.line {
            Some(line) => format!(" (line {})", line),
            None => String::new(),
        }
    }
}

/// Keys a reader understands
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    /// Single-valued keys, last assignment wins
    pub values: &'static [&'static str],
    /// Repeatable keys handled one directive at a time
    pub repeatable: &'static [&'static str],
}

impl Schema {
    pub fn knows(&self, key: &str) -> bool {
        self.values.contains(&key) || self.is_repeatable(key)
    }

    pub fn is_repeatable(&self, key: &str) -> bool {
        self.repeatable.contains(&key)
    }
}
