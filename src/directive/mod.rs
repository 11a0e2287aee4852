//! Directive parser - native and TOML metadata syntaxes
//!
//! Both syntaxes produce the same ordered list of [`Directive`] records. The
//! manifest and shape-meta readers only consume those records, so validation
//! is identical whatever the source syntax was.

pub mod ast;
pub mod lexer;
pub mod native;
pub mod table;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

// The lalrpop generated parser (generated at build time)
// lalrpop generates to $OUT_DIR/directive/hyprlang.rs from src/directive/hyprlang.lalrpop
lalrpop_mod!(#[allow(clippy::all)] pub hyprlang_parser, "/directive/hyprlang.rs");

pub use ast::{Directive, Schema, Statement};
pub use lexer::{Lexer, LexerError, Token};

use crate::error::CursorResult;

/// Metadata syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// `key = value` lines, `.hl` files
    Native,
    /// `[General]` table, `.toml` files
    Toml,
}

impl Syntax {
    /// Order in which extensions are tried for an extension-less base path
    pub const LOOKUP_ORDER: [Syntax; 2] = [Syntax::Native, Syntax::Toml];

    pub fn extension(self) -> &'static str {
        match self {
            Syntax::Native => "hl",
            Syntax::Toml => "toml",
        }
    }

    /// `base` with this syntax's extension appended (`manifest` -> `manifest.hl`)
    pub fn file_for(self, base: &Path) -> PathBuf {
        let mut name = OsString::from(base.as_os_str());
        name.push(".");
        name.push(self.extension());
        PathBuf::from(name)
    }

    /// Entry name inside an archive (`meta` -> `meta.hl`)
    pub fn entry_for(self, stem: &str) -> String {
        format!("{}.{}", stem, self.extension())
    }
}

/// Find the first existing `<base>.hl` / `<base>.toml` file
pub fn find_source(base: &Path) -> Option<(PathBuf, Syntax)> {
    Syntax::LOOKUP_ORDER.iter().find_map(|&syntax| {
        let path = syntax.file_for(base);
        path.is_file().then_some((path, syntax))
    })
}

/// Parse source text in the given syntax
pub fn parse(source: &str, syntax: Syntax, schema: &Schema) -> CursorResult<Vec<Directive>> {
    match syntax {
        Syntax::Native => native::parse(source, schema),
        Syntax::Toml => table::parse(source, schema),
    }
}
