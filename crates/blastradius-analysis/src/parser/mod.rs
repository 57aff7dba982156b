//! Thin boundary over the tree-sitter TypeScript grammars.
//!
//! This is the only module that touches tree-sitter types directly; the
//! extractor and walker consume [`ParsedFile`] handles.

use std::path::Path;

use tree_sitter::{Language, Node, Parser, Tree};

use blastradius_core::errors::ParseError;

/// A parsed source file: owns the text and the syntax tree.
pub struct ParsedFile {
    path: String,
    text: String,
    tree: Tree,
}

impl ParsedFile {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by `node`, trimmed.
    pub fn slice(&self, node: Node<'_>) -> &str {
        self.text.get(node.byte_range()).unwrap_or_default().trim()
    }
}

/// Parser adapter holding one parser per grammar variant.
pub struct TsParser {
    ts: Parser,
    tsx: Parser,
}

impl TsParser {
    pub fn new() -> Result<Self, ParseError> {
        Ok(Self {
            ts: make_parser(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into())?,
            tsx: make_parser(tree_sitter_typescript::LANGUAGE_TSX.into())?,
        })
    }

    /// Parse `text` as the file at `path`; grammar chosen by extension.
    pub fn parse(&mut self, path: &str, text: String) -> Result<ParsedFile, ParseError> {
        let parser = if Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("tsx"))
        {
            &mut self.tsx
        } else {
            &mut self.ts
        };

        let tree = parser.parse(&text, None).ok_or_else(|| ParseError::NoTree {
            path: path.to_string(),
        })?;

        Ok(ParsedFile {
            path: path.to_string(),
            text,
            tree,
        })
    }

    /// Parse the file at `path` from disk.
    pub fn parse_from_disk(&mut self, path: &str) -> Result<ParsedFile, ParseError> {
        let text = std::fs::read_to_string(path).map_err(|e| ParseError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        self.parse(path, text)
    }
}

fn make_parser(language: Language) -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::Language {
            message: e.to_string(),
        })?;
    Ok(parser)
}

/// Check if a node sits inside an ERROR subtree; references there are
/// unreliable and get skipped.
pub fn is_in_error(node: &Node<'_>) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.is_error() {
            return true;
        }
        current = parent.parent();
    }
    false
}
