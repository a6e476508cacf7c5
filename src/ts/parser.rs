use crate::ts::errors::TreeSitterError;
use ast_grep_language::{LanguageExt, SupportLang};
use std::str::FromStr;
use tracing::warn;
use tree_sitter::{Language, Parser, Tree};

/// Resolve a language by name (`go`, `rust`, `ts`, ...).
pub fn resolve_language(name: &str) -> Result<SupportLang, TreeSitterError> {
    SupportLang::from_str(name).map_err(|_| TreeSitterError::UnknownLanguage {
        name: name.to_string(),
    })
}

/// Tree-sitter parser wrapper for any language ast-grep ships.
pub struct SourceParser {
    parser: Parser,
    lang: SupportLang,
}

impl SourceParser {
    pub fn new(lang: SupportLang) -> Result<Self, TreeSitterError> {
        let mut parser = Parser::new();
        // Get the tree-sitter Language from ast-grep-language
        let ts_lang = lang.get_ts_language();
        parser
            .set_language(&ts_lang)
            .map_err(|_| TreeSitterError::LanguageSet)?;

        Ok(Self { parser, lang })
    }

    pub fn lang(&self) -> SupportLang {
        self.lang
    }

    pub fn language(&self) -> Language {
        self.lang.get_ts_language()
    }

    /// Parse source into a tree-sitter Tree.
    pub fn parse(&mut self, source: impl AsRef<[u8]>) -> Result<Tree, TreeSitterError> {
        self.parser
            .parse(source.as_ref(), None)
            .ok_or(TreeSitterError::ParseFailed)
    }

    /// Parse source and keep it alongside the tree.
    pub fn parse_with_source<'a>(
        &mut self,
        source: &'a [u8],
    ) -> Result<ParsedSource<'a>, TreeSitterError> {
        let tree = self.parse(source)?;
        let parsed = ParsedSource { source, tree };
        if parsed.has_errors() {
            warn!(lang = ?self.lang, "source parsed with syntax errors");
        }
        Ok(parsed)
    }
}

/// A parsed source buffer with its tree-sitter tree.
pub struct ParsedSource<'a> {
    pub source: &'a [u8],
    pub tree: Tree,
}

impl<'a> ParsedSource<'a> {
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Check if the tree contains any ERROR or MISSING nodes.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Bytes for a node's range, read straight from the buffer.
    ///
    /// A convenience for callers that hold the whole source anyway, e.g. to
    /// print accepted captures. Predicates never use it; they go through a
    /// [`TextProvider`](crate::provider::TextProvider).
    pub fn node_text(&self, node: tree_sitter::Node<'_>) -> &'a [u8] {
        self.source.get(node.byte_range()).unwrap_or_default()
    }
}
