//! In-memory representation of a parsed configuration file.
use std::ops::Range;

/// A `tls <cert> <key>` entry. Only ever read from an existing block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    pub cert_path: String,
    pub key_path: String,
}

/// One line (or nested block) inside a [`BlockNode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// An opaque `key rest-of-line` directive. `value` is empty for bare keys.
    Scalar { key: String, value: String },
    /// The reserved `tls` directive.
    Tls(TlsMaterial),
    /// A nested `name { ... }` block.
    Block(BlockNode),
}

/// A named, brace-delimited block and its entries in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockNode {
    pub name: String,
    pub entries: Vec<Entry>,
    /// Byte range of the block in the source text, from the start of the opening line to the
    /// end of the closing `}` line (line terminator excluded).
    pub span: Range<usize>,
}

impl BlockNode {
    pub fn new(name: impl Into<String>) -> Self {
        BlockNode {
            name: name.into(),
            entries: Vec::new(),
            span: 0..0,
        }
    }

    /// The last `tls` entry of this block, if any. Nested blocks are not searched.
    pub fn tls(&self) -> Option<&TlsMaterial> {
        self.entries.iter().rev().find_map(|entry| match entry {
            Entry::Tls(tls) => Some(tls),
            _ => None,
        })
    }

    /// The last scalar value stored under `key`.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.entries.iter().rev().find_map(|entry| match entry {
            Entry::Scalar { key: k, value } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// The last nested block named `name`.
    pub fn child(&self, name: &str) -> Option<&BlockNode> {
        self.entries.iter().rev().find_map(|entry| match entry {
            Entry::Block(block) if block.name == name => Some(block),
            _ => None,
        })
    }
}

/// The result of [`ConfigDocument::rewrite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    /// `true` when no root-level block for the domain existed and the new one was appended.
    pub created: bool,
}

/// A whole configuration file: its source text and its root-level blocks, addressed by domain
/// name.
///
/// Documents are built fresh from disk for every update and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigDocument {
    source: String,
    blocks: Vec<BlockNode>,
}

impl ConfigDocument {
    pub(crate) fn new(source: String, blocks: Vec<BlockNode>) -> Self {
        ConfigDocument { source, blocks }
    }

    pub fn blocks(&self) -> &[BlockNode] {
        &self.blocks
    }

    /// Look up a root-level block by exact name. Duplicate names resolve to the last one.
    pub fn block(&self, name: &str) -> Option<&BlockNode> {
        self.blocks.iter().rev().find(|block| block.name == name)
    }

    /// The verbatim source text of a block belonging to this document.
    pub fn source_of(&self, block: &BlockNode) -> &str {
        self.source.get(block.span.clone()).unwrap_or_default()
    }

    /// Render the document with the root-level block `name` replaced by `rendered`.
    ///
    /// The first block named `name` is replaced in place and any later duplicates are dropped.
    /// If there is none, `rendered` is appended. Every other root-level block is emitted exactly
    /// as it appeared in the source. Root-level blocks are separated by one blank line and the
    /// text ends with a newline.
    pub fn rewrite(&self, name: &str, rendered: &str) -> Rewrite {
        let mut sections: Vec<&str> = Vec::with_capacity(self.blocks.len() + 1);
        let mut replaced = false;
        for block in &self.blocks {
            if block.name != name {
                sections.push(self.source_of(block));
            } else if !replaced {
                sections.push(rendered);
                replaced = true;
            } else {
                tracing::warn!("dropping duplicate block for \"{name}\"");
            }
        }
        if !replaced {
            sections.push(rendered);
        }

        let mut text = sections.join("\n\n");
        text.push('\n');
        Rewrite {
            text,
            created: !replaced,
        }
    }
}
