#![forbid(unsafe_code)]
//! Mindmark turns a Markdown document into a Freeplane mind map.
//!
//! Headings, list items and paragraphs become map nodes nested by heading
//! rank and list depth. Inline formatting and links are kept as rich content.
//!
//! # Example
//!
//! ```
//! let options = mindmark::MindmapOptions::default();
//! let xml = mindmark::convert_markdown_to_mindmap("# Plan\n- one\n- two", &options);
//! assert_eq!(
//!     xml,
//!     "<map version=\"freeplane 1.12.1\"><node TEXT=\"Plan\">\
//!      <node TEXT=\"one\"></node><node TEXT=\"two\"></node></node></map>"
//! );
//! ```

use std::io;
use std::path::PathBuf;

pub mod config;
pub mod front_matter;
pub mod token;
pub mod tree;
pub mod viewer;
pub mod xml;

pub use config::{BUILTIN_SCHEMA, Config, load_config, parse_config};
pub use front_matter::{FrontMatter, parse_front_matter, read_front_matter, split_front_matter};
pub use token::{BlockTag, Extensions, InlineLeaf, Token, tokenize};
pub use tree::{Level, Node, ROOT_LABEL, build_tree};
pub use xml::{MAP_VERSION, render_map, serialize_node};

#[derive(Debug, thiserror::Error)]
pub enum MindmapError {
    #[error("yaml parse error: {0}")]
    Yaml(String),
    #[error("schema validation error: {0}")]
    Schema(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to launch viewer `{viewer}`: {source}")]
    Launch {
        viewer: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, MindmapError>;

#[derive(Debug, Clone, Default)]
pub struct MindmapOptions {
    /// Label for the synthetic root of a document with several top-level blocks.
    pub title: Option<String>,
    pub extensions: Extensions,
}

impl MindmapOptions {
    pub fn new(title: Option<String>, extensions: Extensions) -> Self {
        Self { title, extensions }
    }
}

/// Tokenizes and builds the outline with default parser settings.
pub fn make_tree(markdown: &str) -> Node {
    make_tree_with(markdown, Extensions::default())
}

/// Builds the outline of `markdown` after dropping any leading front matter.
pub fn make_tree_with(markdown: &str, extensions: Extensions) -> Node {
    let (_, body) = split_front_matter(markdown);
    let tokens = tokenize(body, extensions);
    tracing::debug!(tokens = tokens.len(), "markdown tokenized");
    build_tree(tokens)
}

pub fn convert_markdown_to_mindmap(markdown: &str, options: &MindmapOptions) -> String {
    let mut root = make_tree_with(markdown, options.extensions);
    if let Some(title) = &options.title {
        if root.is_synthetic_root() {
            root.label = title.clone();
        }
    }
    render_map(&root)
}
