//! Flat block/inline token stream over `pulldown-cmark` events.
//!
//! `pulldown-cmark` reports inline events one by one and does not track how
//! deeply a block is nested. The tree builder wants the classic shape instead:
//! block open/close tokens carrying a nesting level, and one inline token per
//! leaf block holding its text and markup leaves.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Block kinds the tree builder distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockTag {
    Heading(u8),
    BulletList,
    OrderedList,
    ListItem,
    Paragraph,
    BlockQuote,
    CodeBlock,
    HtmlBlock,
    TableCell,
    Other(&'static str),
}

impl BlockTag {
    pub fn name(&self) -> &'static str {
        match self {
            BlockTag::Heading(1) => "h1",
            BlockTag::Heading(2) => "h2",
            BlockTag::Heading(3) => "h3",
            BlockTag::Heading(4) => "h4",
            BlockTag::Heading(5) => "h5",
            BlockTag::Heading(_) => "h6",
            BlockTag::BulletList => "ul",
            BlockTag::OrderedList => "ol",
            BlockTag::ListItem => "li",
            BlockTag::Paragraph => "p",
            BlockTag::BlockQuote => "blockquote",
            BlockTag::CodeBlock => "pre",
            BlockTag::HtmlBlock => "html",
            BlockTag::TableCell => "td",
            BlockTag::Other(name) => name,
        }
    }

    pub fn is_list(&self) -> bool {
        matches!(self, BlockTag::BulletList | BlockTag::OrderedList)
    }

    pub fn is_heading(&self) -> bool {
        matches!(self, BlockTag::Heading(_))
    }

    fn hosts_inline(&self) -> bool {
        matches!(
            self,
            BlockTag::Heading(_)
                | BlockTag::Paragraph
                | BlockTag::CodeBlock
                | BlockTag::HtmlBlock
                | BlockTag::TableCell
        )
    }
}

/// A leaf of an inline token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineLeaf {
    Text(String),
    Open {
        tag: &'static str,
        attrs: Vec<(String, String)>,
    },
    Close {
        tag: &'static str,
    },
}

impl InlineLeaf {
    pub fn text(content: impl Into<String>) -> Self {
        InlineLeaf::Text(content.into())
    }

    pub fn is_markup(&self) -> bool {
        !matches!(self, InlineLeaf::Text(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Open { tag: BlockTag, level: usize },
    Close { tag: BlockTag, level: usize },
    Inline(Vec<InlineLeaf>),
}

/// Markdown syntax extensions passed through to the parser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Extensions {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub footnotes: bool,
}

impl Extensions {
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.tasklists {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        if self.footnotes {
            options.insert(Options::ENABLE_FOOTNOTES);
        }
        options
    }
}

pub fn tokenize(markdown: &str, extensions: Extensions) -> Vec<Token> {
    let parser = Parser::new_ext(markdown, extensions.parser_options());
    tokenize_events(parser)
}

pub fn tokenize_events<'a, I>(events: I) -> Vec<Token>
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut writer = TokenWriter::default();
    for event in events {
        match event {
            Event::Start(tag) => writer.start(tag),
            Event::End(tag_end) => writer.end(tag_end),
            Event::Text(text) => writer.push_leaf(InlineLeaf::Text(text.into_string())),
            Event::Code(code) => {
                writer.push_leaf(InlineLeaf::Open {
                    tag: "code",
                    attrs: Vec::new(),
                });
                writer.push_leaf(InlineLeaf::Text(code.into_string()));
                writer.push_leaf(InlineLeaf::Close { tag: "code" });
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                writer.push_leaf(InlineLeaf::Text(html.into_string()));
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                writer.push_leaf(InlineLeaf::Text(math.into_string()));
            }
            Event::FootnoteReference(label) => {
                writer.push_leaf(InlineLeaf::Text(format!("[^{label}]")));
            }
            Event::SoftBreak | Event::HardBreak => writer.push_leaf(InlineLeaf::text(" ")),
            Event::TaskListMarker(checked) => {
                let marker = if checked { "[x] " } else { "[ ] " };
                writer.push_leaf(InlineLeaf::text(marker));
            }
            Event::Rule => {}
        }
    }
    writer.finish()
}

enum StartKind {
    Block(BlockTag),
    Markup(InlineLeaf),
    Transparent,
}

enum EndKind {
    Block,
    Markup(&'static str),
    Transparent,
}

#[derive(Debug, Default)]
struct InlineRun {
    leaves: Vec<InlineLeaf>,
    synthetic: bool,
}

#[derive(Debug, Default)]
struct TokenWriter {
    tokens: Vec<Token>,
    open: Vec<BlockTag>,
    run: Option<InlineRun>,
}

impl TokenWriter {
    fn start(&mut self, tag: Tag<'_>) {
        match classify_start(tag) {
            StartKind::Block(block) => {
                self.flush_synthetic();
                self.tokens.push(Token::Open {
                    tag: block,
                    level: self.open.len(),
                });
                self.open.push(block);
                if block.hosts_inline() {
                    self.run = Some(InlineRun::default());
                }
            }
            StartKind::Markup(leaf) => self.push_leaf(leaf),
            StartKind::Transparent => {
                self.ensure_run();
            }
        }
    }

    fn end(&mut self, tag_end: TagEnd) {
        match classify_end(tag_end) {
            EndKind::Block => self.close_block(),
            EndKind::Markup(tag) => self.push_leaf(InlineLeaf::Close { tag }),
            EndKind::Transparent => {}
        }
    }

    fn push_leaf(&mut self, leaf: InlineLeaf) {
        self.ensure_run().leaves.push(leaf);
    }

    fn ensure_run(&mut self) -> &mut InlineRun {
        if self.run.is_none() {
            self.tokens.push(Token::Open {
                tag: BlockTag::Paragraph,
                level: self.open.len(),
            });
            self.open.push(BlockTag::Paragraph);
        }
        self.run.get_or_insert_with(|| InlineRun {
            leaves: Vec::new(),
            synthetic: true,
        })
    }

    fn flush_synthetic(&mut self) {
        if self.run.as_ref().is_some_and(|run| run.synthetic) {
            self.close_top();
        }
    }

    fn close_block(&mut self) {
        self.flush_synthetic();
        self.close_top();
    }

    fn close_top(&mut self) {
        if let Some(run) = self.run.take() {
            self.tokens.push(Token::Inline(run.leaves));
        }
        if let Some(tag) = self.open.pop() {
            self.tokens.push(Token::Close {
                tag,
                level: self.open.len(),
            });
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush_synthetic();
        self.tokens
    }
}

fn classify_start(tag: Tag<'_>) -> StartKind {
    match tag {
        Tag::Paragraph => StartKind::Block(BlockTag::Paragraph),
        Tag::Heading { level, .. } => StartKind::Block(BlockTag::Heading(heading_level_to_u8(level))),
        Tag::BlockQuote(_) => StartKind::Block(BlockTag::BlockQuote),
        Tag::CodeBlock(_) => StartKind::Block(BlockTag::CodeBlock),
        Tag::HtmlBlock => StartKind::Block(BlockTag::HtmlBlock),
        Tag::List(Some(_)) => StartKind::Block(BlockTag::OrderedList),
        Tag::List(None) => StartKind::Block(BlockTag::BulletList),
        Tag::Item => StartKind::Block(BlockTag::ListItem),
        Tag::Table(_) => StartKind::Block(BlockTag::Other("table")),
        Tag::TableHead => StartKind::Block(BlockTag::Other("thead")),
        Tag::TableRow => StartKind::Block(BlockTag::Other("tr")),
        Tag::TableCell => StartKind::Block(BlockTag::TableCell),
        Tag::FootnoteDefinition(_) => StartKind::Block(BlockTag::Other("footnote")),
        Tag::Emphasis => StartKind::Markup(InlineLeaf::Open {
            tag: "em",
            attrs: Vec::new(),
        }),
        Tag::Strong => StartKind::Markup(InlineLeaf::Open {
            tag: "strong",
            attrs: Vec::new(),
        }),
        Tag::Strikethrough => StartKind::Markup(InlineLeaf::Open {
            tag: "s",
            attrs: Vec::new(),
        }),
        Tag::Link {
            dest_url, title, ..
        } => {
            let mut attrs = vec![("href".to_string(), dest_url.into_string())];
            if !title.is_empty() {
                attrs.push(("title".to_string(), title.into_string()));
            }
            StartKind::Markup(InlineLeaf::Open { tag: "a", attrs })
        }
        Tag::Image { .. } => StartKind::Transparent,
        // Definition lists and metadata blocks are only produced when their
        // parser extensions are on; keep them as opaque containers.
        _ => StartKind::Block(BlockTag::Other("block")),
    }
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn classify_end(tag_end: TagEnd) -> EndKind {
    match tag_end {
        TagEnd::Emphasis => EndKind::Markup("em"),
        TagEnd::Strong => EndKind::Markup("strong"),
        TagEnd::Strikethrough => EndKind::Markup("s"),
        TagEnd::Link => EndKind::Markup("a"),
        TagEnd::Image => EndKind::Transparent,
        _ => EndKind::Block,
    }
}
