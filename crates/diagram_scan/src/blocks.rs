//! Flattening of markdown into a sequence of leaf blocks.
//!
//! The diagram extractor only needs three things from a tokenizer: fenced code
//! blocks with their info string and body, raw HTML blocks, and a notion of
//! "the next block". `pulldown-cmark` emits nested start/end events, so they
//! are folded here into a flat list where container boundaries (lists, items,
//! block quotes) appear as [`Block::Other`]. A fence that closes a list item is
//! therefore never paired with an HTML comment that opens the next one.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag};

/// One top-level unit of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A fenced code block.
    Fence {
        /// The raw info string after the opening fence.
        info: String,
        /// The block body, exactly as written.
        body: String,
        /// 1-based line of the opening fence.
        line: usize,
    },
    /// A raw HTML block, including comments.
    Html {
        /// The HTML source.
        content: String,
    },
    /// Any other block, or a container boundary.
    Other,
}

enum Leaf {
    Fence { info: String, body: String, line: usize },
    Html(String),
    Other,
}

impl Leaf {
    fn into_block(self) -> Block {
        match self {
            Leaf::Fence { info, body, line } => Block::Fence { info, body, line },
            Leaf::Html(content) => Block::Html { content },
            Leaf::Other => Block::Other,
        }
    }
}

/// Splits `markdown` into leaf blocks.
pub fn tokenize(markdown: &str) -> Vec<Block> {
    let lines = LineIndex::new(markdown);
    let mut blocks = Vec::new();
    // The leaf being assembled and the depth of inline tags open inside it.
    let mut current: Option<(Leaf, usize)> = None;

    for (event, range) in Parser::new_ext(markdown, Options::empty()).into_offset_iter() {
        match event {
            Event::Start(tag) => {
                if let Some((_, nested)) = current.as_mut() {
                    *nested += 1;
                    continue;
                }
                match tag {
                    Tag::CodeBlock(CodeBlockKind::Fenced(info)) => {
                        current = Some((
                            Leaf::Fence {
                                info: info.to_string(),
                                body: String::new(),
                                line: lines.line_of(range.start),
                            },
                            0,
                        ));
                    }
                    Tag::HtmlBlock => current = Some((Leaf::Html(String::new()), 0)),
                    Tag::CodeBlock(CodeBlockKind::Indented)
                    | Tag::Paragraph
                    | Tag::Heading { .. }
                    | Tag::Table(_)
                    | Tag::MetadataBlock(_) => current = Some((Leaf::Other, 0)),
                    _ => blocks.push(Block::Other),
                }
            }
            Event::End(_) => match current.take() {
                Some((leaf, 0)) => blocks.push(leaf.into_block()),
                Some((leaf, nested)) => current = Some((leaf, nested - 1)),
                None => blocks.push(Block::Other),
            },
            Event::Text(text) => {
                if let Some((Leaf::Fence { body, .. }, _)) = current.as_mut() {
                    body.push_str(&text);
                }
            }
            Event::Html(html) => {
                if let Some((Leaf::Html(content), _)) = current.as_mut() {
                    content.push_str(&html);
                }
            }
            Event::Rule => {
                if current.is_none() {
                    blocks.push(Block::Other);
                }
            }
            _ => {}
        }
    }

    if let Some((leaf, _)) = current {
        blocks.push(leaf.into_block());
    }
    blocks
}

/// Byte offset to line number lookup.
struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        Self {
            newlines: text.match_indices('\n').map(|(i, _)| i).collect(),
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        self.newlines.partition_point(|&nl| nl < offset) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fence_with_info_and_body() {
        let blocks = tokenize("# Title\n\n```mermaid\ngraph TD; A-->B\n```\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], Block::Other);
        assert_eq!(
            blocks[1],
            Block::Fence {
                info: "mermaid".to_string(),
                body: "graph TD; A-->B\n".to_string(),
                line: 3,
            }
        );
    }

    #[test]
    fn html_comment_after_fence() {
        let md = "```plantuml\nX\n```\n<!-- diagram id=\"login-flow\" -->\n";
        let blocks = tokenize(md);
        assert!(matches!(blocks[0], Block::Fence { .. }));
        match &blocks[1] {
            Block::Html { content } => assert!(content.contains("id=\"login-flow\"")),
            other => panic!("expected html block, got {other:?}"),
        }
    }

    #[test]
    fn inline_markup_stays_inside_paragraph() {
        let blocks = tokenize("Some *emphasis* and `code`.\n\n```d2\na -> b\n```\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], Block::Other);
        assert!(matches!(blocks[1], Block::Fence { .. }));
    }

    #[test]
    fn list_items_separate_fence_from_next_item() {
        let md = "- item\n\n  ```mermaid\n  graph LR; A-->B\n  ```\n- <!-- diagram id=\"x\" -->\n";
        let blocks = tokenize(md);
        let fence = blocks
            .iter()
            .position(|b| matches!(b, Block::Fence { .. }))
            .unwrap();
        assert_eq!(blocks[fence + 1], Block::Other);
    }

    #[test]
    fn indented_code_is_not_a_fence() {
        let blocks = tokenize("    mermaid\n    graph\n");
        assert_eq!(blocks, vec![Block::Other]);
    }

    #[test]
    fn thematic_break_is_a_block() {
        let blocks = tokenize("```d2\na\n```\n\n---\n\n<!-- diagram id=\"x\" -->\n");
        assert!(matches!(blocks[0], Block::Fence { .. }));
        assert_eq!(blocks[1], Block::Other);
        assert!(matches!(blocks[2], Block::Html { .. }));
    }

    #[test]
    fn line_numbers_are_one_based() {
        let md = "a\n\nb\n\n```graphviz\ndigraph {}\n```\n";
        match &tokenize(md)[2] {
            Block::Fence { line, .. } => assert_eq!(*line, 5),
            other => panic!("expected fence, got {other:?}"),
        }
    }
}
