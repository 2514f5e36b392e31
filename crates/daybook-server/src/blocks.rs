use serde_json::{json, Value};

/// Chunk size for raw diary text stored on the "Raw Diary Text" subpage.
pub const RAW_TEXT_CHUNK_SIZE: usize = 1900;

/// One rendered content block. The markdown classifier produces these; the
/// store client serializes them at the wire boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading(u8, String),
    Bullet(String),
    Divider,
    Paragraph(String),
}

impl Block {
    pub fn to_json(&self) -> Value {
        match self {
            Block::Heading(level, text) => {
                let kind = match level {
                    1 => "heading_1",
                    2 => "heading_2",
                    _ => "heading_3",
                };
                json!({
                    "object": "block",
                    "type": kind,
                    (kind): { "rich_text": rich_text(text) },
                })
            }
            Block::Bullet(text) => json!({
                "object": "block",
                "type": "bulleted_list_item",
                "bulleted_list_item": { "rich_text": rich_text(text) },
            }),
            Block::Divider => json!({
                "object": "block",
                "type": "divider",
                "divider": {},
            }),
            Block::Paragraph(text) => json!({
                "object": "block",
                "type": "paragraph",
                "paragraph": { "rich_text": rich_text(text) },
            }),
        }
    }
}

fn rich_text(content: &str) -> Value {
    json!([{ "type": "text", "text": { "content": content } }])
}

/// Line-oriented markdown classifier. Each non-empty trimmed line maps to
/// exactly one block; blank lines are dropped. Inline formatting passes
/// through as literal text.
pub fn markdown_to_blocks(markdown: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    for line in markdown.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let block = if let Some(rest) = line.strip_prefix("### ") {
            Block::Heading(3, rest.to_string())
        } else if let Some(rest) = line.strip_prefix("## ") {
            Block::Heading(2, rest.to_string())
        } else if let Some(rest) = line.strip_prefix("# ") {
            Block::Heading(1, rest.to_string())
        } else if let Some(rest) = line
            .strip_prefix("- ")
            .or_else(|| line.strip_prefix("* "))
        {
            Block::Bullet(rest.to_string())
        } else if line == "---" {
            Block::Divider
        } else {
            Block::Paragraph(line.to_string())
        };
        blocks.push(block);
    }
    blocks
}

/// Fixed-width slicing by characters; the last chunk may be shorter. No word
/// boundary awareness.
pub fn split_into_chunks(text: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_size)
        .map(|chunk| chunk.iter().collect())
        .collect()
}
