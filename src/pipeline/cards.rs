use serde::{Deserialize, Serialize};

/// Title given to text that appears before any `Insight` label.
pub const DEFAULT_TITLE: &str = "Key Insight";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightCard {
    pub title: String,
    pub finding: String,
    pub action: String,
}

impl InsightCard {
    fn untitled() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            finding: String::new(),
            action: String::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.finding.is_empty() && self.action.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Insight,
    Action,
    Plain,
}

/// Splits generated insight text into cards, in order of appearance.
///
/// An `Insight ...:` block opens a new card, an `Action:` block sets the
/// action of the open card, and anything else is appended to the open
/// card's finding. Cards with neither finding nor action are dropped.
pub fn summary_to_cards(text: &str) -> Vec<InsightCard> {
    let mut cards = Vec::new();
    let mut current = InsightCard::untitled();

    for block in segment_blocks(text) {
        match label_of(&block) {
            Label::Insight => {
                flush(&mut cards, std::mem::replace(&mut current, InsightCard::untitled()));
                let (title, finding) = match split_label(&block) {
                    Some((head, rest)) => (clean(strip_markers(head)), clean(rest)),
                    None => (format!("Insight {}", cards.len() + 1), clean(&block)),
                };
                current.title = title;
                current.finding = finding;
            }
            Label::Action => {
                current.action = match split_label(&block) {
                    Some((_, rest)) => clean(rest),
                    None => clean(&block),
                };
            }
            Label::Plain => {
                if !current.finding.is_empty() {
                    current.finding.push(' ');
                }
                current.finding.push_str(&block);
            }
        }
    }

    flush(&mut cards, current);
    cards
}

fn flush(cards: &mut Vec<InsightCard>, card: InsightCard) {
    if !card.is_empty() {
        cards.push(card);
    }
}

/// Blocks are separated by blank lines; a labeled line also starts a new
/// block. Lines inside a block are joined with a single space.
fn segment_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            push_block(&mut blocks, &mut current);
            continue;
        }
        if label_of(line) != Label::Plain {
            push_block(&mut blocks, &mut current);
        }
        current.push(line);
    }
    push_block(&mut blocks, &mut current);

    blocks
}

fn push_block(blocks: &mut Vec<String>, lines: &mut Vec<&str>) {
    if !lines.is_empty() {
        blocks.push(lines.join(" "));
        lines.clear();
    }
}

fn label_of(block: &str) -> Label {
    let head = strip_markers(block).to_ascii_lowercase();
    if head.starts_with("insight") {
        Label::Insight
    } else if head.starts_with("action") {
        Label::Action
    } else {
        Label::Plain
    }
}

fn split_label(block: &str) -> Option<(&str, &str)> {
    block.split_once(':')
}

// Leading bullet/heading/bold markers.
fn strip_markers(s: &str) -> &str {
    s.trim_start_matches(|c: char| c == '*' || c == '#' || c == '-' || c.is_whitespace())
}

fn clean(s: &str) -> String {
    s.trim_matches(|c: char| c == '*' || c.is_whitespace()).to_string()
}
