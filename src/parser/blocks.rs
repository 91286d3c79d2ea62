use std::sync::LazyLock;

use regex::Regex;

use crate::raw::FieldKey;

static LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(نام\s+غذا|شهر|گروه|مواد\s+لازم|طرز\s+تهیه|نکات|توضیحات|منبع)(?:\s*[:：]\s*|\s+|$)(.*)$",
    )
    .unwrap()
});
static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Section labels of a labelled recipe listing, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Label {
    Name,
    City,
    Group,
    Ingredients,
    Instructions,
    Notes,
    Description,
    Source,
}

impl Label {
    fn from_keyword(keyword: &str) -> Option<Self> {
        let keyword = SPACE_RE.replace_all(keyword, " ");
        match keyword.as_ref() {
            "نام غذا" => Some(Label::Name),
            "شهر" => Some(Label::City),
            "گروه" => Some(Label::Group),
            "مواد لازم" => Some(Label::Ingredients),
            "طرز تهیه" => Some(Label::Instructions),
            "نکات" => Some(Label::Notes),
            "توضیحات" => Some(Label::Description),
            "منبع" => Some(Label::Source),
            _ => None,
        }
    }

    pub fn field(self) -> FieldKey {
        match self {
            Label::Name => FieldKey::Name,
            Label::City => FieldKey::City,
            Label::Group => FieldKey::Group,
            Label::Ingredients => FieldKey::Ingredients,
            Label::Instructions => FieldKey::Instructions,
            Label::Notes => FieldKey::Notes,
            Label::Description => FieldKey::Description,
            Label::Source => FieldKey::Source,
        }
    }

    /// Single-line fields keep only their first line of text.
    pub fn is_single_line(self) -> bool {
        matches!(self, Label::Name | Label::City | Label::Group | Label::Source)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A label line, with any value written on the same line.
    Label { label: Label, rest: String, line: String },
    Text(String),
    Empty,
}

pub fn classify_lines(text: &str) -> Vec<Block> {
    text.lines().map(classify_line).collect()
}

fn classify_line(line: &str) -> Block {
    let line = line.trim();
    if line.is_empty() {
        return Block::Empty;
    }
    if let Some(caps) = LABEL_RE.captures(line) {
        if let Some(label) = Label::from_keyword(&caps[1]) {
            return Block::Label {
                label,
                rest: caps[2].trim().to_string(),
                line: line.to_string(),
            };
        }
    }
    Block::Text(line.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_alone() {
        let blocks = classify_lines("مواد لازم");
        assert!(matches!(&blocks[0], Block::Label { label: Label::Ingredients, rest, .. } if rest.is_empty()));
    }

    #[test]
    fn label_with_inline_value() {
        let blocks = classify_lines("شهر: رشت");
        assert!(matches!(&blocks[0], Block::Label { label: Label::City, rest, .. } if rest == "رشت"));

        let blocks = classify_lines("نام غذا  میرزا قاسمی");
        assert!(matches!(&blocks[0], Block::Label { label: Label::Name, rest, .. } if rest == "میرزا قاسمی"));
    }

    #[test]
    fn label_with_no_break_space() {
        let blocks = classify_lines("\u{00A0}طرز\u{00A0}تهیه\u{00A0}");
        assert!(matches!(&blocks[0], Block::Label { label: Label::Instructions, .. }));
    }

    #[test]
    fn keyword_prefix_is_plain_text() {
        let blocks = classify_lines("شهرستان آستارا");
        assert!(matches!(&blocks[0], Block::Text(t) if t == "شهرستان آستارا"));
    }

    #[test]
    fn empty_lines() {
        let blocks = classify_lines("متن\n \nمتن");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1], Block::Empty);
    }

    #[test]
    fn labels_follow_page_order() {
        assert!(Label::Name < Label::City);
        assert!(Label::Instructions < Label::Notes);
        assert!(Label::Description < Label::Source);
    }
}
