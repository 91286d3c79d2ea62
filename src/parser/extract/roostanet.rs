use scraper::Html;
use tracing::debug;

use super::visible_text;
use crate::parser::blocks::{classify_lines, Label};
use crate::normalize::segment_sentences;
use crate::parser::sections::{cluster_records, RecordSection};
use crate::raw::RawBlock;

/// Every labelled recipe on a city page.
pub fn extract(html: &str) -> Vec<RawBlock> {
    let doc = Html::parse_document(html);
    let text = visible_text(&doc);
    let blocks = classify_lines(&text);
    cluster_records(&blocks).iter().map(to_raw).collect()
}

fn to_raw(record: &RecordSection) -> RawBlock {
    let mut raw = RawBlock::new();
    for (label, lines) in &record.fields {
        if lines.is_empty() {
            continue;
        }
        let field = label.field();
        match label {
            Label::Ingredients => raw.set_list(field, lines.iter().cloned()),
            // each page line is a paragraph; a line never runs into the next
            Label::Instructions => {
                raw.set_list(field, lines.iter().flat_map(|l| segment_sentences(l)))
            }
            Label::Source => {
                // attribution is often a book title; only links are provenance
                let source = &lines[0];
                if source.starts_with("http://") || source.starts_with("https://") {
                    raw.set_text(field, source.clone());
                } else {
                    debug!(source = %source, "non-link source attribution skipped");
                }
            }
            _ => raw.set_text(field, lines.join("\n")),
        }
    }
    raw
}
