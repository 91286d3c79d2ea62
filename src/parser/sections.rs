use std::collections::BTreeMap;

use super::blocks::{Block, Label};

/// One recipe's worth of labelled lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSection {
    pub fields: BTreeMap<Label, Vec<String>>,
}

impl RecordSection {
    pub fn lines(&self, label: Label) -> &[String] {
        self.fields.get(&label).map(Vec::as_slice).unwrap_or(&[])
    }

    fn push(&mut self, label: Label, line: &str) {
        let lines = self.fields.entry(label).or_default();
        if label.is_single_line() && !lines.is_empty() {
            return;
        }
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
}

/// Cluster classified lines into one section per recipe.
///
/// A `Name` label always opens a new record. Inside a record, a label only
/// opens a new field when it comes later in page order than the current one;
/// otherwise the line is ordinary text of the current field. Anything before
/// the first `Name` label is page chrome and is dropped.
pub fn cluster_records(blocks: &[Block]) -> Vec<RecordSection> {
    let mut records = Vec::new();
    let mut current: Option<(RecordSection, Label)> = None;

    for block in blocks {
        match block {
            Block::Label { label: Label::Name, rest, .. } => {
                if let Some((record, _)) = current.take() {
                    records.push(record);
                }
                let mut record = RecordSection::default();
                record.fields.insert(Label::Name, Vec::new());
                record.push(Label::Name, rest);
                current = Some((record, Label::Name));
            }
            Block::Label { label, rest, line } => {
                let Some((record, field)) = current.as_mut() else { continue };
                if *label > *field {
                    *field = *label;
                    record.fields.entry(*label).or_default();
                    record.push(*label, rest);
                } else {
                    record.push(*field, line);
                }
            }
            Block::Text(t) => {
                if let Some((record, field)) = current.as_mut() {
                    record.push(*field, t);
                }
            }
            Block::Empty => {}
        }
    }

    if let Some((record, _)) = current {
        records.push(record);
    }
    records
}
