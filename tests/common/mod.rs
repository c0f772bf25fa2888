//! Shared helpers for integration tests

use parking_lot::Mutex;
use redline::{Operation, SectionEdit, SectionSpec};
use std::collections::HashMap;
use std::sync::Arc;

/// A stand-in for the external persistence layer: section name → plain text
pub type TextStore = Arc<Mutex<HashMap<String, String>>>;

pub fn text_store() -> TextStore {
    Arc::new(Mutex::new(HashMap::new()))
}

/// Fold an operation batch into the store the way a persistence layer would
pub fn apply_ops(store: &TextStore, ops: &[Operation]) {
    let mut data = store.lock();
    for op in ops {
        match &op.edit {
            SectionEdit::Update { text, .. } => {
                data.insert(op.section.as_str().to_string(), text.clone());
            }
            SectionEdit::Add { spec } => {
                data.insert(op.section.as_str().to_string(), spec.text.clone());
            }
            SectionEdit::Remove => {
                data.remove(op.section.as_str());
            }
            SectionEdit::Reorder { .. } => {}
        }
    }
}

pub fn update_op(section: &str, text: &str) -> Operation {
    Operation::new(
        section,
        SectionEdit::Update {
            html: format!("<p>{text}</p>"),
            text: text.to_string(),
        },
    )
}

pub fn add_op(section: &str, text: &str) -> Operation {
    Operation::new(
        section,
        SectionEdit::Add {
            spec: SectionSpec::new(section, format!("<p>{text}</p>"), text),
        },
    )
}

pub fn remove_op(section: &str) -> Operation {
    Operation::new(section, SectionEdit::Remove)
}
