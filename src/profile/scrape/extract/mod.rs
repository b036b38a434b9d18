mod rules;
mod strategies;

use std::collections::HashMap;

use scraper::Html;
use tracing::debug;

pub(crate) use rules::Field;
use rules::RULES;
use strategies::{LabelIndex, by_test_id};

/// Field values found on one page. A missing key means the field was not found.
#[derive(Debug, Default)]
pub(crate) struct Extracted {
    values: HashMap<Field, String>,
}

impl Extracted {
    pub(crate) fn take(&mut self, field: Field) -> Option<String> {
        self.values.remove(&field)
    }
}

/// Apply every rule independently. A rule that finds nothing leaves its field out.
pub(crate) fn extract_fields(doc: &Html) -> Extracted {
    let mut out = Extracted::default();
    let mut label_index: Option<LabelIndex> = None;

    for rule in RULES {
        /* Strategy A: data-testid anchor */
        if let Some(value) = by_test_id(doc, rule) {
            out.values.insert(rule.field, value);
            continue;
        }

        /* Strategy B: visible row label */
        if rule.labels.is_empty() {
            debug!(field = ?rule.field, testid = rule.testid, "field not found");
            continue;
        }
        let index = label_index.get_or_insert_with(|| LabelIndex::build(doc));
        match index.lookup(rule.labels) {
            Some(value) => {
                debug!(field = ?rule.field, "test id missing, value found by row label");
                out.values.insert(rule.field, value);
            }
            None => debug!(field = ?rule.field, testid = rule.testid, "field not found"),
        }
    }

    out
}
