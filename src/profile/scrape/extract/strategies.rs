use scraper::{ElementRef, Html, Selector};

use super::rules::{FieldRule, Label};
use crate::core::text::{clean_text, fold_accents};

/// Strategy A: first element carrying the rule's `data-testid` with non-empty text.
pub(crate) fn by_test_id(doc: &Html, rule: &FieldRule) -> Option<String> {
    let selector = Selector::parse(&format!(r#"[data-testid="{}"]"#, rule.testid)).ok()?;
    doc.select(&selector).find_map(|el| {
        let text = element_text(el);
        let text = match rule.strip_prefix {
            Some(prefix) => strip_label_prefix(&text, prefix).to_string(),
            None => text,
        };
        (!text.is_empty()).then_some(text)
    })
}

/// Strategy B: table rows whose first cell is a known label, value in the second cell.
pub(crate) struct LabelIndex {
    rows: Vec<(String, String)>,
}

impl LabelIndex {
    pub(crate) fn build(doc: &Html) -> Self {
        let (Ok(row_sel), Ok(cell_sel)) = (Selector::parse("tr"), Selector::parse("td, th")) else {
            return Self { rows: Vec::new() };
        };

        let mut rows = Vec::new();
        for row in doc.select(&row_sel) {
            let mut cells = row.select(&cell_sel).map(element_text);
            let (Some(label), Some(value)) = (cells.next(), cells.next()) else {
                continue;
            };
            if !label.is_empty() && !value.is_empty() {
                rows.push((normalize_label(&label), value));
            }
        }
        Self { rows }
    }

    pub(crate) fn lookup(&self, labels: &[Label]) -> Option<String> {
        labels.iter().find_map(|label| {
            self.rows
                .iter()
                .find(|(key, _)| label.matches(key))
                .map(|(_, value)| value.clone())
        })
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }
}

pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}

fn strip_label_prefix<'a>(text: &'a str, prefix: &str) -> &'a str {
    match text.get(..prefix.len()) {
        Some(head) if head.eq_ignore_ascii_case(prefix) => text[prefix.len()..].trim_start(),
        _ => text,
    }
}

fn normalize_label(s: &str) -> String {
    fold_accents(s)
        .replace('\u{2019}', "'")
        .to_lowercase()
        .trim_end_matches(':')
        .trim()
        .to_string()
}
