//! Digest Formatter - バッファされた変更イベントを 1 通のメールにする
//!
//! 同じ入力（イベント列・編集者・時刻）からは常に同じ件名と本文を生成します。
//! 欠けている項目は落ちずにプレースホルダで表示します。

use std::fmt::Write as _;
use std::sync::Arc;

use crate::domain::{ChangeEvent, ChangeKind, Editor, FieldValue, normalize};
use crate::ports::Clock;

const UNKNOWN_EDITOR: &str = "unknown";
const EMPTY_VALUE: &str = "(none)";

/// 件名と本文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub body: String,
}

pub struct DigestFormatter {
    subject_prefix: String,
    clock: Arc<dyn Clock>,
}

impl DigestFormatter {
    pub fn new(subject_prefix: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            subject_prefix: subject_prefix.into(),
            clock,
        }
    }

    pub fn format(
        &self,
        recipient_name: &str,
        events: &[ChangeEvent],
        editor: Option<&Editor>,
    ) -> Digest {
        let count = events.len();
        let noun = if count == 1 { "task change" } else { "task changes" };
        let subject = format!("{} {count} {noun}", self.subject_prefix)
            .trim()
            .to_string();

        let mut body = String::new();
        // String への write! は失敗しない
        let _ = writeln!(body, "Hi {},", display_or(recipient_name.trim(), "there"));
        let _ = writeln!(body);
        let _ = writeln!(body, "Changed by: {}", editor_line(editor));
        let _ = writeln!(body, "Rendered at: {}", self.clock.now().to_rfc3339());
        for event in events {
            let _ = writeln!(body);
            write_event(&mut body, event);
        }

        Digest { subject, body }
    }
}

fn editor_line(editor: Option<&Editor>) -> String {
    match editor {
        Some(editor) if !editor.is_empty() => match (editor.name.as_str(), editor.address.as_str()) {
            (name, "") => name.to_string(),
            ("", address) => address.to_string(),
            (name, address) => format!("{name} <{address}>"),
        },
        _ => UNKNOWN_EDITOR.to_string(),
    }
}

fn write_event(body: &mut String, event: &ChangeEvent) {
    let title = event.title();
    let _ = writeln!(
        body,
        "[{}] {} (#{})",
        event.kind.as_str(),
        display_or(&title, "(untitled)"),
        display_or(event.task_id.as_str(), "?")
    );
    match event.kind {
        ChangeKind::Created => {
            let after = normalize(event.after.as_ref());
            let _ = writeln!(body, "  status: {}", display_or(&after.status, EMPTY_VALUE));
            let _ = writeln!(body, "  deadline: {}", display_or(&after.deadline, EMPTY_VALUE));
        }
        ChangeKind::Deleted => {}
        ChangeKind::Updated => {
            for delta in &event.field_deltas {
                let _ = writeln!(
                    body,
                    "  {}: {} -> {}",
                    delta.field,
                    display_value(&delta.old),
                    display_value(&delta.new)
                );
            }
        }
    }
}

fn display_or<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() { placeholder } else { value }
}

fn display_value(value: &FieldValue) -> String {
    if value.is_empty() {
        EMPTY_VALUE.to_string()
    } else {
        value.to_string()
    }
}
