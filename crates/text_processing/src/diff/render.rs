//! Inline HTML rendering of a span sequence

use tutor_core::{Span, SpanKind};

const INSERTED_STYLE: &str = "color:#4caf50; background:#e8f5e9; font-weight:bold;";
const DELETED_STYLE: &str = "color:#f44336; text-decoration:line-through; opacity:0.7;";

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn styled(out: &mut String, style: &str, text: &str) {
    out.push_str("<span style='");
    out.push_str(style);
    out.push_str("'>");
    out.push_str(&escape_html(text));
    out.push_str("</span>");
}

/// Insertions in bold green, deletions struck through in red. A
/// replacement shows the deleted text followed by the inserted text.
pub fn render_html(spans: &[Span]) -> String {
    let mut out = String::new();
    for span in spans {
        match span.kind {
            SpanKind::Unchanged => out.push_str(&escape_html(&span.final_text)),
            SpanKind::Inserted => styled(&mut out, INSERTED_STYLE, &span.final_text),
            SpanKind::Deleted => styled(&mut out, DELETED_STYLE, &span.original_text),
            SpanKind::Replaced => {
                styled(&mut out, DELETED_STYLE, &span.original_text);
                styled(&mut out, INSERTED_STYLE, &span.final_text);
            },
        }
    }
    out
}
