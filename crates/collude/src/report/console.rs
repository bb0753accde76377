//! Terminal rendering of classified spans.

use std::io::Write;

use owo_colors::OwoColorize;

use super::{Span, SpanKind};

/// Write `spans` in order, styling copied text when `color` is set.
///
/// Without colour, copied runs are bracketed so they remain visible:
/// `[[…]]` copied, `{{…}}` unique to the pair, `((…))` template.
pub fn write_highlighted(out: &mut impl Write, spans: &[Span], color: bool) -> std::io::Result<()> {
    for span in spans {
        let text = span.text.as_str();
        match (span.kind, color) {
            (SpanKind::Normal, _) => write!(out, "{text}")?,
            (SpanKind::Copied, true) => write!(out, "{}", text.red())?,
            (SpanKind::CopiedUnique, true) => write!(out, "{}", text.red().bold())?,
            (SpanKind::CopiedTemplate, true) => write!(out, "{}", text.dimmed())?,
            (SpanKind::Copied, false) => write!(out, "[[{text}]]")?,
            (SpanKind::CopiedUnique, false) => write!(out, "{{{{{text}}}}}")?,
            (SpanKind::CopiedTemplate, false) => write!(out, "(({text}))")?,
        }
    }
    writeln!(out)
}
