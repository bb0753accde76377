//! XML comparison report for one pair of documents.

use std::io::Write;

use super::{Span, SpanClassifier};
use crate::corpus::{CompareFlags, Corpus, CorpusError};

/// Write an XML report comparing documents `a` and `b`.
///
/// The report holds the pair's shared-trigram count and resemblance, then
/// for each side its source path, trigram count, containment and classified
/// text blocks.
pub fn write_xml_report(
    mut out: impl Write,
    corpus: &Corpus,
    a: usize,
    b: usize,
    flags: CompareFlags,
) -> Result<(), CorpusError> {
    let classifier = SpanClassifier::new(corpus, flags);

    writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(out, "<comparison>")?;
    writeln!(out, "<common-trigrams>{}</common-trigrams>", corpus.count_matches(a, b, flags))?;
    writeln!(out, "<similarity>{:.6}</similarity>", corpus.resemblance(a, b, flags))?;
    for (source, target) in [(a, b), (b, a)] {
        let doc = corpus.document(source);
        writeln!(out, "<document>")?;
        writeln!(out, "<source>{}</source>", escape(&doc.original_path().display().to_string()))?;
        writeln!(out, "<num-trigrams>{}</num-trigrams>", corpus.count_trigrams(source))?;
        writeln!(
            out,
            "<containment>{:.6}</containment>",
            corpus.containment(source, target, flags)
        )?;
        writeln!(out, "<text>")?;
        let classification = classifier.classify_document(source, target)?;
        write_blocks(&mut out, &classification.spans)?;
        writeln!(out, "</text>")?;
        writeln!(out, "</document>")?;
    }
    writeln!(out, "</comparison>")?;
    out.flush()?;
    Ok(())
}

fn write_blocks(out: &mut impl Write, spans: &[Span]) -> std::io::Result<()> {
    for span in spans {
        write!(
            out,
            r#"<block text="{}"><![CDATA[{}]]></block>"#,
            span.kind,
            span.text.replace("]]>", "]]]]><![CDATA[>")
        )?;
    }
    writeln!(out)
}

fn escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
