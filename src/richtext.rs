//! # Rich Text
//!
//! Model-written text marks emphasis with `<b>...</b>`. The markup is parsed
//! once, here, into plain and bold segments; layout and PDF code only ever
//! see segments.
//!
//! The tag set is closed: `<b>` and `<strong>` (any case). Anything else that
//! looks like a tag is kept as literal text.

/// A run of text with a single weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub bold: bool,
}

impl Segment {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: false,
        }
    }

    pub fn bold(text: &str) -> Self {
        Self {
            text: text.to_string(),
            bold: true,
        }
    }
}

/// Parsed rich text: an ordered list of segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RichText {
    pub segments: Vec<Segment>,
}

enum Tag {
    Open,
    Close,
}

impl RichText {
    /// Parse markup. Never fails: unbalanced or unknown tags degrade to
    /// sensible text.
    pub fn parse(input: &str) -> Self {
        let mut out = RichText::default();
        let mut depth = 0usize;
        let mut buf = String::new();
        let mut rest = input;

        while let Some(lt) = rest.find('<') {
            buf.push_str(&rest[..lt]);
            let after = &rest[lt..];
            match after.find('>').and_then(|gt| classify(&after[..=gt]).map(|t| (t, gt))) {
                Some((tag, gt)) => {
                    out.push(&buf, depth > 0);
                    buf.clear();
                    match tag {
                        Tag::Open => depth += 1,
                        Tag::Close => depth = depth.saturating_sub(1),
                    }
                    rest = &after[gt + 1..];
                }
                None => {
                    buf.push('<');
                    rest = &after[1..];
                }
            }
        }
        buf.push_str(rest);
        out.push(&buf, depth > 0);
        out
    }

    /// Plain text with all markup removed.
    pub fn plain_text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Text that is entirely bold.
    pub fn bold(text: &str) -> Self {
        let mut out = RichText::default();
        out.push(text, true);
        out
    }

    /// Text that is entirely plain, with no markup interpretation.
    pub fn plain(text: &str) -> Self {
        let mut out = RichText::default();
        out.push(text, false);
        out
    }

    /// Prepend literal text in the weight of the first segment (used for
    /// bullet glyphs).
    pub fn prefixed(mut self, prefix: &str) -> Self {
        match self.segments.first_mut() {
            Some(first) if !first.bold => first.text.insert_str(0, prefix),
            _ => self.segments.insert(0, Segment::plain(prefix)),
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segments.iter().all(|s| s.text.is_empty())
    }

    fn push(&mut self, raw: &str, bold: bool) {
        if raw.is_empty() {
            return;
        }
        let text = decode_entities(raw);
        if let Some(last) = self.segments.last_mut() {
            if last.bold == bold {
                last.text.push_str(&text);
                return;
            }
        }
        self.segments.push(Segment { text, bold });
    }
}

fn classify(tag: &str) -> Option<Tag> {
    let inner = tag[1..tag.len() - 1].trim().to_ascii_lowercase();
    match inner.as_str() {
        "b" | "strong" => Some(Tag::Open),
        "/b" | "/strong" => Some(Tag::Close),
        _ => None,
    }
}

fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{00A0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_segment() {
        let rt = RichText::parse("Hello world");
        assert_eq!(rt.segments, vec![Segment::plain("Hello world")]);
    }

    #[test]
    fn bold_runs_are_split_out() {
        let rt = RichText::parse("Learn <b>SQL</b> and <B>Python</B>.");
        assert_eq!(
            rt.segments,
            vec![
                Segment::plain("Learn "),
                Segment::bold("SQL"),
                Segment::plain(" and "),
                Segment::bold("Python"),
                Segment::plain("."),
            ]
        );
        assert_eq!(rt.plain_text(), "Learn SQL and Python.");
    }

    #[test]
    fn strong_is_treated_as_bold() {
        let rt = RichText::parse("<strong>Finance</strong> roles");
        assert_eq!(rt.segments[0], Segment::bold("Finance"));
    }

    #[test]
    fn nested_and_unbalanced_tags() {
        let rt = RichText::parse("<b>a<b>b</b>c</b>d");
        assert_eq!(rt.segments, vec![Segment::bold("abc"), Segment::plain("d")]);

        let rt = RichText::parse("x</b>y");
        assert_eq!(rt.segments, vec![Segment::plain("xy")]);

        let rt = RichText::parse("start <b>never closed");
        assert_eq!(
            rt.segments,
            vec![Segment::plain("start "), Segment::bold("never closed")]
        );
    }

    #[test]
    fn unknown_tags_and_stray_brackets_stay_literal() {
        let rt = RichText::parse("a < b and <i>c</i>");
        assert_eq!(rt.plain_text(), "a < b and <i>c</i>");
        assert!(rt.segments.iter().all(|s| !s.bold));
    }

    #[test]
    fn entities_are_decoded() {
        let rt = RichText::parse("R&amp;D &lt;team&gt;");
        assert_eq!(rt.plain_text(), "R&D <team>");
    }

    #[test]
    fn empty_input_has_no_segments() {
        assert!(RichText::parse("").segments.is_empty());
        assert!(RichText::parse("<b></b>").is_empty());
    }

    #[test]
    fn prefix_joins_plain_first_segment() {
        let rt = RichText::parse("text <b>bold</b>").prefixed("\u{2022} ");
        assert_eq!(rt.segments[0], Segment::plain("\u{2022} text "));

        let rt = RichText::parse("<b>bold</b> first").prefixed("\u{2022} ");
        assert_eq!(rt.segments[0], Segment::plain("\u{2022} "));
        assert_eq!(rt.segments[1], Segment::bold("bold"));
    }
}
