//! Splitting raw catalog content into documents.

/// One document of the catalog.
///
/// Segments are atomic: a partition holds a segment entirely or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Position in the segment sequence (0-based).
    pub index: usize,
    /// Trimmed document text, never empty.
    pub text: &'a str,
}

impl Segment<'_> {
    /// Returns the document length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Always false; empty pieces are dropped during segmentation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Splits `content` on the literal `separator`.
///
/// Each piece is trimmed of surrounding whitespace and empty pieces are
/// dropped. An empty separator yields the whole trimmed content as a single
/// segment.
///
/// # Example
///
/// ```rust
/// use catsplit_core::segment;
///
/// let segments = segment("---\nkind: a\n---\n\n---\nkind: b\n", "---");
/// let texts: Vec<_> = segments.iter().map(|s| s.text).collect();
/// assert_eq!(texts, vec!["kind: a", "kind: b"]);
/// ```
#[must_use]
pub fn segment<'a>(content: &'a str, separator: &str) -> Vec<Segment<'a>> {
    let pieces: Box<dyn Iterator<Item = &'a str>> = if separator.is_empty() {
        Box::new(std::iter::once(content))
    } else {
        Box::new(content.split(separator))
    };

    pieces
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .enumerate()
        .map(|(index, text)| Segment { index, text })
        .collect()
}

/// Returns the text a full reconstruction reproduces: every segment of
/// `content`, in order, joined by `joiner`.
#[must_use]
pub fn normalize(content: &str, separator: &str, joiner: &str) -> String {
    let segments = segment(content, separator);
    let mut out = String::with_capacity(content.len());
    for (i, seg) in segments.iter().enumerate() {
        if i > 0 {
            out.push_str(joiner);
        }
        out.push_str(seg.text);
    }
    out
}
