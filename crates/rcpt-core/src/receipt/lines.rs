//! Line tokenization of OCR transcripts.

/// Split a transcript into trimmed, non-empty lines, top to bottom.
pub fn lines(text: &str) -> impl Iterator<Item = &str> + Clone {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// A transcript together with its tokenized lines.
///
/// Every rule receives this view so the text is split only once per receipt.
#[derive(Debug, Clone)]
pub struct ReceiptText<'a> {
    text: &'a str,
    lines: Vec<&'a str>,
}

impl<'a> ReceiptText<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            lines: lines(text).collect(),
        }
    }

    /// The verbatim transcript.
    pub fn full_text(&self) -> &'a str {
        self.text
    }

    /// Trimmed, non-empty lines in source order.
    pub fn lines(&self) -> &[&'a str] {
        &self.lines
    }

    /// The first `n` lines (or fewer).
    pub fn head(&self, n: usize) -> &[&'a str] {
        &self.lines[..n.min(self.lines.len())]
    }

    pub fn line(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_trimmed_and_non_empty() {
        let text = "  テストスーパー  \n\n   \n2025年4月6日\r\n\t合計 1250円\n";
        let collected: Vec<&str> = lines(text).collect();
        assert_eq!(collected, vec!["テストスーパー", "2025年4月6日", "合計 1250円"]);
    }

    #[test]
    fn test_lines_restartable() {
        let iter = lines("a\nb");
        assert_eq!(iter.clone().count(), 2);
        assert_eq!(iter.collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_receipt_text_head() {
        let receipt = ReceiptText::new("one\ntwo\nthree");
        assert_eq!(receipt.head(2), &["one", "two"]);
        assert_eq!(receipt.head(10).len(), 3);
        assert_eq!(receipt.line(2), Some("three"));
        assert_eq!(receipt.line(3), None);
        assert_eq!(receipt.full_text(), "one\ntwo\nthree");
    }

    #[test]
    fn test_empty_text() {
        let receipt = ReceiptText::new(" \n \n");
        assert!(receipt.is_empty());
        assert!(receipt.head(5).is_empty());
    }
}
