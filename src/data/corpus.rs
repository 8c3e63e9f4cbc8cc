//! Corpus loading and normalization.
//!
//! A corpus is the plain text a vocabulary and a model are built from.
//! Normalization unifies line endings and drops stray control characters;
//! everything else (case included) is preserved, so the alphabet is
//! exactly what the text contains.

use std::path::Path;

use crate::model::vocab::Vocabulary;

/// Normalized corpus text plus derived views of it.
pub struct Corpus {
    text: String,
}

impl Corpus {
    /// Load and normalize a corpus from a file.
    pub fn load(path: &Path) -> Result<Corpus, String> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
        Ok(Self::from_text(&raw))
    }

    /// Normalize raw text into a corpus.
    ///
    /// CRLF and lone CR become LF; control characters other than LF are
    /// dropped.
    pub fn from_text(raw: &str) -> Corpus {
        let mut text = String::with_capacity(raw.len());
        let mut chars = raw.chars().peekable();
        while let Some(ch) = chars.next() {
            match ch {
                '\r' => {
                    if chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    text.push('\n');
                }
                '\n' => text.push('\n'),
                c if c.is_control() => {}
                c => text.push(c),
            }
        }
        Corpus { text }
    }

    /// The normalized text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of symbols in the corpus.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the corpus holds no symbols.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Content fingerprint: first 16 hex chars of the BLAKE3 hash of the
    /// normalized text. Identifies which corpus produced a decode run.
    pub fn fingerprint(&self) -> String {
        let hash = blake3::hash(self.text.as_bytes());
        hash.to_hex().as_str()[..16].to_string()
    }

    /// Normalized unigram frequencies over the given vocabulary.
    ///
    /// Symbols outside the vocabulary are ignored. An empty corpus (or one
    /// fully outside the vocabulary) yields all zeros.
    pub fn frequencies(&self, vocab: &Vocabulary) -> Vec<f32> {
        let mut counts = vec![0u64; vocab.size()];
        let mut total = 0u64;
        for ch in self.text.chars() {
            if let Some(idx) = vocab.index_of(ch) {
                counts[idx] += 1;
                total += 1;
            }
        }
        if total == 0 {
            return vec![0.0; vocab.size()];
        }
        counts.iter().map(|&c| c as f32 / total as f32).collect()
    }

    /// Encode the whole corpus to vocabulary indices, skipping symbols the
    /// vocabulary does not know.
    pub fn encode(&self, vocab: &Vocabulary) -> Vec<usize> {
        self.text.chars().filter_map(|ch| vocab.index_of(ch)).collect()
    }

    /// Sliding training windows of `len + 1` indices (input plus the
    /// shifted target), advancing by `stride` symbols.
    pub fn index_windows(
        &self,
        vocab: &Vocabulary,
        len: usize,
        stride: usize,
    ) -> Vec<Vec<usize>> {
        let indices = self.encode(vocab);
        let stride = stride.max(1);
        if len == 0 || indices.len() <= len {
            return Vec::new();
        }

        let mut windows = Vec::new();
        let mut start = 0;
        while start + len < indices.len() {
            windows.push(indices[start..=start + len].to_vec());
            start += stride;
        }
        windows
    }
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_line_endings() {
        let corpus = Corpus::from_text("ab\r\ncd\ref");
        assert_eq!(corpus.text(), "ab\ncd\nef");
    }

    #[test]
    fn drops_control_characters() {
        let corpus = Corpus::from_text("a\u{0000}b\u{0007}c\n");
        assert_eq!(corpus.text(), "abc\n");
    }

    #[test]
    fn fingerprint_is_stable() {
        let a = Corpus::from_text("the cat sat");
        let b = Corpus::from_text("the cat sat");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 16);

        let c = Corpus::from_text("the cat ran");
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn fingerprint_sees_normalized_text() {
        let crlf = Corpus::from_text("ab\r\ncd");
        let lf = Corpus::from_text("ab\ncd");
        assert_eq!(crlf.fingerprint(), lf.fingerprint());
    }

    #[test]
    fn frequencies_sum_to_one() {
        let corpus = Corpus::from_text("aab");
        let vocab = Vocabulary::from_text(corpus.text());
        let freqs = corpus.frequencies(&vocab);
        let sum: f32 = freqs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(freqs[vocab.index_of('a').unwrap()] > freqs[vocab.index_of('b').unwrap()]);
    }

    #[test]
    fn windows_cover_corpus_with_stride() {
        let corpus = Corpus::from_text("abcdef");
        let vocab = Vocabulary::from_text(corpus.text());
        let windows = corpus.index_windows(&vocab, 3, 1);
        // Windows of 4 indices starting at offsets 0, 1, 2.
        assert_eq!(windows.len(), 3);
        for w in &windows {
            assert_eq!(w.len(), 4);
        }
    }

    #[test]
    fn windows_empty_when_corpus_too_short() {
        let corpus = Corpus::from_text("ab");
        let vocab = Vocabulary::from_text(corpus.text());
        assert!(corpus.index_windows(&vocab, 5, 1).is_empty());
    }

    #[test]
    fn load_reads_file() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, "hello\r\nworld").expect("write");
        let corpus = Corpus::load(file.path()).expect("load");
        assert_eq!(corpus.text(), "hello\nworld");
    }

    #[test]
    fn load_missing_file_names_path() {
        let err = Corpus::load(Path::new("/nonexistent/corpus.txt")).unwrap_err();
        assert!(err.contains("/nonexistent/corpus.txt"), "error was: {}", err);
    }
}
