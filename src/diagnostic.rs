//! Diagnostics for seed text, rendered with ariadne.
//!
//! The library surface reports typed errors; this module turns the ones
//! that point into user-provided text (an unknown symbol in a seed) into
//! annotated terminal output at the CLI boundary.

/// Byte range within a piece of source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Byte span of the char at `position` (char index) in `text`.
    /// Falls back to an empty span at the end of the text when the
    /// position is out of range.
    pub fn for_char(text: &str, position: usize) -> Self {
        match text.char_indices().nth(position) {
            Some((start, ch)) => Self::new(start, start + ch.len_utf8()),
            None => Self::new(text.len(), text.len()),
        }
    }
}

/// A diagnostic (error or warning) attached to a span of text.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Error,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn warning(message: String, span: Span) -> Self {
        Self {
            severity: Severity::Warning,
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// Render the diagnostic to stderr using ariadne.
    pub fn render(&self, name: &str, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let kind = match self.severity {
            Severity::Error => ReportKind::Error,
            Severity::Warning => ReportKind::Warning,
        };

        let color = match self.severity {
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
        };

        let mut report = Report::build(kind, name, self.span.start)
            .with_message(&self.message)
            .with_label(
                Label::new((name, self.span.start..self.span.end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report
            .finish()
            .eprint((name, Source::from(source)))
            .unwrap();
    }
}

/// Diagnostic for a seed symbol the vocabulary does not know.
pub fn unknown_symbol(seed: &str, symbol: char, position: usize) -> Diagnostic {
    Diagnostic::error(
        format!(
            "symbol '{}' is not in the corpus alphabet",
            symbol.escape_default()
        ),
        Span::for_char(seed, position),
    )
    .with_note(format!("seed position {}", position))
    .with_help(
        "every seed symbol must occur in the corpus; change the seed or extend the corpus"
            .to_string(),
    )
}

// ─── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_construction() {
        let d = Diagnostic::error("unknown symbol".to_string(), Span::new(2, 3));
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.message, "unknown symbol");
        assert_eq!(d.span.start, 2);
        assert_eq!(d.span.end, 3);
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn chained_builders() {
        let d = Diagnostic::warning("odd seed".to_string(), Span::new(0, 1))
            .with_note("note 1".to_string())
            .with_help("help text".to_string())
            .with_note("note 2".to_string());
        assert_eq!(d.notes.len(), 2);
        assert_eq!(d.help.as_deref(), Some("help text"));
    }

    #[test]
    fn span_for_ascii_char() {
        let span = Span::for_char("abc", 1);
        assert_eq!(span, Span::new(1, 2));
    }

    #[test]
    fn span_for_multibyte_char() {
        // 'é' is two bytes; the char after it starts at byte 3.
        let span = Span::for_char("aéb", 2);
        assert_eq!(span, Span::new(3, 4));
    }

    #[test]
    fn span_past_end_is_empty() {
        let span = Span::for_char("ab", 9);
        assert_eq!(span, Span::new(2, 2));
    }

    #[test]
    fn unknown_symbol_points_at_offender() {
        let d = unknown_symbol("abz", 'z', 2);
        assert_eq!(d.severity, Severity::Error);
        assert_eq!(d.span, Span::new(2, 3));
        assert!(d.message.contains('z'));
        assert!(d.help.is_some());
    }
}
