//! Quoted span detection.
//!
//! Quote characters are ASCII, so scanning works on bytes and every reported
//! offset is a valid `str` slice boundary. Escaped quotes are not recognised:
//! a backslash has no special meaning and `"a \" b"` closes at the second `"`.

/// A closed quoted region, inclusive of both quote characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotedSpan {
    pub start: usize,
    pub end: usize,
}

impl QuotedSpan {
    pub fn contains(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// The quoted text, quotes included
    pub fn as_str<'a>(&self, line: &'a str) -> &'a str {
        &line[self.start..=self.end]
    }
}

/// Result of scanning one line for quotes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuoteScan {
    /// Closed spans in order of appearance
    pub spans: Vec<QuotedSpan>,
    /// Offset of a quote still open at end of line
    pub open_at: Option<usize>,
}

impl QuoteScan {
    pub fn is_incomplete(&self) -> bool {
        self.open_at.is_some()
    }

    /// The closed span covering `index`, if any
    pub fn span_at(&self, index: usize) -> Option<&QuotedSpan> {
        let candidate = self.spans.partition_point(|span| span.end < index);
        self.spans
            .get(candidate)
            .filter(|span| span.contains(index))
    }

    /// Whether `index` lies inside a quote, closed or still open
    pub fn is_quoted(&self, index: usize) -> bool {
        self.span_at(index).is_some() || self.open_at.is_some_and(|open| index >= open)
    }
}

#[derive(Debug, Clone, Copy)]
enum QuoteState {
    Outside,
    InsideSingle(usize),
    InsideDouble(usize),
}

/// Single-pass quote scanner
pub struct QuoteScanner;

impl QuoteScanner {
    pub fn scan(line: &str) -> QuoteScan {
        let mut spans = Vec::new();
        let mut state = QuoteState::Outside;

        for (index, byte) in line.bytes().enumerate() {
            state = match (state, byte) {
                (QuoteState::Outside, b'\'') => QuoteState::InsideSingle(index),
                (QuoteState::Outside, b'"') => QuoteState::InsideDouble(index),
                (QuoteState::InsideSingle(start), b'\'') | (QuoteState::InsideDouble(start), b'"') => {
                    spans.push(QuotedSpan { start, end: index });
                    QuoteState::Outside
                }
                (state, _) => state,
            };
        }

        let open_at = match state {
            QuoteState::Outside => None,
            QuoteState::InsideSingle(start) | QuoteState::InsideDouble(start) => Some(start),
        };

        QuoteScan { spans, open_at }
    }
}
