//! Splitting a document into per-invoice sections.

use std::ops::Range;

/// One invoice section of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment<'a> {
    /// Position among the non-empty sections, starting at 0.
    pub index: usize,
    /// Byte range of the section in the document.
    pub span: Range<usize>,
    /// Section text, marker excluded.
    pub text: &'a str,
}

/// Lazy iterator over the sections between marker occurrences.
///
/// Sections that are blank after trimming are skipped.
#[derive(Debug, Clone)]
pub struct Segments<'a, 'm> {
    text: &'a str,
    marker: &'m str,
    cursor: usize,
    index: usize,
    finished: bool,
}

impl<'a, 'm> Segments<'a, 'm> {
    pub fn new(text: &'a str, marker: &'m str) -> Self {
        Self {
            text,
            marker,
            cursor: 0,
            index: 0,
            finished: false,
        }
    }

    fn next_piece(&mut self) -> Option<Range<usize>> {
        if self.finished {
            return None;
        }

        let rest = &self.text[self.cursor..];
        let found = if self.marker.is_empty() {
            None
        } else {
            rest.find(self.marker)
        };

        let piece = match found {
            Some(offset) => {
                let piece = self.cursor..self.cursor + offset;
                self.cursor += offset + self.marker.len();
                piece
            }
            None => {
                self.finished = true;
                self.cursor..self.text.len()
            }
        };

        Some(piece)
    }
}

impl<'a, 'm> Iterator for Segments<'a, 'm> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(span) = self.next_piece() {
            let text = &self.text[span.clone()];
            if text.trim().is_empty() {
                continue;
            }

            let segment = Segment {
                index: self.index,
                span,
                text,
            };
            self.index += 1;
            return Some(segment);
        }

        None
    }
}

impl std::iter::FusedIterator for Segments<'_, '_> {}

/// Split `text` on every occurrence of `marker`.
pub fn segments<'a, 'm>(text: &'a str, marker: &'m str) -> Segments<'a, 'm> {
    Segments::new(text, marker)
}
