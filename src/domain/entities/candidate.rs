//! Candidate entity
//!
//! A tentative byte range bounded by a header match and a computed end,
//! prior to validation.

use super::file_signature::FileType;
use std::ops::Range;

/// A delimited, not yet validated, region of the payload buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Candidate {
    file_type: FileType,
    start: usize,
    end: usize,
}

impl Candidate {
    /// Creates a candidate spanning `start..end`
    pub fn new(file_type: FileType, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "candidate start {start} past end {end}");
        Self {
            file_type,
            start,
            end,
        }
    }

    /// Returns the file type whose header opened this candidate
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Offset of the header match
    pub fn start(&self) -> usize {
        self.start
    }

    /// Exclusive end offset
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Borrows the candidate's bytes out of the buffer it was delimited in
    pub fn slice<'a>(&self, buffer: &'a [u8]) -> &'a [u8] {
        &buffer[self.range()]
    }
}
