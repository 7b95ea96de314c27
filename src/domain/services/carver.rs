//! Carving engine
//!
//! Scans a payload buffer for the header of each selected type, delimits a
//! candidate per header occurrence, validates it and hands accepted
//! artifacts to a sink.
//!
//! Emission order is type-major (types in the order the caller selected
//! them), then left to right within a type. Sequence numbers are allocated
//! across the whole run, not per type.

use super::cancellation::CancellationToken;
use super::naming::{LocalClock, NamingClock, artifact_filename};
use super::signature_catalog::SignatureCatalog;
use crate::domain::entities::{
    Artifact, ArtifactDescriptor, Candidate, FileSignature, ScanProgress, ScanResult,
};
use crate::domain::repositories::{ArtifactSink, SinkError};
use memchr::memmem::Finder;
use std::iter::Peekable;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort a carving run
#[derive(Error, Debug)]
pub enum CarverError {
    #[error("No file types selected")]
    NoTypesSelected,

    #[error("Failed to emit {filename}: {source}")]
    Sink {
        filename: String,
        #[source]
        source: SinkError,
    },
}

/// Every occurrence of a header in a buffer, left to right
///
/// After a match at `s` the search resumes at `s + 1`, so overlapping
/// occurrences are each reported.
pub struct HeaderMatches<'a> {
    finder: Finder<'a>,
    haystack: &'a [u8],
    position: usize,
}

impl<'a> HeaderMatches<'a> {
    pub fn new(haystack: &'a [u8], header: &'a [u8]) -> Self {
        Self {
            finder: Finder::new(header),
            haystack,
            position: 0,
        }
    }
}

impl Iterator for HeaderMatches<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.position > self.haystack.len() {
            return None;
        }
        match self.finder.find(&self.haystack[self.position..]) {
            Some(relative) => {
                let start = self.position + relative;
                self.position = start + 1;
                Some(start)
            }
            None => {
                self.position = self.haystack.len() + 1;
                None
            }
        }
    }
}

/// Outcome of the most recent footer search in a pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FooterSearch {
    NotRun,
    /// First footer found at or after the searched start
    Found { footer_start: usize, end: usize },
    /// No footer after the searched start, hence none after any later start
    Exhausted,
}

/// Delimits the candidates of one signature over one buffer.
///
/// Header matches arrive in increasing order, so the last footer search is
/// reused while its footer still lies at or after the new start. Each pass
/// therefore reads the buffer for footers at most once overall.
#[derive(Debug)]
pub struct Delimiter<'a> {
    buffer: &'a [u8],
    signature: &'a FileSignature,
    last_search: FooterSearch,
}

impl<'a> Delimiter<'a> {
    pub fn new(buffer: &'a [u8], signature: &'a FileSignature) -> Self {
        Self {
            buffer,
            signature,
            last_search: FooterSearch::NotRun,
        }
    }

    /// Computes the candidate that starts at a header match.
    ///
    /// Footer-delimited signatures end at the first footer at or after
    /// `start`, footer included, and yield `None` when no footer follows.
    /// Footer-less signatures end at `next_header` (the next occurrence of
    /// the same header after `start`) or at the end of the buffer.
    ///
    /// `start` must not decrease between calls.
    pub fn delimit(&mut self, start: usize, next_header: Option<usize>) -> Option<Candidate> {
        let end = match self.signature.footer() {
            Some(footer) => self.footer_end(start, footer.len())?,
            None => next_header.unwrap_or(self.buffer.len()),
        };
        Some(Candidate::new(self.signature.file_type(), start, end))
    }

    fn footer_end(&mut self, start: usize, footer_len: usize) -> Option<usize> {
        match self.last_search {
            FooterSearch::Exhausted => return None,
            FooterSearch::Found { footer_start, end } if footer_start >= start => {
                return Some(end);
            }
            _ => {}
        }

        match self.signature.find_footer(&self.buffer[start..]) {
            Some(relative_end) => {
                let end = start + relative_end;
                self.last_search = FooterSearch::Found {
                    footer_start: end - footer_len,
                    end,
                };
                Some(end)
            }
            None => {
                self.last_search = FooterSearch::Exhausted;
                None
            }
        }
    }
}

/// Computes the candidate for a single header match.
///
/// Stateless form of [`Delimiter::delimit`].
pub fn delimit(
    buffer: &[u8],
    signature: &FileSignature,
    start: usize,
    next_header: Option<usize>,
) -> Option<Candidate> {
    Delimiter::new(buffer, signature).delimit(start, next_header)
}

/// The carving engine
///
/// Holds only read-only state, so one engine can serve concurrent scans of
/// different buffers. Counters live in the run, not in the engine.
///
/// # Example
///
/// ```
/// use packet_carver::domain::services::CarvingEngine;
/// use packet_carver::infrastructure::persistence::MemorySink;
///
/// let mut payload = vec![0xFF, 0xD8, 0xFF];
/// payload.extend_from_slice(b"AAAAAAAAAA");
/// payload.extend_from_slice(&[0xFF, 0xD9]);
///
/// let sink = MemorySink::new();
/// let result = CarvingEngine::standard()
///     .extract(&payload, &["jpg"], &sink, None)
///     .unwrap();
/// assert_eq!(result.total_artifacts(), 1);
/// assert_eq!(sink.artifacts()[0].data(), &payload[..]);
/// ```
#[derive(Clone)]
pub struct CarvingEngine {
    catalog: Arc<SignatureCatalog>,
    clock: Arc<dyn NamingClock>,
    cancellation: Option<CancellationToken>,
}

impl CarvingEngine {
    /// Creates an engine over the given catalog, naming with the local clock
    pub fn new(catalog: Arc<SignatureCatalog>) -> Self {
        Self {
            catalog,
            clock: Arc::new(LocalClock),
            cancellation: None,
        }
    }

    /// Creates an engine over the standard catalog
    pub fn standard() -> Self {
        Self::new(Arc::new(SignatureCatalog::standard().clone()))
    }

    /// Replaces the clock used for the timestamp field of artifact names
    pub fn with_clock(mut self, clock: Arc<dyn NamingClock>) -> Self {
        self.clock = clock;
        self
    }

    /// Checks `token` between header matches and stops early once it is set
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Returns the catalog this engine resolves identifiers against
    pub fn catalog(&self) -> &SignatureCatalog {
        &self.catalog
    }

    /// Carves every selected type out of `buffer`.
    ///
    /// Identifiers unknown to the catalog are skipped (and listed in the
    /// result); repeated identifiers are scanned once. Unterminated and
    /// rejected candidates are dropped without error. A sink failure stops
    /// the run.
    ///
    /// # Errors
    ///
    /// [`CarverError::NoTypesSelected`] if `selection` is empty, before
    /// anything is scanned; [`CarverError::Sink`] if the sink refuses an
    /// artifact.
    pub fn extract<S, T>(
        &self,
        buffer: &[u8],
        selection: &[T],
        sink: &S,
        progress: Option<&dyn Fn(&ScanProgress)>,
    ) -> Result<ScanResult, CarverError>
    where
        S: ArtifactSink + ?Sized,
        T: AsRef<str>,
    {
        if selection.is_empty() {
            return Err(CarverError::NoTypesSelected);
        }

        let started = Instant::now();
        let mut result = ScanResult::new(buffer.len() as u64);

        let mut signatures: Vec<&FileSignature> = Vec::with_capacity(selection.len());
        for id in selection.iter().map(AsRef::as_ref) {
            match self.catalog.lookup(id) {
                Some(signature) => {
                    if !signatures.iter().any(|s| s.file_type() == signature.file_type()) {
                        signatures.push(signature);
                    }
                }
                None => {
                    warn!(type_id = id, "Skipping unknown file type");
                    result.add_unknown_type(id);
                }
            }
        }

        info!(
            payload_bytes = buffer.len(),
            types = signatures.len(),
            "Starting carve"
        );

        let pass_len = buffer.len() as u64;
        let mut tracker = ScanProgress::new(pass_len * signatures.len() as u64);
        let mut next_sequence: u64 = 0;

        'types: for (pass, signature) in signatures.iter().enumerate() {
            result.add_type(signature.file_type());
            let pass_base = pass as u64 * pass_len;
            let mut headers: Peekable<HeaderMatches<'_>> =
                HeaderMatches::new(buffer, signature.header()).peekable();
            let mut delimiter = Delimiter::new(buffer, signature);

            while let Some(start) = headers.next() {
                if self.is_cancelled() {
                    info!(type_id = signature.id(), offset = start, "Carve cancelled");
                    result.mark_interrupted();
                    break 'types;
                }

                let Some(candidate) = delimiter.delimit(start, headers.peek().copied()) else {
                    debug!(
                        type_id = signature.id(),
                        offset = start,
                        "No footer after header, dropping"
                    );
                    continue;
                };

                let data = candidate.slice(buffer);
                if !signature.validate(data) {
                    debug!(
                        type_id = signature.id(),
                        offset = start,
                        len = candidate.len(),
                        "Candidate rejected by validator"
                    );
                    continue;
                }

                let sequence = next_sequence;
                next_sequence += 1;
                let filename = artifact_filename(signature.id(), &self.clock.stamp(), sequence);
                let artifact = Artifact::new(
                    sequence,
                    signature.file_type(),
                    start as u64,
                    data,
                    filename,
                );

                let written = sink.write(&artifact).map_err(|source| CarverError::Sink {
                    filename: artifact.filename().to_string(),
                    source,
                })?;

                debug!(
                    type_id = signature.id(),
                    offset = start,
                    len = candidate.len(),
                    filename = artifact.filename(),
                    "Artifact emitted"
                );

                result.add_artifact(
                    signature.file_type(),
                    ArtifactDescriptor {
                        sequence,
                        type_id: signature.id(),
                        source_offset: start as u64,
                        size: artifact.size(),
                        filename: artifact.filename().to_string(),
                        saved_path: written.saved_path,
                        sha256: written.sha256,
                    },
                );

                if let Some(callback) = progress {
                    tracker.advance_to(pass_base + start as u64);
                    tracker.artifacts_found = result.total_artifacts();
                    tracker.last_type = Some(signature.file_type());
                    callback(&tracker);
                }
            }

            if let Some(callback) = progress {
                tracker.advance_to(pass_base + pass_len);
                callback(&tracker);
            }
        }

        result.set_duration(started.elapsed());

        info!(
            artifacts = result.total_artifacts(),
            interrupted = result.was_interrupted(),
            elapsed_ms = result.duration().as_millis() as u64,
            "Carve complete"
        );

        Ok(result)
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

impl Default for CarvingEngine {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for CarvingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CarvingEngine")
            .field("types", &self.catalog.all_ids())
            .field("cancellable", &self.cancellation.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::FileType;
    use crate::domain::services::FixedClock;
    use crate::infrastructure::persistence::MemorySink;
    use std::cell::RefCell;

    fn engine() -> CarvingEngine {
        CarvingEngine::standard().with_clock(Arc::new(FixedClock::new("101010")))
    }

    #[test]
    fn header_matches_report_overlapping_occurrences() {
        let matches: Vec<usize> = HeaderMatches::new(b"AAAA", b"AA").collect();
        assert_eq!(matches, vec![0, 1, 2]);
    }

    #[test]
    fn header_matches_on_empty_buffer() {
        assert_eq!(HeaderMatches::new(b"", b"BM").count(), 0);
    }

    #[test]
    fn header_matches_at_the_very_end() {
        let matches: Vec<usize> = HeaderMatches::new(b"xxBM", b"BM").collect();
        assert_eq!(matches, vec![2]);
    }

    #[test]
    fn footer_search_starts_at_the_header() {
        let catalog = SignatureCatalog::standard();
        let jpg = catalog.lookup("jpg").unwrap();
        // FF D8 FF D9: the footer overlaps the header's last byte
        let buffer = [0xFF, 0xD8, 0xFF, 0xD9, 0x00];
        let candidate = delimit(&buffer, jpg, 0, None).unwrap();
        assert_eq!(candidate.range(), 0..4);
    }

    #[test]
    fn unterminated_footer_candidate_is_none() {
        let catalog = SignatureCatalog::standard();
        let pdf = catalog.lookup("pdf").unwrap();
        assert_eq!(delimit(b"%PDF-1.4 no end", pdf, 0, None), None);
    }

    #[test]
    fn footerless_candidate_runs_to_next_header_or_end() {
        let catalog = SignatureCatalog::standard();
        let gz = catalog.lookup("gz").unwrap();
        let buffer = [0x1F, 0x8B, 0x01, 0x1F, 0x8B, 0x02];
        assert_eq!(delimit(&buffer, gz, 0, Some(3)).unwrap().range(), 0..3);
        assert_eq!(delimit(&buffer, gz, 3, None).unwrap().range(), 3..6);
    }

    #[test]
    fn delimiter_reuses_a_footer_shared_by_overlapping_headers() {
        let catalog = SignatureCatalog::standard();
        let jpg = catalog.lookup("jpg").unwrap();
        let buffer = [
            0xFF, 0xD8, 0xFF, 0xD8, 0xFF, 0x41, 0xFF, 0xD9, 0xFF, 0xD8, 0xFF, 0xFF, 0xD9,
        ];
        let mut delimiter = Delimiter::new(&buffer, jpg);
        assert_eq!(delimiter.delimit(0, None).unwrap().range(), 0..8);
        assert_eq!(delimiter.delimit(2, None).unwrap().range(), 2..8);
        // past the remembered footer, so a fresh search runs
        assert_eq!(delimiter.delimit(8, None).unwrap().range(), 8..13);
    }

    #[test]
    fn delimiter_stops_searching_once_no_footer_remains() {
        let catalog = SignatureCatalog::standard();
        let pdf = catalog.lookup("pdf").unwrap();
        let buffer = b"%PDF-1 %%EOF %PDF-2 %PDF-3";
        let mut delimiter = Delimiter::new(buffer, pdf);
        assert_eq!(delimiter.delimit(0, None).unwrap().range(), 0..12);
        assert_eq!(delimiter.delimit(13, None), None);
        assert_eq!(delimiter.last_search, FooterSearch::Exhausted);
        assert_eq!(delimiter.delimit(20, None), None);
    }

    #[test]
    fn empty_selection_is_rejected() {
        let sink = MemorySink::new();
        let selection: [&str; 0] = [];
        let err = engine().extract(b"anything", &selection, &sink, None).unwrap_err();
        assert!(matches!(err, CarverError::NoTypesSelected));
    }

    #[test]
    fn repeated_ids_are_scanned_once() {
        let sink = MemorySink::new();
        let buffer = [0x1F, 0x8B, 0x08, 0x00];
        let result = engine().extract(&buffer, &["gz", "gz"], &sink, None).unwrap();
        assert_eq!(result.total_artifacts(), 1);
        assert_eq!(result.type_counts(), &[(FileType::Gz, 1)]);
    }

    #[test]
    fn progress_is_monotonic_and_completes() {
        let sink = MemorySink::new();
        let mut buffer = vec![0x1F, 0x8B, 0x00, 0x00];
        buffer.extend_from_slice(&[0x1F, 0x8B, 0x00, 0x00]);
        let seen = RefCell::new(Vec::new());
        let callback = |p: &ScanProgress| seen.borrow_mut().push(p.percentage());

        engine()
            .extract(&buffer, &["gz", "mp3"], &sink, Some(&callback))
            .unwrap();

        let seen = seen.into_inner();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]), "{seen:?}");
        assert_eq!(seen.last().copied(), Some(100.0));
    }

    #[test]
    fn cancellation_stops_before_the_next_header() {
        let token = CancellationToken::new();
        token.cancel();
        let sink = MemorySink::new();
        let result = engine()
            .with_cancellation(token)
            .extract(&[0x1F, 0x8B, 0x00], &["gz"], &sink, None)
            .unwrap();
        assert!(result.was_interrupted());
        assert_eq!(result.total_artifacts(), 0);
    }
}
