//! Signature catalog service
//!
//! The immutable table of file signatures the carver knows about, keyed by
//! short type identifier.

use crate::domain::entities::{FileSignature, FileType};
use std::sync::LazyLock;

const JPG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF];
const JPG_FOOTER: &[u8] = &[0xFF, 0xD9];
const PNG_HEADER: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const PNG_FOOTER: &[u8] = &[0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82];
const GIF_HEADER: &[u8] = b"GIF";
const GIF_FOOTER: &[u8] = &[0x00, 0x3B];
const BMP_HEADER: &[u8] = b"BM";
const RIFF_HEADER: &[u8] = b"RIFF";
const PDF_HEADER: &[u8] = b"%PDF";
const PDF_FOOTER: &[u8] = b"%%EOF";
const ZIP_HEADER: &[u8] = &[0x50, 0x4B, 0x03, 0x04];
const GZ_HEADER: &[u8] = &[0x1F, 0x8B];
const MP3_HEADER: &[u8] = &[0xFF, 0xFB];
const MP4_HEADER: &[u8] = &[0x00, 0x00, 0x00, 0x18, 0x66, 0x74, 0x79, 0x70];

static STANDARD_SIGNATURES: [FileSignature; 12] = [
    FileSignature::new(FileType::Jpg, JPG_HEADER, Some(JPG_FOOTER)),
    FileSignature::new(FileType::Png, PNG_HEADER, Some(PNG_FOOTER)),
    FileSignature::new(FileType::Gif, GIF_HEADER, Some(GIF_FOOTER)),
    FileSignature::new(FileType::Bmp, BMP_HEADER, None),
    // WebP is a RIFF form; the size field is ignored and the next RIFF
    // header bounds the candidate
    FileSignature::new(FileType::WebP, RIFF_HEADER, None),
    FileSignature::new(FileType::Pdf, PDF_HEADER, Some(PDF_FOOTER)),
    // the three OOXML/zip entries share a local file header and are told
    // apart by their validators
    FileSignature::new(FileType::Docx, ZIP_HEADER, None),
    FileSignature::new(FileType::Xlsx, ZIP_HEADER, None),
    FileSignature::new(FileType::Zip, ZIP_HEADER, None),
    FileSignature::new(FileType::Gz, GZ_HEADER, None),
    FileSignature::new(FileType::Mp3, MP3_HEADER, None),
    FileSignature::new(FileType::Mp4, MP4_HEADER, None),
];

static STANDARD: LazyLock<SignatureCatalog> =
    LazyLock::new(|| SignatureCatalog::new(STANDARD_SIGNATURES.to_vec()));

/// Catalog of file signatures used for carving
///
/// Built once and then only read, so a single catalog can back any number
/// of concurrent scans.
///
/// # Example
///
/// ```
/// use packet_carver::domain::services::SignatureCatalog;
///
/// let catalog = SignatureCatalog::standard();
/// let jpg = catalog.lookup("jpg").unwrap();
/// assert_eq!(jpg.header(), &[0xFF, 0xD8, 0xFF]);
/// assert!(catalog.lookup("tar").is_none());
/// ```
#[derive(Debug, Clone)]
pub struct SignatureCatalog {
    signatures: Vec<FileSignature>,
}

impl SignatureCatalog {
    /// Creates a catalog from a list of signatures
    ///
    /// Identifiers are unique: a later signature for an already listed type
    /// is ignored.
    pub fn new(signatures: Vec<FileSignature>) -> Self {
        let mut unique: Vec<FileSignature> = Vec::with_capacity(signatures.len());
        for signature in signatures {
            if !unique.iter().any(|s| s.file_type() == signature.file_type()) {
                unique.push(signature);
            }
        }
        Self { signatures: unique }
    }

    /// Returns the shared catalog of every supported type
    pub fn standard() -> &'static SignatureCatalog {
        &STANDARD
    }

    /// Looks up the signature for a type identifier
    pub fn lookup(&self, id: &str) -> Option<&FileSignature> {
        self.signatures.iter().find(|s| s.id() == id)
    }

    /// Looks up the signature for a file type
    pub fn get(&self, file_type: FileType) -> Option<&FileSignature> {
        self.signatures.iter().find(|s| s.file_type() == file_type)
    }

    /// Returns every known identifier, in catalog order
    pub fn all_ids(&self) -> Vec<&'static str> {
        self.signatures.iter().map(|s| s.id()).collect()
    }

    /// Returns all registered signatures
    pub fn signatures(&self) -> &[FileSignature] {
        &self.signatures
    }

    /// Returns whether the identifier is known
    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_some()
    }

    /// Returns the number of registered signatures
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

impl Default for SignatureCatalog {
    fn default() -> Self {
        Self::standard().clone()
    }
}
