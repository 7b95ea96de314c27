//! File signature entity
//!
//! Represents the magic bytes (header and optional footer) that identify
//! a specific file type, plus the content check applied to a delimited
//! candidate before it is accepted.

use memchr::memmem;
use std::fmt;

/// Types of files that can be carved from a payload stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileType {
    /// JPEG image
    Jpg,
    /// PNG image
    Png,
    /// GIF image (87a or 89a)
    Gif,
    /// Windows bitmap
    Bmp,
    /// WebP image in a RIFF container
    WebP,
    /// PDF document
    Pdf,
    /// Word document (OOXML zip)
    Docx,
    /// Excel workbook (OOXML zip)
    Xlsx,
    /// Generic zip archive
    Zip,
    /// Gzip stream
    Gz,
    /// MPEG audio layer III frame stream
    Mp3,
    /// ISO base media (MP4)
    Mp4,
}

impl FileType {
    /// Every known type, in catalog order
    pub const ALL: [FileType; 12] = [
        FileType::Jpg,
        FileType::Png,
        FileType::Gif,
        FileType::Bmp,
        FileType::WebP,
        FileType::Pdf,
        FileType::Docx,
        FileType::Xlsx,
        FileType::Zip,
        FileType::Gz,
        FileType::Mp3,
        FileType::Mp4,
    ];

    /// Returns the short identifier, also used as the file extension
    pub fn id(&self) -> &'static str {
        match self {
            FileType::Jpg => "jpg",
            FileType::Png => "png",
            FileType::Gif => "gif",
            FileType::Bmp => "bmp",
            FileType::WebP => "webp",
            FileType::Pdf => "pdf",
            FileType::Docx => "docx",
            FileType::Xlsx => "xlsx",
            FileType::Zip => "zip",
            FileType::Gz => "gz",
            FileType::Mp3 => "mp3",
            FileType::Mp4 => "mp4",
        }
    }

    /// Returns a human-readable name for this file type
    pub fn name(&self) -> &'static str {
        match self {
            FileType::Jpg => "JPEG Image",
            FileType::Png => "PNG Image",
            FileType::Gif => "GIF Image",
            FileType::Bmp => "BMP Image",
            FileType::WebP => "WebP Image",
            FileType::Pdf => "PDF Document",
            FileType::Docx => "Word Document",
            FileType::Xlsx => "Excel Workbook",
            FileType::Zip => "ZIP Archive",
            FileType::Gz => "Gzip Archive",
            FileType::Mp3 => "MP3 Audio",
            FileType::Mp4 => "MP4 Video",
        }
    }

    /// Resolves a short identifier (`"jpg"`, `"pdf"`, ...) to a file type
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.id() == id)
    }

    /// Checks whether a delimited byte range looks like a genuine file of
    /// this type.
    ///
    /// The check only accepts or rejects; it never moves the boundaries.
    pub fn validate(&self, data: &[u8]) -> bool {
        match self {
            FileType::Jpg => data.starts_with(&[0xFF, 0xD8]) && data.ends_with(&[0xFF, 0xD9]),
            FileType::Png => data.starts_with(b"\x89PNG") && contains(data, b"IEND"),
            FileType::Gif => {
                (data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a"))
                    && data.ends_with(&[0x00, 0x3B])
            }
            FileType::Bmp => data.starts_with(b"BM") && data.len() > 30,
            FileType::WebP => data.starts_with(b"RIFF") && contains(head(data, 20), b"WEBP"),
            FileType::Pdf => data.starts_with(b"%PDF") && contains(tail(data, 20), b"%%EOF"),
            FileType::Docx => {
                data.starts_with(ZIP_LOCAL_HEADER) && contains(head(data, 1000), b"word/")
            }
            FileType::Xlsx => {
                data.starts_with(ZIP_LOCAL_HEADER) && contains(head(data, 1000), b"xl/")
            }
            FileType::Zip => data.starts_with(ZIP_LOCAL_HEADER),
            FileType::Gz => data.starts_with(&[0x1F, 0x8B]),
            FileType::Mp3 => data.starts_with(&[0xFF, 0xFB]),
            FileType::Mp4 => {
                data.starts_with(&[0x00, 0x00, 0x00]) && contains(head(data, 1000), b"moov")
            }
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

const ZIP_LOCAL_HEADER: &[u8] = b"PK\x03\x04";

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    memmem::find(haystack, needle).is_some()
}

fn head(data: &[u8], n: usize) -> &[u8] {
    &data[..data.len().min(n)]
}

fn tail(data: &[u8], n: usize) -> &[u8] {
    &data[data.len().saturating_sub(n)..]
}

/// A file signature: the header that starts a candidate and, for
/// footer-delimited formats, the footer that ends it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSignature {
    /// The type of file this signature identifies
    file_type: FileType,
    /// The header bytes (never empty)
    header: &'static [u8],
    /// Optional footer bytes; `None` means the candidate runs up to the
    /// next header of the same type
    footer: Option<&'static [u8]>,
}

impl FileSignature {
    /// Creates a new file signature
    ///
    /// # Panics
    ///
    /// Panics if `header` is empty, or if `footer` is `Some` but empty.
    pub const fn new(
        file_type: FileType,
        header: &'static [u8],
        footer: Option<&'static [u8]>,
    ) -> Self {
        assert!(!header.is_empty(), "signature header must not be empty");
        if let Some(footer) = footer {
            assert!(!footer.is_empty(), "signature footer must not be empty");
        }
        Self {
            file_type,
            header,
            footer,
        }
    }

    /// Returns the file type this signature identifies
    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// Returns the short type identifier
    pub fn id(&self) -> &'static str {
        self.file_type.id()
    }

    /// Returns the header bytes
    pub fn header(&self) -> &'static [u8] {
        self.header
    }

    /// Returns the footer bytes if present
    pub fn footer(&self) -> Option<&'static [u8]> {
        self.footer
    }

    /// Checks if the given data starts with this signature's header
    pub fn matches_header(&self, data: &[u8]) -> bool {
        data.starts_with(self.header)
    }

    /// Finds the end of the first footer in `data`, footer included.
    ///
    /// Returns `None` if the signature has no footer or the footer does not
    /// occur.
    pub fn find_footer(&self, data: &[u8]) -> Option<usize> {
        self.footer
            .and_then(|footer| memmem::find(data, footer).map(|pos| pos + footer.len()))
    }

    /// Runs the type's content check over a candidate range
    pub fn validate(&self, data: &[u8]) -> bool {
        self.file_type.validate(data)
    }
}
