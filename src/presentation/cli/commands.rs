//! CLI commands using clap

use crate::application::dto::DEFAULT_OUTPUT_DIR;
use crate::domain::entities::FileType;
use clap::Parser;
use std::path::PathBuf;

/// Packet Carver - file recovery from network captures
///
/// Reassembles the TCP payload of a capture and carves embedded images,
/// documents, archives and media out of it by their signatures.
#[derive(Parser, Debug)]
#[command(name = "packet-carver")]
#[command(version)]
#[command(about = "Extract embedded files from network capture payloads", long_about = None)]
pub struct Cli {
    /// Capture file to analyse (a raw payload dump with --raw)
    #[arg(required_unless_present = "list_types")]
    pub capture: Option<PathBuf>,

    /// Output directory for carved files
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Extract all supported file types
    #[arg(long)]
    pub all: bool,

    /// Extract JPEG images
    #[arg(long)]
    pub jpg: bool,
    /// Extract PNG images
    #[arg(long)]
    pub png: bool,
    /// Extract GIF images
    #[arg(long)]
    pub gif: bool,
    /// Extract BMP images
    #[arg(long)]
    pub bmp: bool,
    /// Extract WebP images
    #[arg(long)]
    pub webp: bool,
    /// Extract PDF documents
    #[arg(long)]
    pub pdf: bool,
    /// Extract Word documents
    #[arg(long)]
    pub docx: bool,
    /// Extract Excel workbooks
    #[arg(long)]
    pub xlsx: bool,
    /// Extract ZIP archives
    #[arg(long)]
    pub zip: bool,
    /// Extract gzip streams
    #[arg(long)]
    pub gz: bool,
    /// Extract MP3 audio
    #[arg(long)]
    pub mp3: bool,
    /// Extract MP4 video
    #[arg(long)]
    pub mp4: bool,

    /// Treat the input as an already-assembled payload dump
    #[arg(long)]
    pub raw: bool,

    /// Path to the tshark executable
    #[arg(long, value_name = "PATH", default_value = "tshark")]
    pub tshark: String,

    /// Write manifest.json with offsets and SHA-256 of every carved file
    #[arg(long)]
    pub manifest: bool,

    /// Refuse to overwrite existing files in the output directory
    #[arg(long)]
    pub no_clobber: bool,

    /// Flush every carved file to disk before moving on
    #[arg(long)]
    pub sync: bool,

    /// List supported file types and exit
    #[arg(long)]
    pub list_types: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Returns the selected type identifiers in catalog order
    ///
    /// `--all` wins over individual flags. An empty result means nothing
    /// was selected.
    pub fn selected_types(&self) -> Vec<&'static str> {
        if self.all {
            return FileType::ALL.iter().map(FileType::id).collect();
        }

        let flags = [
            (self.jpg, FileType::Jpg),
            (self.png, FileType::Png),
            (self.gif, FileType::Gif),
            (self.bmp, FileType::Bmp),
            (self.webp, FileType::WebP),
            (self.pdf, FileType::Pdf),
            (self.docx, FileType::Docx),
            (self.xlsx, FileType::Xlsx),
            (self.zip, FileType::Zip),
            (self.gz, FileType::Gz),
            (self.mp3, FileType::Mp3),
            (self.mp4, FileType::Mp4),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, file_type)| file_type.id())
            .collect()
    }

    /// Returns the default tracing filter for the verbosity level
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn individual_flags_select_in_catalog_order() {
        let cli = Cli::try_parse_from(["packet-carver", "dump.pcap", "--pdf", "--jpg"]).unwrap();
        assert_eq!(cli.selected_types(), vec!["jpg", "pdf"]);
        assert_eq!(cli.output, PathBuf::from("extracted_files"));
    }

    #[test]
    fn all_selects_every_type() {
        let cli = Cli::try_parse_from(["packet-carver", "dump.pcap", "--all", "--gz"]).unwrap();
        assert_eq!(cli.selected_types().len(), 12);
    }

    #[test]
    fn no_flags_selects_nothing() {
        let cli = Cli::try_parse_from(["packet-carver", "dump.pcap"]).unwrap();
        assert!(cli.selected_types().is_empty());
    }

    #[test]
    fn capture_is_required_unless_listing() {
        assert!(Cli::try_parse_from(["packet-carver", "--all"]).is_err());
        assert!(Cli::try_parse_from(["packet-carver", "--list-types"]).is_ok());
    }

    #[test]
    fn write_flags_default_off() {
        let cli = Cli::try_parse_from(["packet-carver", "x", "--all"]).unwrap();
        assert!(!cli.sync);
        assert!(!cli.no_clobber);

        let cli = Cli::try_parse_from(["packet-carver", "x", "--all", "--sync"]).unwrap();
        assert!(cli.sync);
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["packet-carver", "x", "-vv"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
    }
}
