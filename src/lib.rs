//! Temparc-rs: extractor for the workshop-download temporary archive format
//!
//! A temporary archive is a 32-bit entry count followed by a sequence of
//! entries, each a length-prefixed Windows-1252 name and a length-prefixed
//! payload. Lengths use the format family's sign-aware variable-width
//! "compact index" encoding (1 to 5 bytes) rather than fixed-width words.
//!
//! The library decodes archives ([`Decoder`]) and materializes their entries
//! to caller-supplied destinations ([`extract`]) under one of two policies:
//! unconditional batch extraction, or interactive confirm-per-entry through
//! an injected [`DecisionPrompt`].
//!
//! # Example
//!
//! ```no_run
//! use temparc_rs::{extract, Decoder, DirResolver, ExtractPolicy};
//! use std::fs::File;
//!
//! let stream = File::open("TempArchive042")?;
//! let mut decoder = Decoder::new(stream);
//! let mut resolver = DirResolver::new("extracted/TempArchive042");
//! let report = extract(&mut decoder, ExtractPolicy::Unconditional, &mut resolver)?;
//! println!("extracted {} of {} entries", report.extracted, report.total);
//! # Ok::<(), temparc_rs::TempArchiveError>(())
//! ```

// Core modules
pub mod archive;
pub mod discover;
pub mod error;

// Re-export commonly used types
pub use archive::{
    encode_compact_index, extract, is_affirmative, CountFormat, DecisionPrompt, Decoder,
    DestinationResolver, DirResolver, EntriesProcessed, EntryDecision, ExtractPolicy,
    ResolvedPath, BLOCK_SIZE, MAX_NAME_LENGTH,
};
pub use discover::{discover_archives, ARCHIVE_PREFIX};
pub use error::{Result, TempArchiveError};
