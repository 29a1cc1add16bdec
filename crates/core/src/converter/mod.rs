//! Converter module for turning FLAC files into tagged MP3s.
//!
//! This module provides the `Converter` trait and `LameConverter`, which
//! runs a three-stage pipeline per file:
//!
//! 1. `metaflac` lists the Vorbis comments and maps them to ID3 fields,
//! 2. `flac` decodes the source to PCM on its stdout,
//! 3. `lame` reads that stream and encodes it, tag included, into a temp
//!    file that is moved into place once both processes succeed.
//!
//! # Example
//!
//! ```ignore
//! use flac2mp3_core::converter::{Converter, ConversionJob, LameConverter};
//!
//! let converter = LameConverter::with_defaults();
//! converter.validate().await?;
//!
//! let job = ConversionJob::new(input, PathBuf::from("/out/01.mp3"), options);
//! let report = converter.convert(&job).await?;
//! println!("Converted in {} ms", report.duration_ms);
//! ```

mod error;
mod lame;
mod traits;
mod types;

pub use error::{ConverterError, Stage};
pub use lame::LameConverter;
pub use traits::Converter;
pub use types::{ConversionJob, ConversionReport};
