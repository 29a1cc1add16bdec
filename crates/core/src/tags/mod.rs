//! Tag handling.
//!
//! Vorbis comments are read from `metaflac --list` output and mapped to the
//! ID3 fields that `lame` writes into the encoded MP3.

mod id3;
mod vorbis;

pub use id3::Id3Tags;
pub use vorbis::{parse_vorbis_comments, VorbisComments};
