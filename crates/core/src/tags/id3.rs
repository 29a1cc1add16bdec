//! ID3 fields and their `lame` tagging flags.
//!
//! The encoder writes the ID3v2 tag itself; this module only decides which
//! values go into which frame.

use super::vorbis::VorbisComments;

/// The ID3 fields written to every output file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Id3Tags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub date: Option<String>,
    pub track: Option<String>,
    pub disc: Option<String>,
    pub genre: Option<String>,
    pub comment: Option<String>,
}

impl Id3Tags {
    /// Maps Vorbis comments to ID3 fields. Missing comments leave the field
    /// empty.
    pub fn from_comments(comments: &VorbisComments) -> Self {
        Self {
            title: comments.joined(&["TITLE"]),
            artist: comments.joined(&["ARTIST"]),
            album: comments.joined(&["ALBUM"]),
            album_artist: comments.joined(&["ALBUMARTIST", "ALBUM ARTIST"]),
            date: comments.first(&["DATE", "YEAR"]).map(str::to_string),
            track: numbered(
                comments.first(&["TRACKNUMBER"]),
                comments.first(&["TRACKTOTAL", "TOTALTRACKS"]),
            ),
            disc: numbered(
                comments.first(&["DISCNUMBER"]),
                comments.first(&["DISCTOTAL", "TOTALDISCS"]),
            ),
            genre: comments.joined(&["GENRE"]),
            comment: comments.joined(&["COMMENT", "DESCRIPTION"]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    /// Number of fields that carry a value.
    pub fn field_count(&self) -> usize {
        self.fields().iter().filter(|(_, value)| value.is_some()).count()
    }

    fn fields(&self) -> [(Frame, &Option<String>); 9] {
        [
            (Frame::Flag("--tt"), &self.title),
            (Frame::Flag("--ta"), &self.artist),
            (Frame::Flag("--tl"), &self.album),
            (Frame::Raw("TPE2"), &self.album_artist),
            (Frame::Flag("--ty"), &self.date),
            (Frame::Flag("--tn"), &self.track),
            (Frame::Raw("TPOS"), &self.disc),
            (Frame::Flag("--tg"), &self.genre),
            (Frame::Flag("--tc"), &self.comment),
        ]
    }

    /// `lame` arguments that embed these fields as an ID3v2 tag.
    ///
    /// Empty when no field is set, so untagged sources produce untagged
    /// files. Non-ASCII values switch the tag to UTF-16 text.
    pub fn encoder_args(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }

        let mut args = vec!["--add-id3v2".to_string()];
        let mut ascii = true;
        for (frame, value) in self.fields() {
            let Some(value) = value else {
                continue;
            };
            ascii &= value.is_ascii();
            match frame {
                Frame::Flag(flag) => {
                    args.push(flag.to_string());
                    args.push(value.clone());
                }
                Frame::Raw(id) => {
                    args.push("--tv".to_string());
                    args.push(format!("{}={}", id, value));
                }
            }
        }
        if !ascii {
            args.insert(1, "--id3v2-utf16".to_string());
        }
        args
    }
}

/// How a field reaches the encoder: a dedicated flag or a raw `--tv` frame.
#[derive(Debug, Clone, Copy)]
enum Frame {
    Flag(&'static str),
    Raw(&'static str),
}

fn numbered(number: Option<&str>, total: Option<&str>) -> Option<String> {
    let number = number?;
    match total {
        Some(total) if !number.contains('/') => Some(format!("{}/{}", number, total)),
        _ => Some(number.to_string()),
    }
}
