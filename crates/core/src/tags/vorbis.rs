//! Vorbis comment parsing.

use regex_lite::Regex;

const COMMENT_LINE: &str = r"^\s*comment\[\d+\]:\s*([^=]+)=(.*)$";

/// Vorbis comments of one FLAC file, in stream order.
///
/// Keys are upper-cased; a key may appear more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VorbisComments {
    entries: Vec<(String, String)>,
}

impl VorbisComments {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        self.entries.push((key.trim().to_uppercase(), value.into()));
    }

    /// Every value stored under `key`, in order.
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        let key = key.to_uppercase();
        self.entries
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Values of the first of `keys` that is present, joined with `"; "`.
    pub fn joined(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .map(|k| self.get_all(k))
            .find(|values| !values.is_empty())
            .map(|values| values.join("; "))
    }

    /// First value of the first of `keys` that is present.
    pub fn first(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| {
            let key = k.to_uppercase();
            self.entries
                .iter()
                .find(|(entry_key, _)| *entry_key == key)
                .map(|(_, v)| v.as_str())
        })
    }
}

/// Parses the text printed by `metaflac --list --block-type=VORBIS_COMMENT`.
///
/// Only `comment[i]: KEY=VALUE` lines are used; the vendor string and block
/// headers are ignored.
pub fn parse_vorbis_comments(text: &str) -> VorbisComments {
    let mut comments = VorbisComments::default();
    let Some(re) = Regex::new(COMMENT_LINE).ok() else {
        return comments;
    };
    for line in text.lines() {
        if let Some(caps) = re.captures(line) {
            let key = caps.get(1).map_or("", |m| m.as_str());
            let value = caps.get(2).map_or("", |m| m.as_str());
            comments.push(key, value.trim_end_matches('\r'));
        }
    }
    comments
}
