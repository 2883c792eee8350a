//! # Generated Artifacts and Metadata Annotations
//!
//! A [`GeneratedArtifact`] is the opaque output of an external code
//! generator: a file name, an extension, its bytes and the line-comment
//! syntax of the target language. This module turns it into the exact bytes
//! that get published.
//!
//! ## Annotation format
//!
//! When [`GenerationMetadata`] asks for it, one trailing comment line per
//! enabled flag is appended, date first:
//!
//! ```text
//! <prefix> date: 2024-05-17<suffix>
//! <prefix> time: 13:45:09.123456<suffix>
//! ```
//!
//! The timestamp is sampled once by the caller, so date and time always
//! describe the same instant. [`strip_annotations`] and
//! [`parse_annotations`] undo and inspect this format.

use chrono::NaiveDateTime;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// `chrono` format of the date annotation value.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
/// `chrono` format of the time annotation value (microsecond precision).
pub const TIME_FORMAT: &str = "%H:%M:%S%.6f";

/// Which generation metadata annotations to append.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationMetadata {
    /// Append a `date: YYYY-MM-DD` line.
    #[serde(rename = "date", default)]
    pub include_date: bool,
    /// Append a `time: HH:MM:SS.ffffff` line.
    #[serde(rename = "time", default)]
    pub include_time: bool,
}

impl GenerationMetadata {
    pub fn is_empty(&self) -> bool {
        !self.include_date && !self.include_time
    }
}

/// Line-comment syntax of the generated language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSyntax {
    /// Text opening the comment, e.g. `//`, `#` or `--`.
    pub prefix: String,
    /// Text closing the comment, empty for true line comments.
    #[serde(default)]
    pub suffix: String,
}

impl CommentSyntax {
    pub fn new(prefix: &str, suffix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// A comment running to the end of the line.
    pub fn line(prefix: &str) -> Self {
        Self::new(prefix, "")
    }

    fn annotation(&self, label: &str, value: &str) -> String {
        format!("{} {}: {}{}\n", self.prefix, label, value, self.suffix)
    }

    fn annotation_pattern(&self) -> Result<Regex> {
        let pattern = format!(
            r"^{} (date|time): (\S+){}$",
            regex::escape(&self.prefix),
            regex::escape(&self.suffix)
        );
        Ok(Regex::new(&pattern)?)
    }
}

impl Default for CommentSyntax {
    fn default() -> Self {
        Self::line("//")
    }
}

/// The output of the external generator for one configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// File name without extension, e.g. `TestConfig`.
    pub name: String,
    /// Raw generated content.
    pub content: Vec<u8>,
    /// File extension without the leading dot, e.g. `es`.
    pub extension: String,
    /// Comment syntax used for metadata annotations.
    pub comment: CommentSyntax,
}

impl GeneratedArtifact {
    pub fn new(name: &str, extension: &str, content: impl Into<Vec<u8>>, comment: CommentSyntax) -> Self {
        Self {
            name: name.to_string(),
            content: content.into(),
            extension: extension.to_string(),
            comment,
        }
    }

    /// `name.extension`, or just `name` when the extension is empty.
    pub fn file_name(&self) -> String {
        if self.extension.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.extension)
        }
    }

    /// [`GeneratedArtifact::file_name`], rejected with
    /// [`Error::Filesystem`] unless it is one plain path component.
    pub fn checked_file_name(&self) -> Result<String> {
        let file_name = self.file_name();
        let plain = !self.name.is_empty()
            && !file_name.contains(&['/', '\\', '\0'][..])
            && file_name != "."
            && file_name != ".."
            && !file_name.eq_ignore_ascii_case(".git");
        if plain {
            Ok(file_name)
        } else {
            Err(Error::Filesystem {
                message: format!("Artifact file name '{}' is not a plain file name", file_name.escape_debug()),
            })
        }
    }

    /// Whether `published` holds exactly this artifact's raw output,
    /// followed by nothing but metadata annotations.
    ///
    /// Accounts for the line break [`GeneratedArtifact::finalize`] inserts
    /// when the raw output does not end with one.
    pub fn matches_published(&self, published: &[u8]) -> Result<bool> {
        let (content, lines) = split_annotations(published, &self.comment)?;
        if content == self.content.as_slice() {
            return Ok(true);
        }
        let newline_inserted = !lines.is_empty() && !self.content.is_empty() && !self.content.ends_with(b"\n");
        Ok(newline_inserted && content.strip_suffix(b"\n") == Some(self.content.as_slice()))
    }

    /// Produces the bytes to publish, annotated according to `metadata`
    /// with the single instant `now`.
    pub fn finalize(&self, metadata: &GenerationMetadata, now: NaiveDateTime) -> Vec<u8> {
        let mut bytes = self.content.clone();
        if metadata.is_empty() {
            return bytes;
        }

        if !bytes.is_empty() && !bytes.ends_with(b"\n") {
            bytes.push(b'\n');
        }
        if metadata.include_date {
            let date = now.format(DATE_FORMAT).to_string();
            bytes.extend_from_slice(self.comment.annotation("date", &date).as_bytes());
        }
        if metadata.include_time {
            let time = now.format(TIME_FORMAT).to_string();
            bytes.extend_from_slice(self.comment.annotation("time", &time).as_bytes());
        }
        bytes
    }
}

/// Annotation values found at the end of a published file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    pub date: Option<String>,
    pub time: Option<String>,
}

/// Splits `bytes` into the content before the trailing annotation block and
/// the annotation lines themselves.
fn split_annotations<'a>(bytes: &'a [u8], comment: &CommentSyntax) -> Result<(&'a [u8], Vec<&'a str>)> {
    let pattern = comment.annotation_pattern()?;
    let mut end = bytes.len();
    let mut lines = Vec::new();

    // Walk trailing lines backwards while they are annotations.
    while end > 0 {
        let body_end = if bytes[end - 1] == b'\n' { end - 1 } else { end };
        let start = bytes[..body_end]
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |i| i + 1);
        let Ok(line) = std::str::from_utf8(&bytes[start..body_end]) else {
            break;
        };
        if !pattern.is_match(line) || lines.len() == 2 {
            break;
        }
        lines.push(line);
        end = start;
    }

    lines.reverse();
    Ok((&bytes[..end], lines))
}

/// Removes trailing metadata annotation lines written by
/// [`GeneratedArtifact::finalize`].
///
/// A line break that `finalize` inserted before the annotations cannot be
/// told apart from one ending the raw output, so it is kept. Use
/// [`GeneratedArtifact::matches_published`] to compare against raw output
/// that may lack a final line break.
pub fn strip_annotations(bytes: &[u8], comment: &CommentSyntax) -> Result<Vec<u8>> {
    let (content, _) = split_annotations(bytes, comment)?;
    Ok(content.to_vec())
}

/// Extracts the `date`/`time` values of trailing metadata annotations.
pub fn parse_annotations(bytes: &[u8], comment: &CommentSyntax) -> Result<Annotations> {
    let pattern = comment.annotation_pattern()?;
    let (_, lines) = split_annotations(bytes, comment)?;
    let mut annotations = Annotations::default();
    for line in lines {
        if let Some(caps) = pattern.captures(line) {
            let value = caps[2].to_string();
            match &caps[1] {
                "date" => annotations.date = Some(value),
                _ => annotations.time = Some(value),
            }
        }
    }
    Ok(annotations)
}
