// SPDX-License-Identifier: MIT

//! Challenge model, media types, and codec.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::codec::{self, Record};
use crate::error::{Result, SyncError};

/// Kind of media attached to a challenge.
///
/// Each variant has a fixed machine-readable tag (stored in records)
/// and a fixed human-readable label (shown in clients). Both mappings
/// are bijective and round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    AutoPlayVideo,
    Gif,
    LinkedVideo,
    StaticImage,
}

impl MediaType {
    pub const ALL: [MediaType; 4] = [
        MediaType::AutoPlayVideo,
        MediaType::Gif,
        MediaType::LinkedVideo,
        MediaType::StaticImage,
    ];

    /// Machine tag used in stored records.
    pub fn tag(self) -> &'static str {
        match self {
            MediaType::AutoPlayVideo => "autoPlayVideo",
            MediaType::Gif => "gif",
            MediaType::LinkedVideo => "linkedVideo",
            MediaType::StaticImage => "staticImage",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            MediaType::AutoPlayVideo => "Auto-play video",
            MediaType::Gif => "GIF",
            MediaType::LinkedVideo => "Linked video",
            MediaType::StaticImage => "Static image",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == label)
    }
}

/// Media attached to a challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeMedia {
    /// External or embeddable link to the media
    pub link: String,
    /// Storage object path, when the media was uploaded by the app
    pub storage_path: Option<String>,
    pub kind: MediaType,
}

impl ChallengeMedia {
    /// Encode as the composite record string:
    /// `<tag> – <url>` or `<tag> – <path> – <url>`.
    pub fn encode(&self) -> String {
        match &self.storage_path {
            Some(path) => format!(
                "{}{sep}{}{sep}{}",
                self.kind.tag(),
                path,
                self.link,
                sep = codec::MEDIA_DELIMITER
            ),
            None => format!("{}{}{}", self.kind.tag(), codec::MEDIA_DELIMITER, self.link),
        }
    }

    /// Decode the composite string. Any malformed part is reported
    /// against the `media` field.
    pub fn decode(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split(codec::MEDIA_DELIMITER).collect();
        let (tag, storage_path, link) = match parts.as_slice() {
            [tag, link] => (*tag, None, *link),
            [tag, path, link] => (*tag, Some(path.to_string()), *link),
            _ => return Err(SyncError::missing("media")),
        };

        let kind = MediaType::from_tag(tag).ok_or_else(|| SyncError::missing("media"))?;
        reqwest::Url::parse(link).map_err(|_| SyncError::missing("media"))?;

        Ok(Self {
            link: link.to_string(),
            storage_path,
            kind,
        })
    }
}

/// A challenge posted to the app.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    /// Store-assigned id (the record's path key)
    pub id: String,
    pub title: String,
    pub prompt: String,
    pub date_posted: DateTime<Utc>,
    /// Points awarded on completion
    pub point_value: u32,
    pub media: Option<ChallengeMedia>,
}

impl Challenge {
    /// Decode a raw `/allChallenges/{id}` record.
    pub fn decode(id: &str, record: &Record) -> Result<Self> {
        let title = codec::require_str(record, "title")?;
        let prompt = codec::require_str(record, "prompt")?;
        let date_posted = codec::require_timestamp(record, "datePosted")?;
        let point_value = codec::require_u32(record, "pointValue")?;
        let media = match codec::opt_str(record, "media")? {
            Some(raw) => Some(ChallengeMedia::decode(&raw)?),
            None => None,
        };

        Ok(Self {
            id: id.to_string(),
            title,
            prompt,
            date_posted,
            point_value,
            media,
        })
    }

    /// Encode for the primary store. Points are a native number here;
    /// only the external source wants them string-typed.
    pub fn encode(&self) -> Record {
        let mut record = Record::new();
        record.insert("title".into(), json!(self.title));
        record.insert("prompt".into(), json!(self.prompt));
        record.insert(
            "datePosted".into(),
            json!(codec::format_timestamp(self.date_posted)),
        );
        record.insert("pointValue".into(), json!(self.point_value));
        let media = match &self.media {
            Some(media) => media.encode(),
            None => codec::SENTINEL.to_string(),
        };
        record.insert("media".into(), json!(media));
        record
    }
}
