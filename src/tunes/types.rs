//! Tune wire types and upload validation.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Visibility of the published video.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    #[default]
    Private,
    Unlisted,
}

/// License attached to the published video.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
pub enum License {
    #[default]
    #[serde(rename = "youtube")]
    #[strum(serialize = "youtube")]
    Youtube,
    #[serde(rename = "creativeCommon")]
    #[strum(serialize = "creativeCommon")]
    CreativeCommon,
}

/// A file payload packaged for upload: original name, MIME type, and the
/// base64-encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaBlob {
    pub name: String,
    pub mime_type: String,
    pub data: String,
}

impl MediaBlob {
    /// Package raw file bytes. Empty input is rejected up front rather than
    /// producing a zero-length upload the backend cannot process.
    pub fn from_bytes(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: &[u8],
    ) -> Result<Self, TuneValidationError> {
        if bytes.is_empty() {
            return Err(TuneValidationError::single("file", "The file is empty."));
        }
        Ok(Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        })
    }
}

/// A tune to create: metadata plus the audio and cover-image payloads.
///
/// `upload_date: None` publishes immediately; `Some` schedules the publish
/// for that instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTune {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
    pub privacy_status: PrivacyStatus,
    pub embeddable: bool,
    pub license: License,
    pub upload_date: Option<DateTime<Utc>>,
    pub audio: MediaBlob,
    pub image: MediaBlob,
}

impl NewTune {
    pub fn is_scheduled(&self) -> bool {
        self.upload_date.is_some()
    }

    /// Field-keyed validation, run before anything goes over the wire.
    ///
    /// Required: title, category, non-empty audio and image payloads. A
    /// scheduled upload date must lie in the future relative to `now`.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), TuneValidationError> {
        let mut errors = BTreeMap::new();
        if self.title.trim().is_empty() {
            errors.insert("title".to_string(), "Title is required.".to_string());
        }
        if self.category.trim().is_empty() {
            errors.insert("category".to_string(), "Category is required.".to_string());
        }
        if self.audio.data.is_empty() {
            errors.insert("audio".to_string(), "Audio file is required.".to_string());
        }
        if self.image.data.is_empty() {
            errors.insert("image".to_string(), "Image file is required.".to_string());
        }
        if let Some(upload_date) = self.upload_date {
            if upload_date <= now {
                errors.insert(
                    "upload_date".to_string(),
                    "Upload date must be in the future.".to_string(),
                );
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(TuneValidationError { errors })
        }
    }
}

/// A tune as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tune {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: String,
    pub privacy_status: PrivacyStatus,
    pub embeddable: bool,
    pub license: License,
    pub upload_date: Option<DateTime<Utc>>,
    pub executed: bool,
    #[serde(default)]
    pub audio_name: Option<String>,
    #[serde(default)]
    pub image_name: Option<String>,
    #[serde(default)]
    pub date_created: Option<DateTime<Utc>>,
}

/// One page of the tune listing.
#[derive(Debug, Clone, Deserialize)]
pub struct TunePage {
    pub data: Vec<Tune>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

/// Optional listing filters; unset fields are omitted from the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TuneFilters {
    pub executed: Option<bool>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl TuneFilters {
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(executed) = self.executed {
            pairs.push(("executed", executed.to_string()));
        }
        if let Some(start) = self.start_date {
            pairs.push(("start_date", start.to_rfc3339()));
        }
        if let Some(end) = self.end_date {
            pairs.push(("end_date", end.to_rfc3339()));
        }
        pairs
    }
}

/// Field-keyed report of why an upload payload was rejected locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render_field_errors(.errors))]
pub struct TuneValidationError {
    pub errors: BTreeMap<String, String>,
}

impl TuneValidationError {
    fn single(field: &str, message: &str) -> Self {
        Self {
            errors: BTreeMap::from([(field.to_string(), message.to_string())]),
        }
    }
}

fn render_field_errors(errors: &BTreeMap<String, String>) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn blob(name: &str, mime: &str) -> MediaBlob {
        MediaBlob::from_bytes(name, mime, b"payload").unwrap()
    }

    fn valid_tune() -> NewTune {
        NewTune {
            title: "Morning Raga".to_string(),
            description: "Recorded at dawn".to_string(),
            tags: vec!["raga".to_string(), "sitar".to_string()],
            category: "10".to_string(),
            privacy_status: PrivacyStatus::Private,
            embeddable: false,
            license: License::Youtube,
            upload_date: None,
            audio: blob("raga.mp3", "audio/mpeg"),
            image: blob("cover.png", "image/png"),
        }
    }

    #[test]
    fn valid_instant_tune_passes() {
        assert!(valid_tune().validate(Utc::now()).is_ok());
    }

    #[test]
    fn blank_title_and_category_are_reported_per_field() {
        let mut tune = valid_tune();
        tune.title = "   ".to_string();
        tune.category = String::new();
        let err = tune.validate(Utc::now()).unwrap_err();
        assert_eq!(err.errors["title"], "Title is required.");
        assert_eq!(err.errors["category"], "Category is required.");
        assert_eq!(err.errors.len(), 2);
    }

    #[test]
    fn scheduled_tune_requires_future_upload_date() {
        let now = Utc::now();
        let mut tune = valid_tune();
        tune.upload_date = Some(now - Duration::minutes(5));
        let err = tune.validate(now).unwrap_err();
        assert_eq!(err.errors["upload_date"], "Upload date must be in the future.");

        tune.upload_date = Some(now + Duration::minutes(5));
        assert!(tune.validate(now).is_ok());
        assert!(tune.is_scheduled());
    }

    #[test]
    fn empty_media_is_rejected_at_packaging() {
        let err = MediaBlob::from_bytes("empty.mp3", "audio/mpeg", b"").unwrap_err();
        assert_eq!(err.errors["file"], "The file is empty.");
    }

    #[test]
    fn media_blob_base64_encodes_bytes() {
        let blob = MediaBlob::from_bytes("a.bin", "application/octet-stream", &[1, 2, 3]).unwrap();
        assert_eq!(blob.data, "AQID");
    }

    #[test]
    fn enums_serialize_to_backend_strings() {
        assert_eq!(
            serde_json::to_value(PrivacyStatus::Unlisted).unwrap(),
            serde_json::json!("unlisted"),
        );
        assert_eq!(
            serde_json::to_value(License::CreativeCommon).unwrap(),
            serde_json::json!("creativeCommon"),
        );
        assert_eq!(License::Youtube.to_string(), "youtube");
    }

    #[test]
    fn tune_page_decodes_backend_shape() {
        let page: TunePage = serde_json::from_value(serde_json::json!({
            "data": [{
                "id": 7,
                "title": "Morning Raga",
                "category": "10",
                "privacy_status": "private",
                "embeddable": true,
                "license": "youtube",
                "upload_date": "2026-09-01T06:00:00Z",
                "executed": false,
                "audio_name": "raga.mp3",
                "image_name": "cover.png"
            }],
            "current_page": 1,
            "total_pages": 3,
            "total_count": 21
        }))
        .unwrap();
        assert_eq!(page.data.len(), 1);
        assert_eq!(page.data[0].id, 7);
        assert!(!page.data[0].executed);
        assert_eq!(page.total_count, 21);
    }
}
