//! Document records and the summaries shown in document lists

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Title used when a record has none
pub const UNTITLED: &str = "Untitled Document";

/// Kind of document a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    Contract,
    Proposal,
    Invoice,
    Report,
    Letter,
    Memo,
    #[default]
    #[serde(other)]
    Other,
}

impl DocumentType {
    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Contract => "Contract",
            Self::Proposal => "Proposal",
            Self::Invoice => "Invoice",
            Self::Report => "Report",
            Self::Letter => "Letter",
            Self::Memo => "Memo",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why a record could not be turned into a summary
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),
}

/// Wire shape of a document record. Only the fields the list needs are read;
/// anything else in the file is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecord {
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    title: Option<String>,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    doc_type: Option<DocumentType>,
    updated_at: Option<String>,
}

/// Decode an optional field, treating a value of the wrong shape as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Minimal projection of a document record used for list display
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub id: String,
    pub title: String,
    pub doc_type: DocumentType,
    pub updated_at: DateTime<Utc>,
}

impl DocumentSummary {
    /// Decode a summary from the JSON content of a record file
    pub fn from_json(content: &str) -> Result<Self, DecodeError> {
        let raw: RawRecord = serde_json::from_str(content)?;

        let id = raw
            .id
            .filter(|id| !id.is_empty())
            .ok_or(DecodeError::MissingField("id"))?;
        let updated_at = raw
            .updated_at
            .ok_or(DecodeError::MissingField("updatedAt"))?;
        let updated_at = parse_timestamp(&updated_at)?;

        Ok(Self {
            id,
            title: raw
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| UNTITLED.to_string()),
            doc_type: raw.doc_type.unwrap_or_default(),
            updated_at,
        })
    }

    /// Date of the last update in the local time zone, for display
    pub fn updated_date(&self) -> String {
        self.updated_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d")
            .to_string()
    }
}

/// Parse the `updatedAt` value of a record.
///
/// Accepts RFC 3339 timestamps, date-times without an offset (read as UTC)
/// and bare dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, DecodeError> {
    let value = value.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }

    Err(DecodeError::InvalidTimestamp(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_decode_full_record() {
        let content = r#"{
            "id": "doc-1",
            "title": "Service Agreement",
            "type": "contract",
            "updatedAt": "2024-03-01T10:30:00.000Z",
            "content": "ignored"
        }"#;
        let summary = DocumentSummary::from_json(content).unwrap();
        assert_eq!(summary.id, "doc-1");
        assert_eq!(summary.title, "Service Agreement");
        assert_eq!(summary.doc_type, DocumentType::Contract);
        assert_eq!(
            summary.updated_at,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_missing_title_gets_default() {
        let summary =
            DocumentSummary::from_json(r#"{"id":"a","type":"memo","updatedAt":"2024-01-01"}"#)
                .unwrap();
        assert_eq!(summary.title, UNTITLED);

        let summary = DocumentSummary::from_json(
            r#"{"id":"a","title":"","type":"memo","updatedAt":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(summary.title, UNTITLED);
    }

    #[test]
    fn test_missing_updated_at_is_rejected() {
        let err = DocumentSummary::from_json(r#"{"id":"a","title":"x"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("updatedAt")));
    }

    #[test]
    fn test_missing_id_is_rejected() {
        let err = DocumentSummary::from_json(r#"{"updatedAt":"2024-01-01"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("id")));

        let err =
            DocumentSummary::from_json(r#"{"id":"","updatedAt":"2024-01-01"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::MissingField("id")));
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = DocumentSummary::from_json("{ not json").unwrap_err();
        assert!(matches!(err, DecodeError::Malformed(_)));
    }

    #[test]
    fn test_unknown_or_missing_type_is_other() {
        let summary = DocumentSummary::from_json(
            r#"{"id":"a","type":"spreadsheet","updatedAt":"2024-01-01"}"#,
        )
        .unwrap();
        assert_eq!(summary.doc_type, DocumentType::Other);

        let summary =
            DocumentSummary::from_json(r#"{"id":"a","updatedAt":"2024-01-01"}"#).unwrap();
        assert_eq!(summary.doc_type, DocumentType::Other);
    }

    #[test]
    fn test_wrongly_shaped_type_is_other() {
        for doc_type in ["3", "{}", r#"{"k":1}"#, "null", "[\"memo\"]"] {
            let content =
                format!(r#"{{"id":"a","type":{doc_type},"updatedAt":"2024-01-01"}}"#);
            let summary = DocumentSummary::from_json(&content).unwrap();
            assert_eq!(summary.doc_type, DocumentType::Other, "type {doc_type}");
        }
    }

    #[test]
    fn test_wrongly_shaped_title_gets_default() {
        let summary =
            DocumentSummary::from_json(r#"{"id":"a","title":7,"updatedAt":"2024-01-01"}"#)
                .unwrap();
        assert_eq!(summary.title, UNTITLED);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let midnight = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-02-01").unwrap(), midnight);
        assert_eq!(parse_timestamp("2024-02-01T00:00:00").unwrap(), midnight);
        assert_eq!(parse_timestamp("2024-02-01T02:00:00+02:00").unwrap(), midnight);
        assert!(matches!(
            parse_timestamp("last tuesday"),
            Err(DecodeError::InvalidTimestamp(_))
        ));
    }
}
