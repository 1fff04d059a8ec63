//! Wire types for the ingestion service.

use serde::{Deserialize, Serialize};

use crate::replay::UploadStatus;

/// Body of the duplicate-check response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateCheckResponse {
    /// Fingerprints the service already has.
    #[serde(default)]
    pub exists: Vec<String>,
}

/// Body of the upload response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, rename = "replayID")]
    pub replay_id: i64,
    #[serde(default)]
    pub fingerprint: Option<String>,
}

impl UploadResponse {
    /// The status the service assigned. Missing, unknown or non-final values
    /// are upload errors.
    pub fn upload_status(&self) -> UploadStatus {
        match self.status.as_deref().and_then(|s| s.parse().ok()) {
            Some(UploadStatus::Pending) | Some(UploadStatus::InProgress) | None => {
                UploadStatus::UploadError
            }
            Some(status) => status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_response_status() {
        let resp: UploadResponse =
            serde_json::from_str(r#"{"status": "success", "replayID": 123, "fingerprint": "x"}"#)
                .unwrap();
        assert_eq!(resp.upload_status(), UploadStatus::Success);
        assert_eq!(resp.replay_id, 123);

        let resp: UploadResponse = serde_json::from_str(r#"{"status": "Duplicate"}"#).unwrap();
        assert_eq!(resp.upload_status(), UploadStatus::Duplicate);
        assert_eq!(resp.replay_id, 0);
    }

    #[test]
    fn test_unknown_or_missing_status_is_error() {
        let resp: UploadResponse = serde_json::from_str(r#"{"status": "Uploaded"}"#).unwrap();
        assert_eq!(resp.upload_status(), UploadStatus::UploadError);

        let resp: UploadResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.upload_status(), UploadStatus::UploadError);
    }

    #[test]
    fn test_non_final_status_is_error() {
        for raw in ["InProgress", "pending", "PENDING"] {
            let resp: UploadResponse =
                serde_json::from_str(&format!(r#"{{"status": "{}", "replayID": 1}}"#, raw))
                    .unwrap();
            assert_eq!(resp.upload_status(), UploadStatus::UploadError, "{}", raw);
        }

        let resp: UploadResponse =
            serde_json::from_str(r#"{"status": "CustomGame", "replayID": 1}"#).unwrap();
        assert_eq!(resp.upload_status(), UploadStatus::CustomGame);
    }

    #[test]
    fn test_duplicate_check_response() {
        let resp: DuplicateCheckResponse =
            serde_json::from_str(r#"{"exists": ["a", "b"]}"#).unwrap();
        assert_eq!(resp.exists, vec!["a", "b"]);
    }
}
