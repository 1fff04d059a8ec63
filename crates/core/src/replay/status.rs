//! Upload status state machine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Processing status of a replay.
///
/// `Pending -> InProgress -> {Success | Duplicate | UploadError | AiDetected |
/// CustomGame | RegionRestricted | Incomplete | TooOld}`.
///
/// Only `Pending` and `UploadError` may re-enter the processing queue. Every
/// other terminal status is sticky.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum UploadStatus {
    Pending,
    InProgress,
    Success,
    UploadError,
    Duplicate,
    AiDetected,
    CustomGame,
    /// Recorded on a region the remote service does not accept.
    #[serde(alias = "PtrRegion")]
    RegionRestricted,
    Incomplete,
    TooOld,
}

impl UploadStatus {
    /// All statuses, in declaration order.
    pub const ALL: [UploadStatus; 10] = [
        UploadStatus::Pending,
        UploadStatus::InProgress,
        UploadStatus::Success,
        UploadStatus::UploadError,
        UploadStatus::Duplicate,
        UploadStatus::AiDetected,
        UploadStatus::CustomGame,
        UploadStatus::RegionRestricted,
        UploadStatus::Incomplete,
        UploadStatus::TooOld,
    ];

    /// Whether an item in this status may be pushed onto the processing queue.
    pub fn is_retryable(self) -> bool {
        matches!(self, UploadStatus::Pending | UploadStatus::UploadError)
    }

    /// Whether this status is a final classification the pipeline never overwrites.
    pub fn is_sticky(self) -> bool {
        !self.is_retryable() && self != UploadStatus::InProgress
    }

    /// Whether an item in this status belongs in the persisted history.
    ///
    /// Pending, in-flight and failed uploads are left out so that they are
    /// rediscovered as new files on the next start.
    pub fn is_persisted(self) -> bool {
        !matches!(
            self,
            UploadStatus::Pending | UploadStatus::InProgress | UploadStatus::UploadError
        )
    }

    /// Whether analysis rejected the file before any network traffic.
    pub fn is_disqualification(self) -> bool {
        matches!(
            self,
            UploadStatus::AiDetected
                | UploadStatus::CustomGame
                | UploadStatus::RegionRestricted
                | UploadStatus::Incomplete
                | UploadStatus::TooOld
        )
    }

    /// Stable name, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            UploadStatus::Pending => "Pending",
            UploadStatus::InProgress => "InProgress",
            UploadStatus::Success => "Success",
            UploadStatus::UploadError => "UploadError",
            UploadStatus::Duplicate => "Duplicate",
            UploadStatus::AiDetected => "AiDetected",
            UploadStatus::CustomGame => "CustomGame",
            UploadStatus::RegionRestricted => "RegionRestricted",
            UploadStatus::Incomplete => "Incomplete",
            UploadStatus::TooOld => "TooOld",
        }
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = String;

    /// Case-insensitive parse of a status name as reported by the remote service.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("PtrRegion") {
            return Ok(UploadStatus::RegionRestricted);
        }
        UploadStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown upload status: {}", s))
    }
}

/// Number of items in each status.
///
/// Every status is always present, zero-filled, so consumers can render a
/// fixed set of counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusCounts(BTreeMap<UploadStatus, usize>);

impl StatusCounts {
    /// Count statuses in one pass.
    pub fn from_statuses<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = UploadStatus>,
    {
        let mut counts: BTreeMap<UploadStatus, usize> =
            UploadStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for status in statuses {
            *counts.entry(status).or_default() += 1;
        }
        Self(counts)
    }

    pub fn get(&self, status: UploadStatus) -> usize {
        self.0.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (UploadStatus, usize)> + '_ {
        self.0.iter().map(|(s, c)| (*s, *c))
    }
}

impl Default for StatusCounts {
    fn default() -> Self {
        Self::from_statuses(std::iter::empty())
    }
}
