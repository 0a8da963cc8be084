use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Generates a string-backed status enum that keeps unrecognized values.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            /// Any value this client does not recognize.
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $text,)+
                    Self::Other(raw) => raw,
                }
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                match raw.as_str() {
                    $($text => Self::$variant,)+
                    _ => Self::Other(raw),
                }
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from(raw.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $($name::$variant => $text.to_owned(),)+
                    $name::Other(raw) => raw,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Outer job status as reported by the status endpoint.
    JobStatus {
        Queued => "queued",
        Starting => "starting",
        Publishing => "publishing",
        Completed => "completed",
        Failed => "failed",
    }
}

wire_enum! {
    /// Coarse per-platform progress.
    PlatformStatus {
        Queued => "queued",
        Publishing => "publishing",
        Completed => "completed",
        Failed => "failed",
    }
}

wire_enum! {
    /// Effective outcome carried inside a completed job's result.
    ResultStatus {
        Success => "success",
        Partial => "partial",
        Failed => "failed",
    }
}

impl JobStatus {
    /// Terminal states are exactly `completed` and `failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One status payload returned by a single poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    /// A platform may be listed before it has a status.
    #[serde(default)]
    pub platforms: Option<BTreeMap<String, Option<PlatformStatus>>>,
    #[serde(default)]
    pub result: Option<JobResult>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl JobSnapshot {
    pub fn new(status: JobStatus) -> Self {
        Self {
            job_id: None,
            user_id: None,
            status,
            progress: None,
            message: None,
            platforms: None,
            result: None,
            error: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Decodes a raw JSON body into a snapshot.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Progress clamped to 0..=100; absent means 0.
    pub fn progress_percent(&self) -> u8 {
        self.progress.unwrap_or(0).clamp(0, 100) as u8
    }

    pub fn platforms(&self) -> impl Iterator<Item = (&String, Option<&PlatformStatus>)> {
        self.platforms
            .iter()
            .flat_map(|map| map.iter())
            .map(|(name, status)| (name, status.as_ref()))
    }
}

/// Final outcome of a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobResult {
    #[serde(default)]
    pub status: Option<ResultStatus>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub failed_platforms: Option<Vec<String>>,
    #[serde(default)]
    pub results: Option<BTreeMap<String, PlatformResult>>,
}

/// Per-platform final outcome. Only `warning` is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlatformResult {
    #[serde(default)]
    pub warning: Option<String>,
    #[serde(flatten)]
    pub details: BTreeMap<String, serde_json::Value>,
}
