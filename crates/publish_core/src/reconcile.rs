//! Derives display state from a raw status snapshot.
//!
//! The outer `status` says whether the job is still running; once it is
//! `completed`, the nested `result.status` carries the finer outcome. Every
//! function here is deterministic over the snapshot it is given.

use crate::{
    JobResult, JobSnapshot, JobStatus, PlatformStatus, PlatformWarning, ResultStatus, StatusIcon,
    Tone,
};

/// Platform whose result may carry a slow-processing warning.
pub const WARNING_PLATFORM: &str = "instagram";

/// Shown while publishing when the message mentions heavy media processing.
pub const LONG_RUNNING_NOTE: &str =
    "Video processing on Instagram can take 1-2 minutes. Please be patient!";

const LONG_RUNNING_MARKER: &str = "reel";
const SUCCESS_SUMMARY: &str = "Published successfully to all platforms!";
const FAILURE_SUMMARY: &str = "Publishing failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectiveStatus {
    InProgress,
    /// Outer `completed` with no finer outcome available.
    Completed,
    Success,
    Partial,
    Failed,
}

pub fn effective_status(snapshot: Option<&JobSnapshot>) -> EffectiveStatus {
    let Some(snapshot) = snapshot else {
        return EffectiveStatus::InProgress;
    };
    match &snapshot.status {
        JobStatus::Failed => EffectiveStatus::Failed,
        JobStatus::Completed => {
            match snapshot.result.as_ref().and_then(|result| result.status.as_ref()) {
                None => EffectiveStatus::Completed,
                Some(ResultStatus::Success) => EffectiveStatus::Success,
                Some(ResultStatus::Partial) => EffectiveStatus::Partial,
                Some(ResultStatus::Failed) => EffectiveStatus::Failed,
                Some(ResultStatus::Other(_)) => EffectiveStatus::InProgress,
            }
        }
        _ => EffectiveStatus::InProgress,
    }
}

pub fn tone(status: EffectiveStatus) -> Tone {
    match status {
        EffectiveStatus::Failed => Tone::Red,
        EffectiveStatus::Partial => Tone::Yellow,
        EffectiveStatus::Completed | EffectiveStatus::Success => Tone::Green,
        EffectiveStatus::InProgress => Tone::Blue,
    }
}

pub fn status_icon(status: EffectiveStatus) -> StatusIcon {
    match status {
        EffectiveStatus::Failed => StatusIcon::Error,
        EffectiveStatus::Partial => StatusIcon::Warning,
        EffectiveStatus::Completed | EffectiveStatus::Success => StatusIcon::Success,
        EffectiveStatus::InProgress => StatusIcon::Spinner,
    }
}

pub fn heading(status: EffectiveStatus) -> &'static str {
    match status {
        EffectiveStatus::Failed => "Publishing Failed",
        EffectiveStatus::Partial => "Publishing completed with issues",
        EffectiveStatus::Completed | EffectiveStatus::Success => "Published Successfully!",
        EffectiveStatus::InProgress => "Publishing...",
    }
}

pub fn platform_badge(status: &PlatformStatus) -> Option<StatusIcon> {
    match status {
        PlatformStatus::Completed => Some(StatusIcon::Success),
        PlatformStatus::Failed => Some(StatusIcon::Error),
        PlatformStatus::Publishing => Some(StatusIcon::Spinner),
        PlatformStatus::Queued | PlatformStatus::Other(_) => None,
    }
}

pub fn result_summary(result: &JobResult) -> String {
    if let Some(message) = result.message.as_deref() {
        return message.to_owned();
    }
    match result.status {
        Some(ResultStatus::Success) => SUCCESS_SUMMARY.to_owned(),
        Some(ResultStatus::Partial) => {
            let failed = result
                .failed_platforms
                .as_deref()
                .filter(|names| !names.is_empty())
                .map(|names| names.join(", "))
                .unwrap_or_else(|| "Some platforms".to_owned());
            format!("Published to some platforms. {failed} failed.")
        }
        _ => FAILURE_SUMMARY.to_owned(),
    }
}

pub fn platform_warning(result: &JobResult) -> Option<PlatformWarning> {
    let warning = result
        .results
        .as_ref()?
        .get(WARNING_PLATFORM)?
        .warning
        .as_deref()
        .filter(|text| !text.is_empty())?;
    Some(PlatformWarning {
        platform: WARNING_PLATFORM.to_owned(),
        text: warning.to_owned(),
    })
}

pub fn long_running_hint(snapshot: &JobSnapshot) -> Option<&'static str> {
    let processing_media = snapshot
        .message
        .as_deref()
        .is_some_and(|message| message.contains(LONG_RUNNING_MARKER));
    (snapshot.status == JobStatus::Publishing && processing_media).then_some(LONG_RUNNING_NOTE)
}
