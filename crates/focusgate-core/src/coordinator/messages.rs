//! Request/response contract between UI surfaces and the coordinator.
//!
//! Serialized action names match the wire protocol of the message bus
//! (`START_FOCUS`, `EMERGENCY_UNLOCK`, ...). Every reply is the same
//! envelope: `{success, data?, error?}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::settings::SettingsPatch;
use crate::timer::SessionMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    GetTimerState,
    StartFocus {
        mode: SessionMode,
        #[serde(default)]
        duration_min: Option<u32>,
    },
    StopFocus,
    PauseFocus,
    ResumeFocus,
    StartBreak,
    SkipBreak,
    GetSettings,
    UpdateSettings {
        patch: SettingsPatch,
    },
    AddToBlocklist {
        pattern: String,
        #[serde(default)]
        is_regex: bool,
    },
    RemoveFromBlocklist {
        id: Uuid,
    },
    AddToWhitelist {
        pattern: String,
        #[serde(default)]
        is_regex: bool,
    },
    RemoveFromWhitelist {
        id: Uuid,
    },
    GetStats,
    VerifyPassword {
        password: String,
    },
    EmergencyUnlock {
        #[serde(default)]
        password: Option<String>,
    },
    /// Navigation check: drives the blocking engine and, on a block,
    /// the blocked-site counters.
    CheckNavigation {
        url: String,
    },
    GetQuote,
    GetTier,
    CheckFeatureGate {
        feature_id: String,
    },
    RecordFeatureUsage {
        feature_id: String,
    },
}

/// Uniform reply envelope. Transport failures surface as
/// `{success: false, error}` so UI surfaces can degrade gracefully.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => Self {
                success: true,
                data: Some(value),
                error: None,
            },
            Err(e) => Self::err(format!("serialization failed: {e}")),
        }
    }

    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}
