use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    DataAnomaly,
    SyncDelay,
    CalculationError,
    MissingData,
    SchemaChange,
    ToolError,
    Observation,
}

impl FeedbackCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackCategory::DataAnomaly => "data_anomaly",
            FeedbackCategory::SyncDelay => "sync_delay",
            FeedbackCategory::CalculationError => "calculation_error",
            FeedbackCategory::MissingData => "missing_data",
            FeedbackCategory::SchemaChange => "schema_change",
            FeedbackCategory::ToolError => "tool_error",
            FeedbackCategory::Observation => "observation",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "data_anomaly" => Some(Self::DataAnomaly),
            "sync_delay" => Some(Self::SyncDelay),
            "calculation_error" => Some(Self::CalculationError),
            "missing_data" => Some(Self::MissingData),
            "schema_change" => Some(Self::SchemaChange),
            "tool_error" => Some(Self::ToolError),
            "observation" => Some(Self::Observation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackStatus {
    New,
    Acknowledged,
    Resolved,
    Dismissed,
}

impl FeedbackStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::New => "new",
            FeedbackStatus::Acknowledged => "acknowledged",
            FeedbackStatus::Resolved => "resolved",
            FeedbackStatus::Dismissed => "dismissed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "acknowledged" => Some(Self::Acknowledged),
            "resolved" => Some(Self::Resolved),
            "dismissed" => Some(Self::Dismissed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Feedback {
    pub id: String,
    pub category: String,
    pub severity: String,
    pub status: String,
    pub description: String,
    pub ticker: Option<String>,
    pub portfolio_name: Option<String>,
    pub session_id: Option<String>,
    pub client_type: Option<String>,
    pub tool_name: Option<String>,
    pub observed_value: Option<String>,
    pub expected_value: Option<String>,
    pub resolution_notes: Option<String>,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// `user_id`/`user_name`/`user_email` come from the auth context only; any
/// such fields present in the POST body are not part of this type and are
/// silently dropped at deserialization since we don't set
/// `deny_unknown_fields`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateFeedback {
    pub category: String,
    #[serde(default)]
    pub severity: Option<String>,
    pub description: String,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub portfolio_name: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub client_type: Option<String>,
    #[serde(default)]
    pub tool_name: Option<String>,
    #[serde(default)]
    pub observed_value: Option<String>,
    #[serde(default)]
    pub expected_value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateFeedback {
    pub status: String,
    #[serde(default)]
    pub resolution_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateFeedback {
    pub ids: Vec<String>,
    pub status: String,
    #[serde(default)]
    pub resolution_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackListQuery {
    pub category: Option<String>,
    pub severity: Option<String>,
    pub ticker: Option<String>,
    pub session_id: Option<String>,
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub per_page: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackListResponse {
    pub items: Vec<Feedback>,
    pub total: i64,
    pub page: usize,
    pub per_page: usize,
    pub pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackSummary {
    pub total: i64,
    pub by_status: std::collections::HashMap<String, i64>,
    pub by_severity: std::collections::HashMap<String, i64>,
    pub by_category: std::collections::HashMap<String, i64>,
    pub oldest_unresolved: Option<chrono::DateTime<chrono::Utc>>,
}
