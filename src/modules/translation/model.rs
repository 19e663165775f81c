use bson::oid::ObjectId;
use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationRecord {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub source_code: String,
    pub translated_code: String,
    pub source_language: String,
    pub target_language: String,
    pub feedback: Option<String>,
    pub created_at: bson::DateTime,
}

impl TranslationRecord {
    pub fn new(
        user_id: ObjectId,
        source_code: String,
        translated_code: String,
        source_language: String,
        target_language: String,
        feedback: Option<String>,
    ) -> Self {
        Self {
            id: None,
            user_id,
            source_code,
            translated_code,
            source_language,
            target_language,
            feedback,
            created_at: bson::DateTime::now(),
        }
    }

    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.try_to_rfc3339_string().unwrap_or_default()
    }
}

/// Start of the billing period containing `now`: midnight UTC on the 1st.
pub fn period_start(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub limit: i64,
    pub used: i64,
    pub remaining: i64,
}

impl Usage {
    pub fn new(limit: i64, used: i64) -> Self {
        Self {
            limit,
            used,
            remaining: (limit - used).max(0),
        }
    }

    pub fn exhausted(&self) -> bool {
        self.used >= self.limit
    }
}
