use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub website: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub api_key: String,
    /// Id of the plan the active subscription points at.
    pub account_type: String,
    pub is_active: bool,
    pub profile: Profile,
    pub created_at: bson::DateTime,
    pub last_login: Option<bson::DateTime>,
}

impl User {
    pub fn new(username: String, email: String, password_hash: String, profile: Profile) -> Self {
        Self {
            id: None,
            username,
            email,
            password_hash,
            api_key: uuid::Uuid::new_v4().to_string(),
            account_type: "free".to_string(),
            is_active: true,
            profile,
            created_at: bson::DateTime::now(),
            last_login: None,
        }
    }

    pub fn id_hex(&self) -> String {
        self.id.map(|id| id.to_hex()).unwrap_or_default()
    }

    pub fn created_at_rfc3339(&self) -> String {
        self.created_at.try_to_rfc3339_string().unwrap_or_default()
    }

    pub fn last_login_rfc3339(&self) -> Option<String> {
        self.last_login.and_then(|t| t.try_to_rfc3339_string().ok())
    }
}
