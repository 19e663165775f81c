use bson::oid::ObjectId;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PLAN: &str = "free";

/// Length of a subscription term.
const TERM_DAYS: i64 = 365;

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionPlan {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub price_monthly: f64,
    pub price_yearly: f64,
    /// Translations allowed per calendar month.
    pub translation_limit: i64,
    pub history_retention_days: i64,
    pub features: &'static [&'static str],
}

pub static PLANS: [SubscriptionPlan; 3] = [
    SubscriptionPlan {
        id: "free",
        name: "Free",
        description: "Basic translation features with limited usage",
        price_monthly: 0.0,
        price_yearly: 0.0,
        translation_limit: 100,
        history_retention_days: 30,
        features: &[
            "Basic code translation",
            "All programming languages",
            "Standard response time",
        ],
    },
    SubscriptionPlan {
        id: "professional",
        name: "Professional",
        description: "Advanced features for professional developers",
        price_monthly: 9.99,
        price_yearly: 99.99,
        translation_limit: 1000,
        history_retention_days: 90,
        features: &[
            "Advanced code translation",
            "All programming languages",
            "Priority response time",
            "Translation history",
            "Code optimization suggestions",
        ],
    },
    SubscriptionPlan {
        id: "enterprise",
        name: "Enterprise",
        description: "Full-featured solution for teams and businesses",
        price_monthly: 29.99,
        price_yearly: 299.99,
        translation_limit: 10000,
        history_retention_days: 365,
        features: &[
            "Premium code translation",
            "All programming languages",
            "Fastest response time",
            "Extended translation history",
            "Advanced code optimization",
            "Team collaboration",
            "Custom integrations",
            "Dedicated support",
        ],
    },
];

pub fn find_plan(id: &str) -> Option<&'static SubscriptionPlan> {
    PLANS.iter().find(|p| p.id == id)
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Subscription {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub user_id: ObjectId,
    pub plan_id: String,
    pub start_date: bson::DateTime,
    pub end_date: bson::DateTime,
    pub is_active: bool,
    pub payment_method: Option<String>,
}

impl Subscription {
    pub fn new(user_id: ObjectId, plan_id: &str, payment_method: Option<String>) -> Self {
        let start = Utc::now();
        Self {
            id: None,
            user_id,
            plan_id: plan_id.to_string(),
            start_date: bson::DateTime::from_chrono(start),
            end_date: bson::DateTime::from_chrono(start + Duration::days(TERM_DAYS)),
            is_active: true,
            payment_method,
        }
    }

    pub fn plan(&self) -> &'static SubscriptionPlan {
        find_plan(&self.plan_id).unwrap_or(&PLANS[0])
    }
}
