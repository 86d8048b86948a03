use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubscriptionModel {
    pub id: i32,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl From<SubscriptionEntity> for SubscriptionModel {
    fn from(value: SubscriptionEntity) -> Self {
        Self {
            id: value.id,
            service_name: value.service_name,
            price: value.price,
            user_id: value.user_id,
            start_date: value.start_date,
            end_date: value.end_date,
        }
    }
}

/// Missing fields decode to empty values so validation can name them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InsertSubscriptionModel {
    pub service_name: String,
    pub price: i32,
    pub user_id: String,
    pub start_date: String,
}

/// Partial update. `None` keeps the stored value; `Some("")` is rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditSubscriptionModel {
    pub service_name: Option<String>,
    pub price: Option<i32>,
    pub user_id: Option<String>,
    pub start_date: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListSubscriptionsFilter {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListSubscriptionsModel {
    pub subscriptions: Vec<SubscriptionModel>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CalculateCostModel {
    pub user_id: String,
    pub service_name: String,
    pub start_period: String,
    pub end_period: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TotalCostModel {
    pub total_cost: i64,
    pub user_id: String,
    pub service_name: String,
    pub start_period: String,
    pub end_period: String,
}
