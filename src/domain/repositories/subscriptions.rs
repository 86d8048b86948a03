use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use mockall::automock;
use uuid::Uuid;

use crate::domain::entities::subscriptions::{
    EditSubscriptionEntity, InsertSubscriptionEntity, SubscriptionEntity,
};

/// Persistence contract for subscriptions.
///
/// Missing rows come back as `None` or a zero row count so callers can tell
/// them apart from storage failures, which are always `Err`.
#[automock]
#[async_trait]
pub trait SubscriptionRepository {
    async fn create(&self, insert_subscription_entity: InsertSubscriptionEntity)
    -> Result<SubscriptionEntity>;

    async fn find_by_id(&self, subscription_id: i32) -> Result<Option<SubscriptionEntity>>;

    /// Applies only the fields set in the changeset. An empty changeset is a no-op.
    async fn update(
        &self,
        subscription_id: i32,
        edit_subscription_entity: EditSubscriptionEntity,
    ) -> Result<Option<SubscriptionEntity>>;

    /// Returns the number of deleted rows.
    async fn delete(&self, subscription_id: i32) -> Result<usize>;

    /// Newest `start_date` first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<SubscriptionEntity>>;

    async fn count(&self) -> Result<i64>;

    /// Sums full prices of subscriptions overlapping `[period_start, period_end]`.
    async fn calculate_total_cost(
        &self,
        user_id: Uuid,
        service_name: String,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<i64>;
}
