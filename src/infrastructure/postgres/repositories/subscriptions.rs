use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use diesel::{RunQueryDsl, dsl::sum, insert_into, prelude::*};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::subscriptions::{
            EditSubscriptionEntity, InsertSubscriptionEntity, SubscriptionEntity,
        },
        repositories::subscriptions::SubscriptionRepository,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::subscriptions},
};

pub struct SubscriptionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SubscriptionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl SubscriptionRepository for SubscriptionPostgres {
    async fn create(
        &self,
        insert_subscription_entity: InsertSubscriptionEntity,
    ) -> Result<SubscriptionEntity> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("create subscription: failed to acquire connection")?;

        let result = insert_into(subscriptions::table)
            .values(&insert_subscription_entity)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)
            .context("create subscription: insert failed")?;

        Ok(result)
    }

    async fn find_by_id(&self, subscription_id: i32) -> Result<Option<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("get subscription: failed to acquire connection")?;

        let result = subscriptions::table
            .find(subscription_id)
            .select(SubscriptionEntity::as_select())
            .first::<SubscriptionEntity>(&mut conn)
            .optional()
            .with_context(|| format!("get subscription {subscription_id}: select failed"))?;

        Ok(result)
    }

    async fn update(
        &self,
        subscription_id: i32,
        edit_subscription_entity: EditSubscriptionEntity,
    ) -> Result<Option<SubscriptionEntity>> {
        // Diesel refuses an UPDATE with nothing to SET.
        if edit_subscription_entity.is_empty() {
            return self.find_by_id(subscription_id).await;
        }

        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("update subscription: failed to acquire connection")?;

        let result = diesel::update(subscriptions::table.find(subscription_id))
            .set(&edit_subscription_entity)
            .returning(SubscriptionEntity::as_returning())
            .get_result::<SubscriptionEntity>(&mut conn)
            .optional()
            .with_context(|| format!("update subscription {subscription_id}: update failed"))?;

        Ok(result)
    }

    async fn delete(&self, subscription_id: i32) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("delete subscription: failed to acquire connection")?;

        let deleted = diesel::delete(subscriptions::table.find(subscription_id))
            .execute(&mut conn)
            .with_context(|| format!("delete subscription {subscription_id}: delete failed"))?;

        Ok(deleted)
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<SubscriptionEntity>> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("list subscriptions: failed to acquire connection")?;

        let results = subscriptions::table
            .select(SubscriptionEntity::as_select())
            .order((subscriptions::start_date.desc(), subscriptions::id.desc()))
            .limit(limit)
            .offset(offset)
            .load::<SubscriptionEntity>(&mut conn)
            .context("list subscriptions: select failed")?;

        Ok(results)
    }

    async fn count(&self) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("count subscriptions: failed to acquire connection")?;

        let total = subscriptions::table
            .count()
            .get_result::<i64>(&mut conn)
            .context("count subscriptions: select failed")?;

        Ok(total)
    }

    async fn calculate_total_cost(
        &self,
        user_id: Uuid,
        service_name: String,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<i64> {
        let mut conn = Arc::clone(&self.db_pool)
            .get()
            .context("calculate total cost: failed to acquire connection")?;

        let total = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::service_name.eq(service_name))
            .filter(subscriptions::start_date.le(period_end))
            .filter(
                subscriptions::end_date
                    .is_null()
                    .or(subscriptions::end_date.ge(period_start)),
            )
            .select(sum(subscriptions::price))
            .first::<Option<i64>>(&mut conn)
            .context("calculate total cost: aggregate failed")?;

        Ok(total.unwrap_or(0))
    }
}
