use std::sync::Arc;

use axum::http::StatusCode;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::domain::{
    entities::subscriptions::{EditSubscriptionEntity, InsertSubscriptionEntity},
    repositories::subscriptions::SubscriptionRepository,
    value_objects::{
        subscriptions::{
            CalculateCostModel, EditSubscriptionModel, InsertSubscriptionModel,
            ListSubscriptionsFilter, ListSubscriptionsModel, SubscriptionModel, TotalCostModel,
        },
        validation::{self, InvalidInput},
    },
};

pub const DEFAULT_LIST_LIMIT: i64 = 10;
pub const MAX_LIST_LIMIT: i64 = 100;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInput),
    #[error("subscription {id} not found")]
    NotFound { id: i32 },
    #[error("storage failure during {operation}")]
    Storage {
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl SubscriptionError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SubscriptionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SubscriptionError::NotFound { .. } => StatusCode::NOT_FOUND,
            SubscriptionError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn storage(operation: &'static str, source: anyhow::Error) -> Self {
        SubscriptionError::Storage { operation, source }
    }
}

pub type UseCaseResult<T> = std::result::Result<T, SubscriptionError>;

/// Applies the list paging policy: limit in `[1, 100]` defaulting to 10, offset never negative.
pub fn clamp_pagination(limit: Option<i64>, offset: Option<i64>) -> (i64, i64) {
    let limit = match limit {
        Some(value) if value > 0 => value.min(MAX_LIST_LIMIT),
        _ => DEFAULT_LIST_LIMIT,
    };
    let offset = offset.unwrap_or(0).max(0);
    (limit, offset)
}

pub struct SubscriptionUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    subscription_repository: Arc<S>,
}

impl<S> SubscriptionUseCase<S>
where
    S: SubscriptionRepository + Send + Sync + 'static,
{
    pub fn new(subscription_repository: Arc<S>) -> Self {
        Self {
            subscription_repository,
        }
    }

    pub async fn create_subscription(
        &self,
        insert_subscription_model: InsertSubscriptionModel,
    ) -> UseCaseResult<SubscriptionModel> {
        info!(
            service_name = %insert_subscription_model.service_name,
            user_id = %insert_subscription_model.user_id,
            "subscriptions: create requested"
        );

        let validated = validation::validate_create(&insert_subscription_model).map_err(|err| {
            warn!(
                field = err.field,
                reason = %err.reason,
                "subscriptions: create rejected"
            );
            err
        })?;

        let end = validated
            .start
            .add_one_month()
            .map_err(|err| InvalidInput::new("start_date", err.to_string()))?;

        let insert_subscription_entity = InsertSubscriptionEntity {
            service_name: validated.service_name,
            price: validated.price,
            user_id: validated.user_id,
            start_date: validated.start.first_day(),
            end_date: Some(end.first_day()),
        };

        let created = self
            .subscription_repository
            .create(insert_subscription_entity)
            .await
            .map_err(|err| {
                error!(
                    user_id = %validated.user_id,
                    db_error = ?err,
                    "subscriptions: failed to create subscription"
                );
                SubscriptionError::storage("create subscription", err)
            })?;

        info!(
            subscription_id = created.id,
            user_id = %created.user_id,
            "subscriptions: subscription created"
        );
        Ok(SubscriptionModel::from(created))
    }

    pub async fn get_subscription(&self, raw_id: &str) -> UseCaseResult<SubscriptionModel> {
        let subscription_id = validation::validate_subscription_id(raw_id)?;
        debug!(subscription_id, "subscriptions: loading subscription");

        let subscription = self
            .subscription_repository
            .find_by_id(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to load subscription"
                );
                SubscriptionError::storage("get subscription", err)
            })?
            .ok_or_else(|| {
                warn!(subscription_id, "subscriptions: subscription not found");
                SubscriptionError::NotFound {
                    id: subscription_id,
                }
            })?;

        Ok(SubscriptionModel::from(subscription))
    }

    /// Merges the present fields into the stored record. A new `start_date`
    /// also moves `end_date` to one month after it.
    pub async fn update_subscription(
        &self,
        raw_id: &str,
        edit_subscription_model: EditSubscriptionModel,
    ) -> UseCaseResult<()> {
        let subscription_id = validation::validate_subscription_id(raw_id)?;
        info!(subscription_id, "subscriptions: update requested");

        let edit_subscription_entity =
            Self::build_changeset(&edit_subscription_model).map_err(|err| {
                warn!(
                    subscription_id,
                    field = err.field,
                    reason = %err.reason,
                    "subscriptions: update rejected"
                );
                err
            })?;

        debug!(
            subscription_id,
            changeset = ?edit_subscription_entity,
            "subscriptions: applying changeset"
        );

        let updated = self
            .subscription_repository
            .update(subscription_id, edit_subscription_entity)
            .await
            .map_err(|err| {
                error!(
                    subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to update subscription"
                );
                SubscriptionError::storage("update subscription", err)
            })?;

        match updated {
            Some(subscription) => {
                info!(
                    subscription_id,
                    end_date = ?subscription.end_date,
                    "subscriptions: subscription updated"
                );
                Ok(())
            }
            None => {
                warn!(subscription_id, "subscriptions: update target not found");
                Err(SubscriptionError::NotFound {
                    id: subscription_id,
                })
            }
        }
    }

    pub async fn delete_subscription(&self, raw_id: &str) -> UseCaseResult<()> {
        let subscription_id = validation::validate_subscription_id(raw_id)?;
        info!(subscription_id, "subscriptions: delete requested");

        let deleted = self
            .subscription_repository
            .delete(subscription_id)
            .await
            .map_err(|err| {
                error!(
                    subscription_id,
                    db_error = ?err,
                    "subscriptions: failed to delete subscription"
                );
                SubscriptionError::storage("delete subscription", err)
            })?;

        if deleted == 0 {
            warn!(subscription_id, "subscriptions: delete target not found");
            return Err(SubscriptionError::NotFound {
                id: subscription_id,
            });
        }

        info!(subscription_id, "subscriptions: subscription deleted");
        Ok(())
    }

    pub async fn list_subscriptions(
        &self,
        filter: ListSubscriptionsFilter,
    ) -> UseCaseResult<ListSubscriptionsModel> {
        let (limit, offset) = clamp_pagination(filter.limit, filter.offset);
        debug!(limit, offset, "subscriptions: listing subscriptions");

        let subscriptions = self
            .subscription_repository
            .list(limit, offset)
            .await
            .map_err(|err| {
                error!(limit, offset, db_error = ?err, "subscriptions: failed to list subscriptions");
                SubscriptionError::storage("list subscriptions", err)
            })?;

        let total = self.subscription_repository.count().await.map_err(|err| {
            error!(db_error = ?err, "subscriptions: failed to count subscriptions");
            SubscriptionError::storage("count subscriptions", err)
        })?;

        info!(
            returned = subscriptions.len(),
            total, "subscriptions: listed subscriptions"
        );

        Ok(ListSubscriptionsModel {
            subscriptions: subscriptions
                .into_iter()
                .map(SubscriptionModel::from)
                .collect(),
            total,
            limit,
            offset,
        })
    }

    pub async fn calculate_total_cost(
        &self,
        calculate_cost_model: CalculateCostModel,
    ) -> UseCaseResult<TotalCostModel> {
        info!(
            user_id = %calculate_cost_model.user_id,
            service_name = %calculate_cost_model.service_name,
            start_period = %calculate_cost_model.start_period,
            end_period = %calculate_cost_model.end_period,
            "subscriptions: total cost requested"
        );

        let (user_id, service_name, start, end) =
            validation::validate_cost_request(&calculate_cost_model).map_err(|err| {
                warn!(
                    field = err.field,
                    reason = %err.reason,
                    "subscriptions: total cost rejected"
                );
                err
            })?;

        let total_cost = if end < start {
            debug!(%start, %end, "subscriptions: empty period, skipping aggregate");
            0
        } else {
            self.subscription_repository
                .calculate_total_cost(user_id, service_name, start.first_day(), end.first_day())
                .await
                .map_err(|err| {
                    error!(
                        %user_id,
                        db_error = ?err,
                        "subscriptions: failed to calculate total cost"
                    );
                    SubscriptionError::storage("calculate total cost", err)
                })?
        };

        info!(%user_id, total_cost, "subscriptions: total cost calculated");

        Ok(TotalCostModel {
            total_cost,
            user_id: calculate_cost_model.user_id,
            service_name: calculate_cost_model.service_name,
            start_period: calculate_cost_model.start_period,
            end_period: calculate_cost_model.end_period,
        })
    }

    fn build_changeset(
        edit_subscription_model: &EditSubscriptionModel,
    ) -> Result<EditSubscriptionEntity, InvalidInput> {
        let mut changeset = EditSubscriptionEntity::default();

        if let Some(service_name) = edit_subscription_model.service_name.as_deref() {
            changeset.service_name = Some(validation::validate_service_name(service_name)?);
        }
        if let Some(price) = edit_subscription_model.price {
            changeset.price = Some(validation::validate_price(price)?);
        }
        if let Some(user_id) = edit_subscription_model.user_id.as_deref() {
            changeset.user_id = Some(validation::validate_user_id(user_id)?);
        }
        if let Some(start_date) = edit_subscription_model.start_date.as_deref() {
            let start = validation::validate_period("start_date", start_date)?;
            let end = start
                .add_one_month()
                .map_err(|err| InvalidInput::new("start_date", err.to_string()))?;
            changeset.start_date = Some(start.first_day());
            changeset.end_date = Some(end.first_day());
        }

        Ok(changeset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        entities::subscriptions::SubscriptionEntity,
        repositories::subscriptions::MockSubscriptionRepository,
    };
    use anyhow::anyhow;
    use chrono::NaiveDate;
    use mockall::predicate::eq;
    use uuid::Uuid;

    const USER_ID: &str = "60601fee-2bf1-4721-ae6f-7636e79a0cba";

    fn date(year: i32, month: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, 1).unwrap()
    }

    fn user_id() -> Uuid {
        Uuid::parse_str(USER_ID).unwrap()
    }

    fn sample_entity(id: i32) -> SubscriptionEntity {
        SubscriptionEntity {
            id,
            service_name: "Yandex Plus".to_string(),
            price: 1500,
            user_id: user_id(),
            start_date: date(2025, 1),
            end_date: Some(date(2025, 2)),
        }
    }

    fn usecase(repo: MockSubscriptionRepository) -> SubscriptionUseCase<MockSubscriptionRepository> {
        SubscriptionUseCase::new(Arc::new(repo))
    }

    #[tokio::test]
    async fn create_derives_end_date_one_month_after_start() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_create()
            .withf(|entity| {
                entity.service_name == "Yandex Plus"
                    && entity.price == 1500
                    && entity.start_date == date(2025, 1)
                    && entity.end_date == Some(date(2025, 2))
            })
            .times(1)
            .returning(|entity| {
                Ok(SubscriptionEntity {
                    id: 1,
                    service_name: entity.service_name,
                    price: entity.price,
                    user_id: entity.user_id,
                    start_date: entity.start_date,
                    end_date: entity.end_date,
                })
            });

        let created = usecase(repo)
            .create_subscription(InsertSubscriptionModel {
                service_name: "Yandex Plus".to_string(),
                price: 1500,
                user_id: USER_ID.to_string(),
                start_date: "01-2025".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert_eq!(created.start_date, date(2025, 1));
        assert_eq!(created.end_date, Some(date(2025, 2)));
    }

    #[tokio::test]
    async fn create_in_december_ends_in_january() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_create()
            .withf(|entity| entity.end_date == Some(date(2026, 1)))
            .returning(|_| {
                let mut entity = sample_entity(2);
                entity.start_date = date(2025, 12);
                entity.end_date = Some(date(2026, 1));
                Ok(entity)
            });

        let created = usecase(repo)
            .create_subscription(InsertSubscriptionModel {
                service_name: "Netflix".to_string(),
                price: 999,
                user_id: USER_ID.to_string(),
                start_date: "12-2025".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(created.end_date, Some(date(2026, 1)));
    }

    #[tokio::test]
    async fn create_rejects_invalid_input_without_touching_store() {
        let repo = MockSubscriptionRepository::new();

        let result = usecase(repo)
            .create_subscription(InsertSubscriptionModel {
                service_name: "Yandex Plus".to_string(),
                price: 0,
                user_id: USER_ID.to_string(),
                start_date: "01-2025".to_string(),
            })
            .await;

        match result {
            Err(SubscriptionError::InvalidInput(err)) => assert_eq!(err.field, "price"),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_rejects_start_whose_end_leaves_four_digit_years() {
        let repo = MockSubscriptionRepository::new();

        let err = usecase(repo)
            .create_subscription(InsertSubscriptionModel {
                service_name: "Yandex Plus".to_string(),
                price: 1500,
                user_id: USER_ID.to_string(),
                start_date: "12-9999".to_string(),
            })
            .await
            .unwrap_err();

        match err {
            SubscriptionError::InvalidInput(input) => assert_eq!(input.field, "start_date"),
            other => panic!("expected invalid input, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_surfaces_storage_failure() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_create()
            .returning(|_| Err(anyhow!("connection refused")));

        let err = usecase(repo)
            .create_subscription(InsertSubscriptionModel {
                service_name: "Yandex Plus".to_string(),
                price: 1500,
                user_id: USER_ID.to_string(),
                start_date: "01-2025".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SubscriptionError::Storage {
                operation: "create subscription",
                ..
            }
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn get_rejects_empty_id_before_querying() {
        let repo = MockSubscriptionRepository::new();

        let err = usecase(repo).get_subscription("").await.unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidInput(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_reports_missing_row_as_not_found() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_by_id()
            .with(eq(7))
            .returning(|_| Ok(None));

        let err = usecase(repo).get_subscription("7").await.unwrap_err();

        assert!(matches!(err, SubscriptionError::NotFound { id: 7 }));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn get_returns_stored_record() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_find_by_id()
            .with(eq(3))
            .returning(|id| Ok(Some(sample_entity(id))));

        let subscription = usecase(repo).get_subscription("3").await.unwrap();

        assert_eq!(subscription, SubscriptionModel::from(sample_entity(3)));
    }

    #[tokio::test]
    async fn update_without_start_date_leaves_end_date_alone() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_update()
            .withf(|id, changeset| {
                *id == 5
                    && changeset.price == Some(2000)
                    && changeset.start_date.is_none()
                    && changeset.end_date.is_none()
                    && changeset.service_name.is_none()
                    && changeset.user_id.is_none()
            })
            .times(1)
            .returning(|id, _| {
                let mut entity = sample_entity(id);
                entity.price = 2000;
                Ok(Some(entity))
            });

        usecase(repo)
            .update_subscription(
                "5",
                EditSubscriptionModel {
                    price: Some(2000),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_with_start_date_resets_end_date() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_update()
            .withf(|_, changeset| {
                changeset.start_date == Some(date(2025, 6))
                    && changeset.end_date == Some(date(2025, 7))
            })
            .times(1)
            .returning(|id, _| {
                let mut entity = sample_entity(id);
                entity.start_date = date(2025, 6);
                entity.end_date = Some(date(2025, 7));
                Ok(Some(entity))
            });

        usecase(repo)
            .update_subscription(
                "5",
                EditSubscriptionModel {
                    start_date: Some("06-2025".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_update_succeeds_with_empty_changeset() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_update()
            .withf(|_, changeset| changeset.is_empty())
            .times(1)
            .returning(|id, _| Ok(Some(sample_entity(id))));

        usecase(repo)
            .update_subscription("9", EditSubscriptionModel::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn update_rejects_present_but_empty_fields() {
        for edit in [
            EditSubscriptionModel {
                service_name: Some(String::new()),
                ..Default::default()
            },
            EditSubscriptionModel {
                user_id: Some(String::new()),
                ..Default::default()
            },
            EditSubscriptionModel {
                start_date: Some(String::new()),
                ..Default::default()
            },
            EditSubscriptionModel {
                price: Some(-1),
                ..Default::default()
            },
            EditSubscriptionModel {
                user_id: Some("nope".to_string()),
                ..Default::default()
            },
        ] {
            let repo = MockSubscriptionRepository::new();
            let err = usecase(repo)
                .update_subscription("1", edit)
                .await
                .unwrap_err();
            assert!(matches!(err, SubscriptionError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_update().returning(|_, _| Ok(None));

        let err = usecase(repo)
            .update_subscription(
                "404",
                EditSubscriptionModel {
                    service_name: Some("Spotify".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SubscriptionError::NotFound { id: 404 }));
    }

    #[tokio::test]
    async fn delete_of_missing_row_is_not_found() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_delete().with(eq(12)).returning(|_| Ok(0));

        let err = usecase(repo).delete_subscription("12").await.unwrap_err();

        assert!(matches!(err, SubscriptionError::NotFound { id: 12 }));
    }

    #[tokio::test]
    async fn delete_removes_existing_row() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_delete().with(eq(12)).returning(|_| Ok(1));

        usecase(repo).delete_subscription("12").await.unwrap();
    }

    #[tokio::test]
    async fn delete_rejects_non_numeric_id() {
        let repo = MockSubscriptionRepository::new();

        let err = usecase(repo).delete_subscription("abc").await.unwrap_err();

        assert!(matches!(err, SubscriptionError::InvalidInput(_)));
    }

    #[test]
    fn pagination_is_clamped() {
        assert_eq!(clamp_pagination(None, None), (10, 0));
        assert_eq!(clamp_pagination(Some(0), Some(-5)), (10, 0));
        assert_eq!(clamp_pagination(Some(500), Some(0)), (100, 0));
        assert_eq!(clamp_pagination(Some(25), Some(40)), (25, 40));
        assert_eq!(clamp_pagination(Some(1), None), (1, 0));
    }

    #[tokio::test]
    async fn list_applies_clamping_before_querying() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_list()
            .with(eq(10_i64), eq(0_i64))
            .times(1)
            .returning(|_, _| Ok(vec![sample_entity(2), sample_entity(1)]));
        repo.expect_count().returning(|| Ok(2));

        let page = usecase(repo)
            .list_subscriptions(ListSubscriptionsFilter {
                limit: Some(0),
                offset: Some(-5),
            })
            .await
            .unwrap();

        assert_eq!(page.limit, 10);
        assert_eq!(page.offset, 0);
        assert_eq!(page.total, 2);
        assert_eq!(page.subscriptions.len(), 2);
        assert_eq!(page.subscriptions[0].id, 2);
    }

    #[tokio::test]
    async fn list_caps_limit_at_one_hundred() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_list()
            .with(eq(100_i64), eq(0_i64))
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        repo.expect_count().returning(|| Ok(0));

        let page = usecase(repo)
            .list_subscriptions(ListSubscriptionsFilter {
                limit: Some(500),
                offset: Some(0),
            })
            .await
            .unwrap();

        assert_eq!(page.limit, 100);
        assert!(page.subscriptions.is_empty());
    }

    fn cost_request(start: &str, end: &str) -> CalculateCostModel {
        CalculateCostModel {
            user_id: USER_ID.to_string(),
            service_name: "Yandex Plus".to_string(),
            start_period: start.to_string(),
            end_period: end.to_string(),
        }
    }

    #[tokio::test]
    async fn total_cost_passes_period_bounds_and_echoes_request() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_calculate_total_cost()
            .with(
                eq(user_id()),
                eq("Yandex Plus".to_string()),
                eq(date(2025, 2)),
                eq(date(2025, 2)),
            )
            .times(1)
            .returning(|_, _, _, _| Ok(3500));

        let result = usecase(repo)
            .calculate_total_cost(cost_request("02-2025", "02-2025"))
            .await
            .unwrap();

        assert_eq!(
            result,
            TotalCostModel {
                total_cost: 3500,
                user_id: USER_ID.to_string(),
                service_name: "Yandex Plus".to_string(),
                start_period: "02-2025".to_string(),
                end_period: "02-2025".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn total_cost_with_no_matches_is_zero() {
        let mut repo = MockSubscriptionRepository::new();
        repo.expect_calculate_total_cost()
            .returning(|_, _, _, _| Ok(0));

        let result = usecase(repo)
            .calculate_total_cost(cost_request("01-2024", "12-2024"))
            .await
            .unwrap();

        assert_eq!(result.total_cost, 0);
    }

    #[tokio::test]
    async fn total_cost_for_reversed_period_is_zero_without_querying() {
        let repo = MockSubscriptionRepository::new();

        let result = usecase(repo)
            .calculate_total_cost(cost_request("06-2025", "01-2025"))
            .await
            .unwrap();

        assert_eq!(result.total_cost, 0);
    }

    #[tokio::test]
    async fn total_cost_requires_every_field() {
        for request in [
            CalculateCostModel {
                user_id: String::new(),
                ..cost_request("01-2025", "02-2025")
            },
            CalculateCostModel {
                service_name: String::new(),
                ..cost_request("01-2025", "02-2025")
            },
            cost_request("", "02-2025"),
            cost_request("01-2025", "2025-02"),
        ] {
            let repo = MockSubscriptionRepository::new();
            let err = usecase(repo)
                .calculate_total_cost(request)
                .await
                .unwrap_err();
            assert!(matches!(err, SubscriptionError::InvalidInput(_)));
        }
    }
}
