use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    application::usecases::subscriptions::SubscriptionUseCase,
    domain::{
        repositories::subscriptions::SubscriptionRepository,
        value_objects::subscriptions::{
            CalculateCostModel, EditSubscriptionModel, InsertSubscriptionModel,
            ListSubscriptionsFilter,
        },
    },
    infrastructure::{
        axum_http::error_responses::error_response,
        postgres::{
            postgres_connection::PgPoolSquad, repositories::subscriptions::SubscriptionPostgres,
        },
    },
};

#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionIdQuery {
    id: Option<String>,
}

/// Raw paging values; each one that fails to parse falls back on its own.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    limit: Option<String>,
    offset: Option<String>,
}

impl ListQuery {
    pub fn into_filter(self) -> ListSubscriptionsFilter {
        ListSubscriptionsFilter {
            limit: parse_paging_value("limit", self.limit.as_deref()),
            offset: parse_paging_value("offset", self.offset.as_deref()),
        }
    }
}

fn parse_paging_value(name: &'static str, raw: Option<&str>) -> Option<i64> {
    let raw = raw?.trim();
    match raw.parse::<i64>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(param = name, value = %raw, "subscriptions: ignoring invalid paging value");
            None
        }
    }
}

pub fn routes(db_pool: Arc<PgPoolSquad>) -> Router {
    let subscriptions_repository = SubscriptionPostgres::new(Arc::clone(&db_pool));
    let subscriptions_usecase = SubscriptionUseCase::new(Arc::new(subscriptions_repository));

    router(Arc::new(subscriptions_usecase))
}

pub fn router<T>(subscriptions_usecase: Arc<SubscriptionUseCase<T>>) -> Router
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    Router::new()
        .route(
            "/",
            post(create::<T>)
                .get(get_by_id::<T>)
                .put(update::<T>)
                .delete(delete::<T>),
        )
        .route("/list", get(list::<T>))
        .route("/total-cost", post(calculate_total_cost::<T>))
        .with_state(subscriptions_usecase)
}

pub async fn create<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    payload: Result<Json<InsertSubscriptionModel>, JsonRejection>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    info!("subscriptions: create request received");
    let Json(insert_subscription_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection, "subscriptions: invalid create body");
            return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    match subscriptions_usecase
        .create_subscription(insert_subscription_model)
        .await
    {
        Ok(subscription) => (StatusCode::CREATED, Json(subscription)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn get_by_id<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    Query(query): Query<SubscriptionIdQuery>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    let id = query.id.unwrap_or_default();
    info!(id = %id, "subscriptions: get request received");

    match subscriptions_usecase.get_subscription(&id).await {
        Ok(subscription) => Json(subscription).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    Query(query): Query<SubscriptionIdQuery>,
    payload: Result<Json<EditSubscriptionModel>, JsonRejection>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    let id = query.id.unwrap_or_default();
    info!(id = %id, "subscriptions: update request received");

    let Json(edit_subscription_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(id = %id, error = %rejection, "subscriptions: invalid update body");
            return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    match subscriptions_usecase
        .update_subscription(&id, edit_subscription_model)
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn delete<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    Query(query): Query<SubscriptionIdQuery>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    let id = query.id.unwrap_or_default();
    info!(id = %id, "subscriptions: delete request received");

    match subscriptions_usecase.delete_subscription(&id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    Query(query): Query<ListQuery>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    info!("subscriptions: list request received");

    match subscriptions_usecase
        .list_subscriptions(query.into_filter())
        .await
    {
        Ok(page) => Json(page).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn calculate_total_cost<T>(
    State(subscriptions_usecase): State<Arc<SubscriptionUseCase<T>>>,
    payload: Result<Json<CalculateCostModel>, JsonRejection>,
) -> impl IntoResponse
where
    T: SubscriptionRepository + Send + Sync + 'static,
{
    info!("subscriptions: total cost request received");
    let Json(calculate_cost_model) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(error = %rejection, "subscriptions: invalid total cost body");
            return error_response(StatusCode::BAD_REQUEST, "Invalid request body");
        }
    };

    match subscriptions_usecase
        .calculate_total_cost(calculate_cost_model)
        .await
    {
        Ok(result) => Json(result).into_response(),
        Err(err) => err.into_response(),
    }
}
