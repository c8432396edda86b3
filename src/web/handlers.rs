//! Request handlers. Each one reads the request, calls the matching command and turns the
//! command's structured output into the response body.

use crate::aggregate::Overview;
use crate::args::{
    AskArgs, Entity, EntityIdArgs, IdArgs, PotFundsArgs, UpdateBillArgs, UpdateBudgetArgs,
    UpdatePotArgs, UpdateTransactionArgs,
};
use crate::commands::{self, Out};
use crate::model::{BudgetView, PotView, RecurringBill, Transaction};
use crate::web::body::{Fields, JsonObject};
use crate::web::error::{ApiError, ApiResult};
use crate::web::AppState;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt::Debug;

/// The `{id}` path segment. Anything that is not an integer cannot name a record.
pub(super) struct Id(i64);

#[async_trait::async_trait]
impl<S> FromRequestParts<S> for Id
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        raw.parse()
            .map(Id)
            .map_err(|_| ApiError::not_found(format!("No record has the id '{raw}'")))
    }
}

fn data<T>(out: Out<T>) -> ApiResult<Json<T>>
where
    T: Serialize + Clone + Debug,
{
    out.into_structure()
        .map(Json)
        .ok_or_else(|| ApiError::internal("The command returned no data"))
}

fn created<T>(out: Out<T>) -> ApiResult<(StatusCode, Json<T>)>
where
    T: Serialize + Clone + Debug,
{
    Ok((StatusCode::CREATED, data(out)?))
}

async fn destroy(state: AppState, entity: Entity, id: i64) -> ApiResult<StatusCode> {
    commands::delete(state.config(), EntityIdArgs { entity, id }).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(super) async fn list_transactions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Transaction>>> {
    data(commands::list_transactions(state.config()).await?)
}

pub(super) async fn create_transaction(
    State(state): State<AppState>,
    body: JsonObject,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let args = Fields::new(body).insert_transaction()?;
    created(commands::insert_transaction(state.config(), args).await?)
}

pub(super) async fn show_transaction(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<Json<Transaction>> {
    data(commands::get_transaction(state.config(), IdArgs { id }).await?)
}

pub(super) async fn update_transaction(
    State(state): State<AppState>,
    Id(id): Id,
    body: JsonObject,
) -> ApiResult<Json<Transaction>> {
    let updates = Fields::new(body).transaction_updates()?;
    let args = UpdateTransactionArgs { id, updates };
    data(commands::update_transaction(state.config(), args).await?)
}

pub(super) async fn delete_transaction(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<StatusCode> {
    destroy(state, Entity::Transactions, id).await
}

pub(super) async fn list_budgets(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<BudgetView>>> {
    data(commands::list_budgets(state.config()).await?)
}

pub(super) async fn create_budget(
    State(state): State<AppState>,
    body: JsonObject,
) -> ApiResult<(StatusCode, Json<BudgetView>)> {
    let args = Fields::new(body).insert_budget()?;
    created(commands::insert_budget(state.config(), args).await?)
}

pub(super) async fn show_budget(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<Json<BudgetView>> {
    data(commands::get_budget(state.config(), IdArgs { id }).await?)
}

pub(super) async fn update_budget(
    State(state): State<AppState>,
    Id(id): Id,
    body: JsonObject,
) -> ApiResult<Json<BudgetView>> {
    let updates = Fields::new(body).budget_updates()?;
    let args = UpdateBudgetArgs { id, updates };
    data(commands::update_budget(state.config(), args).await?)
}

pub(super) async fn delete_budget(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<StatusCode> {
    destroy(state, Entity::Budgets, id).await
}

pub(super) async fn list_pots(State(state): State<AppState>) -> ApiResult<Json<Vec<PotView>>> {
    data(commands::list_pots(state.config()).await?)
}

pub(super) async fn create_pot(
    State(state): State<AppState>,
    body: JsonObject,
) -> ApiResult<(StatusCode, Json<PotView>)> {
    let args = Fields::new(body).insert_pot()?;
    created(commands::insert_pot(state.config(), args).await?)
}

pub(super) async fn show_pot(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<Json<PotView>> {
    data(commands::get_pot(state.config(), IdArgs { id }).await?)
}

pub(super) async fn update_pot(
    State(state): State<AppState>,
    Id(id): Id,
    body: JsonObject,
) -> ApiResult<Json<PotView>> {
    let updates = Fields::new(body).pot_updates()?;
    let args = UpdatePotArgs { id, updates };
    data(commands::update_pot(state.config(), args).await?)
}

pub(super) async fn delete_pot(State(state): State<AppState>, Id(id): Id) -> ApiResult<StatusCode> {
    destroy(state, Entity::Pots, id).await
}

pub(super) async fn deposit_to_pot(
    State(state): State<AppState>,
    Id(id): Id,
    body: JsonObject,
) -> ApiResult<Json<PotView>> {
    let amount = Fields::new(body).pot_amount()?;
    data(commands::deposit(state.config(), PotFundsArgs { id, amount }).await?)
}

pub(super) async fn withdraw_from_pot(
    State(state): State<AppState>,
    Id(id): Id,
    body: JsonObject,
) -> ApiResult<Json<PotView>> {
    let amount = Fields::new(body).pot_amount()?;
    data(commands::withdraw(state.config(), PotFundsArgs { id, amount }).await?)
}

pub(super) async fn list_bills(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RecurringBill>>> {
    data(commands::list_bills(state.config()).await?)
}

pub(super) async fn create_bill(
    State(state): State<AppState>,
    body: JsonObject,
) -> ApiResult<(StatusCode, Json<RecurringBill>)> {
    let args = Fields::new(body).insert_bill()?;
    created(commands::insert_bill(state.config(), args).await?)
}

pub(super) async fn show_bill(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<Json<RecurringBill>> {
    data(commands::get_bill(state.config(), IdArgs { id }).await?)
}

pub(super) async fn update_bill(
    State(state): State<AppState>,
    Id(id): Id,
    body: JsonObject,
) -> ApiResult<Json<RecurringBill>> {
    let updates = Fields::new(body).bill_updates()?;
    let args = UpdateBillArgs { id, updates };
    data(commands::update_bill(state.config(), args).await?)
}

pub(super) async fn delete_bill(
    State(state): State<AppState>,
    Id(id): Id,
) -> ApiResult<StatusCode> {
    destroy(state, Entity::Bills, id).await
}

pub(super) async fn summary(State(state): State<AppState>) -> ApiResult<Json<Overview>> {
    data(commands::summary(state.config()).await?)
}

#[derive(Debug, Serialize)]
pub(super) struct AdvisorReply {
    message: String,
}

pub(super) async fn ask(
    State(state): State<AppState>,
    body: JsonObject,
) -> ApiResult<Json<AdvisorReply>> {
    let args: AskArgs = Fields::new(body).ask()?;
    let out = commands::ask(state.config(), state.mode, args).await?;
    Ok(Json(AdvisorReply {
        message: out.message().to_string(),
    }))
}
