use axum::{
    extract::{Path, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::payment_controller::PaymentController;
use crate::dto::auth_dto::ApiResponse;
use crate::dto::payment_dto::{
    ConfirmPaymentRequest, CreateIntentRequest, CreateIntentResponse, PaymentResponse,
};
use crate::middleware::auth::{auth_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppResult;

pub fn create_payment_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/create-intent", post(create_intent))
        .route("/confirm", post(confirm_payment))
        .route("/rental/:rental_id", get(list_rental_payments))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

async fn create_intent(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<CreateIntentRequest>,
) -> AppResult<Json<CreateIntentResponse>> {
    let controller = PaymentController::new(
        state.pool.clone(),
        state.payments.clone(),
        state.config.payment_currency.clone(),
    );
    let response = controller.create_intent(&user, request).await?;
    Ok(Json(response))
}

async fn confirm_payment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> AppResult<Json<ApiResponse<PaymentResponse>>> {
    let controller = PaymentController::new(
        state.pool.clone(),
        state.payments.clone(),
        state.config.payment_currency.clone(),
    );
    let response = controller.confirm(&user, request).await?;
    Ok(Json(response))
}

async fn list_rental_payments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(rental_id): Path<Uuid>,
) -> AppResult<Json<Vec<PaymentResponse>>> {
    let controller = PaymentController::new(
        state.pool.clone(),
        state.payments.clone(),
        state.config.payment_currency.clone(),
    );
    let response = controller.list_by_rental(&user, rental_id).await?;
    Ok(Json(response))
}
