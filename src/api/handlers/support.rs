//! Handlers for support ticket endpoints.

use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::api::dto::support::CreateTicketRequest;
use crate::api::extract::ValidatedJson;
use crate::domain::entities::{SupportTicket, User};
use crate::error::AppError;
use crate::state::AppState;

/// Opens a support ticket; priority follows the caller's tier.
///
/// # Endpoint
///
/// `POST /api/support/tickets`
pub async fn create_ticket_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    ValidatedJson(payload): ValidatedJson<CreateTicketRequest>,
) -> Result<(StatusCode, Json<SupportTicket>), AppError> {
    let ticket = state
        .support_service
        .create(&user, &payload.subject, &payload.message, payload.category)
        .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

/// # Endpoint
///
/// `GET /api/support/tickets`
pub async fn list_tickets_handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<SupportTicket>>, AppError> {
    let tickets = state.support_service.list(&user).await?;
    Ok(Json(tickets))
}
