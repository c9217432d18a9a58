use axum::{extract::State, http::StatusCode, routing::get, Router};

use crate::database::models::*;
use crate::utils::validation::{validate_currency, validate_donation_amount};
use crate::web::error::AdminResult;
use crate::web::extract::Json;
use crate::web::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/donations", get(list_donations).post(create_donation))
}

async fn list_donations(State(state): State<AppState>) -> AdminResult<Json<Vec<DonationListItem>>> {
    Ok(Json(Donation::list(&state.db.pool).await?))
}

/// Records an offline donation (cash, bank transfer) against a participant.
async fn create_donation(
    State(state): State<AppState>,
    Json(input): Json<DonationInput>,
) -> AdminResult<(StatusCode, Json<Donation>)> {
    validate_donation_amount(input.amount)?;
    validate_currency(&input.currency)?;
    let donation = Donation::create(&state.db.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(donation)))
}
