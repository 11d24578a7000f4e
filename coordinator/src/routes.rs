use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{debug, info, warn};
use model::{Ack, TrainingTriplet};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::Sender;

use super::{ApiError, TripletStore, WeightStore};

#[derive(Clone)]
pub struct AppState {
    pub weights: Arc<WeightStore>,
    pub triplets: Arc<TripletStore>,
    /// Accepted reports are forwarded here when a trainer is attached.
    pub trainer_tx: Option<Sender<Vec<TrainingTriplet>>>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weights", get(get_weights))
        .route("/triplets", post(report_triplets))
        .with_state(state)
}

async fn get_weights(State(state): State<AppState>) -> Result<Response, ApiError> {
    let published = state
        .weights
        .current()
        .ok_or_else(|| ApiError::not_found("no weights persisted"))?;

    debug!("Serving weights version {}", published.bundle.version);

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        published.body.clone(),
    )
        .into_response())
}

async fn report_triplets(
    State(state): State<AppState>,
    payload: Result<Json<Vec<TrainingTriplet>>, JsonRejection>,
) -> Result<Json<Ack>, ApiError> {
    let Json(triplets) = payload.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    if triplets.is_empty() {
        return Ok(Json(Ack::ok(0)));
    }

    for (index, triplet) in triplets.iter().enumerate() {
        triplet
            .validate()
            .map_err(|err| ApiError::bad_request(format!("Triplet {}: {:#}", index, err)))?;
    }

    let received = triplets.len();
    let store = state.triplets.clone();
    let (stored, triplets) =
        tokio::task::spawn_blocking(move || store.append(&triplets).map(|len| (len, triplets)))
            .await??;

    info!("Accepted report of {} triplets, {} stored", received, stored);

    if let Some(trainer_tx) = &state.trainer_tx {
        match trainer_tx.try_send(triplets) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Trainer is behind, report of {} triplets not forwarded", received)
            }
            Err(TrySendError::Closed(_)) => {
                warn!("Trainer has stopped, report of {} triplets not forwarded", received)
            }
        }
    }

    Ok(Json(Ack::ok(received)))
}
