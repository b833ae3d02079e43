use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use serde::Serialize;
use tracing::info;

use crate::{
    catalog::{self, ClassCatalogs},
    database::CatalogStore,
    error::{AppError, FieldError},
    models::{EventView, SignupRequest},
    registration::register,
    state::AppState,
    utils::parse_registration,
};

#[derive(Serialize)]
pub struct SignupConfirmation {
    message: &'static str,
}

pub async fn classes_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<ClassCatalogs>, AppError> {
    catalog::class_catalogs(&state.store).await.map(Json)
}

pub async fn events_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<EventView>>, AppError> {
    catalog::upcoming_events(&state.store).await.map(Json)
}

pub async fn signup_handler<S: CatalogStore>(
    State(state): State<Arc<AppState<S>>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<Json<SignupConfirmation>, AppError> {
    let Json(payload) = payload.map_err(|_| {
        AppError::Validation(vec![FieldError::new("body", "must be a JSON signup request")])
    })?;

    let registration = parse_registration(payload)?;

    register(&state.store, &registration).await?;

    info!(
        class = %registration.class_name,
        day = %registration.day,
        time = %registration.time,
        "signup recorded"
    );

    Ok(Json(SignupConfirmation {
        message: "Signup successful",
    }))
}
