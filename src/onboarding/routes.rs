//! REST endpoints for onboarding progress and the profile, used by the web
//! client.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use super::steps::OnboardingStep;
use super::tracker::OnboardingTracker;
use super::validate::{ContactDraft, PersonalInfoForm, validate_contacts};
use crate::error::ValidationError;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub tracker: OnboardingTracker,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

fn validation_response(err: ValidationError) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "errors": err.fields })),
    )
        .into_response()
}

/// GET /api/onboarding/status
async fn get_status(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    Json(state.tracker.status().await)
}

/// POST /api/onboarding/steps/{id}/finish
///
/// Marks the step complete and moves to the next one. 404 for an unknown id.
async fn finish_step(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
) -> Response {
    let Some(step) = OnboardingStep::from_id(&id) else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Unknown onboarding step: {id}"),
        );
    };
    state.tracker.finish_step(step).await;
    Json(state.tracker.status().await).into_response()
}

/// POST /api/onboarding/advance
async fn advance(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    state.tracker.advance().await;
    Json(state.tracker.status().await)
}

/// POST /api/onboarding/retreat
async fn retreat(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    state.tracker.retreat().await;
    Json(state.tracker.status().await)
}

/// POST /api/onboarding/complete
async fn complete(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    state.tracker.complete().await;
    Json(state.tracker.status().await)
}

/// POST /api/onboarding/reset
async fn reset(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    state.tracker.reset().await;
    Json(state.tracker.status().await)
}

/// POST /api/onboarding/personal-info
///
/// Validates the form, stores the profile and finishes the personal-info
/// step. An existing profile keeps its id and creation time.
async fn submit_personal_info(
    State(state): State<OnboardingRouteState>,
    Json(form): Json<PersonalInfoForm>,
) -> Response {
    let submitted = match form.validate() {
        Ok(profile) => profile,
        Err(e) => return validation_response(e),
    };

    let updated = state
        .tracker
        .update_profile(|p| {
            p.name = submitted.name.clone();
            p.email = submitted.email.clone();
            p.date_of_birth = submitted.date_of_birth.clone();
            p.gender = submitted.gender;
        })
        .await;
    if !updated {
        state.tracker.set_profile(submitted).await;
    }
    state
        .tracker
        .finish_step(OnboardingStep::PersonalInfo)
        .await;

    match state.tracker.profile().await {
        Some(profile) => Json(profile).into_response(),
        None => error_response(StatusCode::INTERNAL_SERVER_ERROR, "Profile was not stored"),
    }
}

/// POST /api/onboarding/emergency-contacts
///
/// 409 until personal info has been submitted.
async fn submit_emergency_contacts(
    State(state): State<OnboardingRouteState>,
    Json(drafts): Json<Vec<ContactDraft>>,
) -> Response {
    let contacts = match validate_contacts(&drafts) {
        Ok(contacts) => contacts,
        Err(e) => return validation_response(e),
    };

    let stored = contacts.clone();
    if !state
        .tracker
        .update_profile(|p| p.emergency_contacts = stored)
        .await
    {
        return error_response(StatusCode::CONFLICT, "Complete personal info first");
    }
    state
        .tracker
        .finish_step(OnboardingStep::EmergencyContacts)
        .await;
    Json(contacts).into_response()
}

/// GET /api/profile
///
/// Returns the full user profile, or 404 if no profile exists.
async fn get_profile(State(state): State<OnboardingRouteState>) -> Response {
    match state.tracker.profile().await {
        Some(profile) => Json(profile).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "No profile exists yet"),
    }
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/api/onboarding/status", get(get_status))
        .route("/api/onboarding/steps/{id}/finish", post(finish_step))
        .route("/api/onboarding/advance", post(advance))
        .route("/api/onboarding/retreat", post(retreat))
        .route("/api/onboarding/complete", post(complete))
        .route("/api/onboarding/reset", post(reset))
        .route("/api/onboarding/personal-info", post(submit_personal_info))
        .route(
            "/api/onboarding/emergency-contacts",
            post(submit_emergency_contacts),
        )
        .route("/api/profile", get(get_profile))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
