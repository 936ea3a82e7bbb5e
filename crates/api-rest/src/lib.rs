//! # API REST
//!
//! REST API for the medical record service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status-code mapping)
//!
//! Core operations live in `medrec-core`; this crate only translates between
//! HTTP and the service layer. Errors are mapped at this boundary: NotFound
//! becomes 404 with the missing id in the message, InvalidInput becomes 400,
//! and storage failures are logged and surfaced as a generic 500.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use medrec_core::{
    JsonRecordStore, MedicalRecord, MedicalRecordSummary, RecordError, RecordId, RecordService,
    RecordUpdate, TherapyStatus, TherapyUpdate,
};

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub record_service: Arc<RecordService<JsonRecordStore>>,
}

/// Health check response.
#[derive(Serialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
struct PatientIdQuery {
    patient_id: i64,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
struct DoctorIdQuery {
    doctor_id: i64,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
struct TherapistIdQuery {
    therapist_id: i64,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_records,
        get_record,
        records_by_patient,
        records_by_doctor,
        create_record,
        update_record,
        update_therapies,
        assign_therapist,
        delete_record,
    ),
    components(schemas(
        HealthRes,
        MedicalRecord,
        MedicalRecordSummary,
        RecordUpdate,
        TherapyUpdate,
        TherapyStatus,
    ))
)]
struct ApiDoc;

/// Build the application router with all medical-record routes, the
/// Swagger UI, and a permissive CORS layer.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/medical-records", get(list_records))
        .route("/medical-records", post(create_record))
        .route("/medical-records/patient", get(records_by_patient))
        .route("/medical-records/doctor", get(records_by_doctor))
        .route("/medical-records/:id", get(get_record))
        .route("/medical-records/:id", put(update_record))
        .route("/medical-records/:id", delete(delete_record))
        .route("/medical-records/:id/therapies", put(update_therapies))
        .route(
            "/medical-records/:id/assign-therapist",
            put(assign_therapist),
        )
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Map a core error to a client-facing status code and body.
fn error_response(e: RecordError) -> (StatusCode, String) {
    match e {
        RecordError::NotFound { .. } => (StatusCode::NOT_FOUND, e.to_string()),
        RecordError::InvalidInput(_) => (StatusCode::BAD_REQUEST, e.to_string()),
        other => {
            tracing::error!("medical record operation failed: {:?}", other);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint used for monitoring and load balancer probes.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "medrec REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/medical-records",
    responses(
        (status = 200, description = "All medical records, flattened", body = [MedicalRecordSummary]),
        (status = 500, description = "Internal server error")
    )
)]
/// List every medical record as its flattened presentation shape, in
/// storage order. No pagination.
#[axum::debug_handler]
async fn list_records(
    State(state): State<AppState>,
) -> Result<Json<Vec<MedicalRecordSummary>>, (StatusCode, String)> {
    state
        .record_service
        .list()
        .map(Json)
        .map_err(error_response)
}

#[utoipa::path(
    get,
    path = "/medical-records/{id}",
    params(("id" = i64, Path, description = "Medical record id")),
    responses(
        (status = 200, description = "The medical record", body = MedicalRecord),
        (status = 404, description = "No record with this id")
    )
)]
/// Fetch a single medical record by id.
#[axum::debug_handler]
async fn get_record(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
) -> Result<Json<MedicalRecord>, (StatusCode, String)> {
    state
        .record_service
        .get(id)
        .map(Json)
        .map_err(error_response)
}

#[utoipa::path(
    get,
    path = "/medical-records/patient",
    params(PatientIdQuery),
    responses(
        (status = 200, description = "Records for the patient", body = [MedicalRecord])
    )
)]
/// All records belonging to one patient. An unknown patient id yields an
/// empty list, not a 404.
#[axum::debug_handler]
async fn records_by_patient(
    State(state): State<AppState>,
    Query(query): Query<PatientIdQuery>,
) -> Result<Json<Vec<MedicalRecord>>, (StatusCode, String)> {
    state
        .record_service
        .list_by_patient(query.patient_id)
        .map(Json)
        .map_err(error_response)
}

#[utoipa::path(
    get,
    path = "/medical-records/doctor",
    params(DoctorIdQuery),
    responses(
        (status = 200, description = "Records for the doctor", body = [MedicalRecord])
    )
)]
/// All records belonging to one doctor.
#[axum::debug_handler]
async fn records_by_doctor(
    State(state): State<AppState>,
    Query(query): Query<DoctorIdQuery>,
) -> Result<Json<Vec<MedicalRecord>>, (StatusCode, String)> {
    state
        .record_service
        .list_by_doctor(query.doctor_id)
        .map(Json)
        .map_err(error_response)
}

#[utoipa::path(
    post,
    path = "/medical-records",
    params(PatientIdQuery),
    request_body = MedicalRecord,
    responses(
        (status = 201, description = "Record created", body = MedicalRecord),
        (status = 400, description = "Bad request")
    )
)]
/// Create a medical record for a patient.
///
/// Under the default legacy assignment mode the stored record has null
/// patient and doctor ids regardless of what was supplied; see
/// `medrec_core::AssignmentMode`.
#[axum::debug_handler]
async fn create_record(
    State(state): State<AppState>,
    Query(query): Query<PatientIdQuery>,
    Json(record): Json<MedicalRecord>,
) -> Result<(StatusCode, Json<MedicalRecord>), (StatusCode, String)> {
    state
        .record_service
        .create(query.patient_id, record)
        .map(|saved| (StatusCode::CREATED, Json(saved)))
        .map_err(error_response)
}

#[utoipa::path(
    put,
    path = "/medical-records/{id}",
    params(("id" = i64, Path, description = "Medical record id")),
    request_body = RecordUpdate,
    responses(
        (status = 200, description = "Merged record", body = MedicalRecord),
        (status = 404, description = "No record with this id")
    )
)]
/// Partially update a medical record.
///
/// Only non-null (and, for text, non-empty) payload fields overwrite stored
/// values; the record's patient and doctor ids are never changed.
#[axum::debug_handler]
async fn update_record(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
    Json(update): Json<RecordUpdate>,
) -> Result<Json<MedicalRecord>, (StatusCode, String)> {
    state
        .record_service
        .update(id, update)
        .map(Json)
        .map_err(error_response)
}

#[utoipa::path(
    put,
    path = "/medical-records/{id}/therapies",
    params(("id" = i64, Path, description = "Medical record id")),
    request_body = TherapyUpdate,
    responses(
        (status = 200, description = "Updated record", body = MedicalRecord),
        (status = 404, description = "No record with this id")
    )
)]
/// Set the therapy flag and replace the required-therapy list.
#[axum::debug_handler]
async fn update_therapies(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
    Json(req): Json<TherapyUpdate>,
) -> Result<Json<MedicalRecord>, (StatusCode, String)> {
    state
        .record_service
        .update_therapies(id, req.need_therapy, req.therapy_ids)
        .map(Json)
        .map_err(error_response)
}

#[utoipa::path(
    put,
    path = "/medical-records/{id}/assign-therapist",
    params(
        ("id" = i64, Path, description = "Medical record id"),
        TherapistIdQuery
    ),
    responses(
        (status = 200, description = "Updated record", body = MedicalRecord),
        (status = 404, description = "No record with this id")
    )
)]
/// Assign a therapist to a medical record.
#[axum::debug_handler]
async fn assign_therapist(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
    Query(query): Query<TherapistIdQuery>,
) -> Result<Json<MedicalRecord>, (StatusCode, String)> {
    state
        .record_service
        .assign_therapist(id, query.therapist_id)
        .map(Json)
        .map_err(error_response)
}

#[utoipa::path(
    delete,
    path = "/medical-records/{id}",
    params(("id" = i64, Path, description = "Medical record id")),
    responses(
        (status = 200, description = "Deletion confirmation", body = String),
        (status = 404, description = "No record with this id")
    )
)]
/// Permanently delete a medical record.
#[axum::debug_handler]
async fn delete_record(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<RecordId>,
) -> Result<String, (StatusCode, String)> {
    state
        .record_service
        .delete(id)
        .map(|()| format!("Medical record deleted with ID: {}", id))
        .map_err(error_response)
}
