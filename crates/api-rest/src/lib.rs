//! # API REST
//!
//! REST API implementation for MEDICARD.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - Bearer-token authentication and role checks
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, request tracing)
//!
//! Uses `api-shared` for wire types and `medicard-core` for everything that touches the store.

#![warn(rust_2018_idioms)]

pub mod error;
pub mod extract;
pub mod handlers;

use api_shared::{
    DashboardPatient, ErrorRes, HealthRes, MessageRes, Pagination, PatientListRes,
    StatusIndicators,
};
use axum::routing::{get, post};
use axum::Router;
use medicard_core::auth::TokenService;
use medicard_core::models::{
    Admission, AdmissionUpdate, Consult, ConsultStatus, ConsultUpdate, ImagingStudy, LabResult,
    LabResultUpdate, NewAdmission, NewConsult, NewImagingStudy, NewLabResult, NewOrder,
    NewPatient, NewUser, NewVitalSign, Order, OrderStatus, OrderUpdate, Patient, PatientUpdate,
    User, VitalSign, VitalSignView,
};
use medicard_core::{CoreConfig, Database, Role};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub use error::{ApiError, ApiResult};
pub use extract::CurrentUser;

/// Application state shared by every handler.
///
/// Services are cheap to construct and are built per request from these handles.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub cfg: Arc<CoreConfig>,
    pub tokens: TokenService,
}

impl AppState {
    pub fn new(db: Database, cfg: Arc<CoreConfig>) -> Self {
        let tokens = TokenService::new(&cfg);
        Self { db, cfg, tokens }
    }
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::status,
        handlers::auth::logout,
        handlers::dashboard::patient_list,
        handlers::patients::list_patients,
        handlers::patients::create_patient,
        handlers::patients::get_patient,
        handlers::patients::update_patient,
        handlers::patients::delete_patient,
        handlers::admissions::list_admissions,
        handlers::admissions::create_admission,
        handlers::admissions::get_admission,
        handlers::admissions::update_admission,
        handlers::admissions::delete_admission,
        handlers::results::list_results,
        handlers::results::create_result,
        handlers::results::get_result,
        handlers::results::update_result,
        handlers::results::delete_result,
        handlers::results::acknowledge_result,
        handlers::imaging::list_imaging,
        handlers::imaging::create_imaging,
        handlers::imaging::get_imaging,
        handlers::imaging::acknowledge_imaging,
        handlers::consults::list_consults,
        handlers::consults::create_consult,
        handlers::consults::get_consult,
        handlers::consults::update_consult,
        handlers::consults::delete_consult,
        handlers::consults::mark_consult_read,
        handlers::orders::list_orders,
        handlers::orders::create_order,
        handlers::orders::get_order,
        handlers::orders::update_order,
        handlers::orders::delete_order,
        handlers::vitals::record_vitals,
        handlers::vitals::list_vitals,
    ),
    components(schemas(
        HealthRes,
        MessageRes,
        ErrorRes,
        Pagination,
        PatientListRes,
        DashboardPatient,
        StatusIndicators,
        Role,
        User,
        NewUser,
        handlers::auth::LoginReq,
        handlers::auth::LoginRes,
        handlers::auth::StatusRes,
        Patient,
        NewPatient,
        PatientUpdate,
        Admission,
        NewAdmission,
        AdmissionUpdate,
        LabResult,
        NewLabResult,
        LabResultUpdate,
        ImagingStudy,
        NewImagingStudy,
        Consult,
        ConsultStatus,
        NewConsult,
        ConsultUpdate,
        Order,
        OrderStatus,
        NewOrder,
        OrderUpdate,
        VitalSign,
        VitalSignView,
        NewVitalSign,
        handlers::PatientPage,
        handlers::AdmissionPage,
        handlers::LabResultPage,
        handlers::ImagingPage,
        handlers::ConsultPage,
        handlers::OrderPage,
        handlers::VitalSignPage,
    )),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

/// Build the full router: API routes, OpenAPI document, Swagger UI, CORS and request tracing.
pub fn router(state: AppState) -> Router {
    use handlers::{admissions, auth, consults, dashboard, health, imaging, orders, patients, results, vitals};

    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/status", get(auth::status))
        .route("/auth/logout", post(auth::logout))
        .route("/dashboard/patient-list", get(dashboard::patient_list))
        .route(
            "/patients",
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            "/patients/:mrn",
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(
            "/admissions",
            get(admissions::list_admissions).post(admissions::create_admission),
        )
        .route(
            "/admissions/:id",
            get(admissions::get_admission)
                .put(admissions::update_admission)
                .delete(admissions::delete_admission),
        )
        .route(
            "/admissions/:id/vitals",
            get(vitals::list_vitals).post(vitals::record_vitals),
        )
        .route(
            "/results",
            get(results::list_results).post(results::create_result),
        )
        .route(
            "/results/:id",
            get(results::get_result)
                .put(results::update_result)
                .delete(results::delete_result),
        )
        .route("/results/:id/acknowledge", post(results::acknowledge_result))
        .route(
            "/imaging",
            get(imaging::list_imaging).post(imaging::create_imaging),
        )
        .route("/imaging/:id", get(imaging::get_imaging))
        .route("/imaging/:id/acknowledge", post(imaging::acknowledge_imaging))
        .route(
            "/consults",
            get(consults::list_consults).post(consults::create_consult),
        )
        .route(
            "/consults/:id",
            get(consults::get_consult)
                .put(consults::update_consult)
                .delete(consults::delete_consult),
        )
        .route("/consults/:id/read", post(consults::mark_consult_read))
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route(
            "/orders/:id",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        );

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
