//! Router-level tests driving the full application against an in-memory store.

use api_rest::{router, AppState};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use medicard_core::models::User;
use medicard_core::{CoreConfig, Database, Role};
use serde_json::{json, Value};
use sqlx::Executor;
use std::sync::Arc;
use tower::ServiceExt;

struct Harness {
    state: AppState,
    app: Router,
}

impl Harness {
    async fn new() -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.run_migrations().await.unwrap();
        let cfg = CoreConfig::new(
            "router-test-secret-0123456789".into(),
            Duration::hours(1),
            Duration::hours(48),
        )
        .unwrap();
        let state = AppState::new(db, Arc::new(cfg));
        let app = router(state.clone());
        Self { state, app }
    }

    /// Insert a user without hashing a password and return a bearer token for them.
    async fn user(&self, username: &str, role: Role) -> (User, String) {
        let user: User = sqlx::query_as(
            "INSERT INTO users (username, email, password_hash, role, is_active, created_at) \
             VALUES (?, ?, 'not-a-real-hash', ?, 1, ?) RETURNING *",
        )
        .bind(username)
        .bind(format!("{username}@example.org"))
        .bind(role)
        .bind(Utc::now())
        .fetch_one(self.state.db.pool())
        .await
        .unwrap();
        let token = self.state.tokens.issue(user.id, user.role, Utc::now()).unwrap();
        (user, token)
    }

    async fn exec(&self, sql: &str) {
        self.state.db.pool().execute(sql).await.unwrap();
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }
}

fn ts(t: DateTime<Utc>) -> String {
    t.to_rfc3339()
}

#[tokio::test]
async fn health_reports_store_reachable() {
    let h = Harness::new().await;
    let (status, body) = h.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let h = Harness::new().await;
    let (status, body) = h.send(Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/dashboard/patient-list"].is_object());
    assert!(body["paths"]["/api/results/{id}"]["put"].is_object());
    assert!(body["paths"]["/api/auth/logout"]["post"].is_object());
    assert_eq!(
        body["components"]["schemas"]["NewLabResult"]["properties"]["test_name"]["example"],
        json!("Potassium")
    );
}

#[tokio::test]
async fn register_login_and_status() {
    let h = Harness::new().await;
    let (status, user) = h
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": "dr.grey",
                "email": "grey@example.org",
                "password": "password123",
                "role": "Doctor"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["role"], json!("Doctor"));
    assert!(user.get("password_hash").is_none());

    let (status, _) = h
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "grey@example.org", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, login) = h
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": "grey@example.org", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(login["token_type"], json!("Bearer"));
    let token = login["token"].as_str().unwrap().to_string();

    let (_, anonymous) = h.send(Method::GET, "/api/auth/status", None, None).await;
    assert_eq!(anonymous["is_logged_in"], json!(false));
    let (_, current) = h.get("/api/auth/status", &token).await;
    assert_eq!(current["is_logged_in"], json!(true));
    assert_eq!(current["user"]["username"], json!("dr.grey"));
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let h = Harness::new().await;
    let (status, body) = h
        .send(Method::GET, "/api/dashboard/patient-list", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["message"].is_string());

    let (status, _) = h.get("/api/dashboard/patient-list", "not.a.token").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn deactivated_user_is_rejected_with_a_live_token() {
    let h = Harness::new().await;
    let (user, token) = h.user("nurse", Role::Nurse).await;
    h.exec(&format!("UPDATE users SET is_active = 0 WHERE id = {}", user.id))
        .await;
    let (status, _) = h.get("/api/patients", &token).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn roles_gate_each_endpoint() {
    let h = Harness::new().await;
    let (_, pharmacist) = h.user("pharm", Role::Pharmacist).await;
    let (_, doctor) = h.user("doc", Role::Doctor).await;

    let (status, _) = h.get("/api/patients", &pharmacist).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = h.get("/api/orders", &pharmacist).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h
        .post(
            "/api/results",
            &doctor,
            json!({ "admission_id": 1, "test_name": "Na", "value": "140" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h
        .send(Method::DELETE, "/api/patients/MRN-1", Some(&doctor), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn dashboard_reports_indicators_for_the_caller() {
    let h = Harness::new().await;
    let (viewer, token) = h.user("attending", Role::Doctor).await;
    let now = Utc::now();

    h.exec(&format!(
        "INSERT INTO patients (id, mrn, first_name, last_name, dob, location_bed, attending_id) \
         VALUES (1, 'MRN-100', 'Ada', 'Lovelace', '1980-01-01', 'ICU-1', {0}); \
         INSERT INTO admissions (id, patient_id, admitted_at) VALUES (1, 1, '{1}'); \
         INSERT INTO results (admission_id, test_name, value, is_critical, recorded_at) \
         VALUES (1, 'Potassium', '6.9', 1, '{2}'); \
         INSERT INTO consults (admission_id, consultant_name, assigned_physician_id, status, requested_at) \
         VALUES (1, 'Cardiology', {0}, 'Completed', '{2}'); \
         INSERT INTO vital_signs (admission_id, recorded_at, heart_rate) VALUES (1, '{2}', 80);",
        viewer.id,
        ts(now - Duration::hours(3)),
        ts(now - Duration::hours(1)),
    ))
    .await;

    let (status, body) = h.get("/api/dashboard/patient-list", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["pagination"],
        json!({ "currentPage": 1, "perPage": 20, "totalPages": 1, "totalItems": 1 })
    );
    let row = &body["patients"][0];
    assert_eq!(row["mrn"], json!("MRN-100"));
    assert_eq!(row["name"], json!("Ada Lovelace"));
    assert_eq!(row["attending_name"], json!("attending"));
    assert_eq!(
        row["status_indicators"],
        json!({
            "has_critical_lab": true,
            "has_critical_imaging": false,
            "has_unread_consult": true,
            "has_pending_orders": false,
            "has_abnormal_vitals": false
        })
    );

    let (status, filtered) = h
        .get("/api/dashboard/patient-list?status=new_admission_24&unit=icu", &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered["pagination"]["totalItems"], json!(1));
}

#[tokio::test]
async fn dashboard_rejects_bad_query_values() {
    let h = Harness::new().await;
    let (_, token) = h.user("viewer", Role::User).await;

    for uri in [
        "/api/dashboard/patient-list?page=0",
        "/api/dashboard/patient-list?limit=-5",
        "/api/dashboard/patient-list?page=abc",
        "/api/dashboard/patient-list?status=discharged",
    ] {
        let (status, body) = h.get(uri, &token).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], json!("Validation Error"), "{uri}");
    }

    let (status, body) = h
        .get("/api/dashboard/patient-list?sortBy=shoe_size&limit=500", &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["perPage"], json!(100));
    assert_eq!(body["pagination"]["totalPages"], json!(0));
}

#[tokio::test]
async fn patient_and_admission_lifecycle() {
    let h = Harness::new().await;
    let (_, nurse) = h.user("nurse", Role::Nurse).await;
    let (_, admin) = h.user("admin", Role::Admin).await;

    let new_patient = json!({
        "mrn": "MRN-7",
        "first_name": "Grace",
        "last_name": "Hopper",
        "dob": "1906-12-09",
        "location_bed": "Ward 3 Bed 2"
    });
    let (status, patient) = h.post("/api/patients", &nurse, new_patient.clone()).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = h.post("/api/patients", &nurse, new_patient).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("Conflict"));

    let (status, list) = h.get("/api/patients?search=hop", &nurse).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["pagination"]["totalItems"], json!(1));
    assert_eq!(list["results"][0]["mrn"], json!("MRN-7"));

    let (status, admission) = h
        .post(
            "/api/admissions",
            &nurse,
            json!({ "patient_id": patient["id"], "reason": "Pneumonia" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = h
        .post("/api/admissions", &nurse, json!({ "patient_id": 999 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let uri = format!("/api/admissions/{}", admission["id"]);
    let (status, discharged) = h
        .send(
            Method::PUT,
            &uri,
            Some(&nurse),
            Some(json!({ "discharged_at": ts(Utc::now() + Duration::minutes(1)) })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(discharged["discharged_at"].is_string());

    let (status, _) = h.get("/api/patients/MRN-404", &nurse).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = h.get("/api/admissions/not-a-number", &nurse).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .send(Method::DELETE, "/api/patients/MRN-7", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = h.get(&uri, &nurse).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn acknowledging_a_result_clears_the_indicator() {
    let h = Harness::new().await;
    let (_, lab) = h.user("lab", Role::LabTech).await;
    let (doctor, doc_token) = h.user("doc", Role::Doctor).await;
    h.exec(&format!(
        "INSERT INTO patients (id, mrn, first_name, last_name, dob) \
         VALUES (1, 'MRN-1', 'A', 'B', '1980-01-01'); \
         INSERT INTO admissions (id, patient_id, admitted_at) VALUES (1, 1, '{}');",
        ts(Utc::now() - Duration::days(3))
    ))
    .await;

    let (status, result) = h
        .post(
            "/api/results",
            &lab,
            json!({ "admission_id": 1, "test_name": "Troponin", "value": "2.1", "is_critical": true }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, before) = h.get("/api/dashboard/patient-list", &doc_token).await;
    assert_eq!(
        before["patients"][0]["status_indicators"]["has_critical_lab"],
        json!(true)
    );

    let uri = format!("/api/results/{}/acknowledge", result["id"]);
    let (status, acked) = h.post(&uri, &doc_token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(acked["acknowledged_by_id"], json!(doctor.id));

    let (_, after) = h.get("/api/dashboard/patient-list", &doc_token).await;
    assert_eq!(
        after["patients"][0]["status_indicators"]["has_critical_lab"],
        json!(false)
    );

    let (status, list) = h.get("/api/results?admission_id=1", &doc_token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["pagination"]["totalItems"], json!(1));
}

#[tokio::test]
async fn lab_staff_amend_a_result_without_touching_acknowledgement() {
    let h = Harness::new().await;
    let (_, lab) = h.user("lab", Role::LabTech).await;
    let (doctor, doc_token) = h.user("doc", Role::Doctor).await;
    h.exec(&format!(
        "INSERT INTO patients (id, mrn, first_name, last_name, dob) \
         VALUES (1, 'MRN-1', 'A', 'B', '1980-01-01'); \
         INSERT INTO admissions (id, patient_id, admitted_at) VALUES (1, 1, '{}');",
        ts(Utc::now() - Duration::days(1))
    ))
    .await;

    let (_, result) = h
        .post(
            "/api/results",
            &lab,
            json!({ "admission_id": 1, "test_name": "Potassium", "value": "6.8", "is_critical": true }),
        )
        .await;
    let uri = format!("/api/results/{}", result["id"]);
    let (status, _) = h
        .post(&format!("{uri}/acknowledge"), &doc_token, json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, updated) = h
        .send(
            Method::PUT,
            &uri,
            Some(&lab),
            Some(json!({ "value": "4.1", "is_critical": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["value"], json!("4.1"));
    assert_eq!(updated["is_critical"], json!(false));
    assert_eq!(updated["test_name"], json!("Potassium"));
    assert_eq!(updated["acknowledged_by_id"], json!(doctor.id));
    assert!(!updated["acknowledged_at"].is_null());

    let (status, _) = h
        .send(Method::PUT, &uri, Some(&doc_token), Some(json!({ "value": "5.0" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = h
        .send(
            Method::PUT,
            &uri,
            Some(&lab),
            Some(json!({ "acknowledged_at": null })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .send(Method::PUT, "/api/results/999", Some(&lab), Some(json!({ "value": "1" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_store_failure_is_a_generic_500() {
    let h = Harness::new().await;
    let (_, token) = h.user("doc", Role::Doctor).await;
    h.exec(&format!(
        "INSERT INTO patients (id, mrn, first_name, last_name, dob) \
         VALUES (1, 'MRN-1', 'A', 'B', '1980-01-01'); \
         INSERT INTO admissions (id, patient_id, admitted_at) VALUES (1, 1, '{}'); \
         DROP TABLE vital_signs;",
        ts(Utc::now() - Duration::days(1))
    ))
    .await;

    let (status, body) = h.get("/api/dashboard/patient-list", &token).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Internal Server Error"));
    assert_eq!(body["message"], json!("An unexpected error occurred"));
    assert!(body.get("patients").is_none());
}

#[tokio::test]
async fn logout_needs_a_session() {
    let h = Harness::new().await;
    let (_, token) = h.user("nurse", Role::Nurse).await;

    let (status, body) = h.post("/api/auth/logout", &token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Logout successful"));

    let (status, _) = h.send(Method::POST, "/api/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn only_the_assigned_physician_marks_a_consult_read() {
    let h = Harness::new().await;
    let (consultant, consultant_token) = h.user("cardio", Role::Doctor).await;
    let (_, resident) = h.user("res", Role::Resident).await;
    h.exec(
        "INSERT INTO patients (id, mrn, first_name, last_name, dob) \
         VALUES (1, 'MRN-1', 'A', 'B', '1980-01-01'); \
         INSERT INTO admissions (id, patient_id, admitted_at) VALUES (1, 1, '2025-01-01T00:00:00+00:00');",
    )
    .await;

    let (status, consult) = h
        .post(
            "/api/consults",
            &resident,
            json!({
                "admission_id": 1,
                "consultant_name": "Cardiology",
                "assigned_physician_id": consultant.id
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(consult["status"], json!("Pending"));

    let uri = format!("/api/consults/{}/read", consult["id"]);
    let (status, _) = h.post(&uri, &resident, json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, read) = h.post(&uri, &consultant_token, json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(read["read_at"].is_string());

    let (status, list) = h.get("/api/consults?status=Pending", &resident).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["pagination"]["totalItems"], json!(1));
}

#[tokio::test]
async fn vitals_are_recorded_and_filtered_by_time() {
    let h = Harness::new().await;
    let (nurse, token) = h.user("nurse", Role::Nurse).await;
    h.exec(
        "INSERT INTO patients (id, mrn, first_name, last_name, dob) \
         VALUES (1, 'MRN-1', 'A', 'B', '1980-01-01'); \
         INSERT INTO admissions (id, patient_id, admitted_at) VALUES (1, 1, '2025-01-01T00:00:00+00:00');",
    )
    .await;

    let (status, view) = h
        .post(
            "/api/admissions/1/vitals",
            &token,
            json!({ "heart_rate": 135, "oxygen_saturation": 97.0 }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(view["is_abnormal"], json!(true));
    assert_eq!(view["recorded_by_id"], json!(nurse.id));

    let (status, _) = h
        .post("/api/admissions/1/vitals", &token, json!({ "pain_score": 14 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = h
        .post("/api/admissions/42/vitals", &token, json!({ "heart_rate": 70 }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = h
        .get("/api/admissions/1/vitals?start_time=last-tuesday", &token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, list) = h
        .get("/api/admissions/1/vitals?start_time=2020-01-01T00:00:00Z", &token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list["pagination"]["totalItems"], json!(1));
    assert_eq!(list["results"][0]["heart_rate"], json!(135));
}

#[tokio::test]
async fn list_paging_is_validated() {
    let h = Harness::new().await;
    let (_, token) = h.user("doc", Role::Doctor).await;
    let (status, _) = h.get("/api/orders?per_page=0", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = h.get("/api/orders?page=3", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], json!([]));
    assert_eq!(body["pagination"]["currentPage"], json!(3));
}
