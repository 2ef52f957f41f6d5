//! HTTP surface for the student API.
//!
//! - `GET /` – HTML banner confirming the server is up.
//! - `GET /api/students` – List every student with a `count`.
//! - `POST /api/students` – Validate `{name, age}` and insert a student (201 on success).
//! - `DELETE /api/students/:student_id` – Delete a student by integer id, echoing the removed row.
//!
//! Every `/api` response is a JSON [`Envelope`]. Failures are carried as [`StudentError`] and
//! turned into a status code by [`status_for`], so handlers never build error bodies themselves.

use crate::students::{NewStudent, Student, StudentError, StudentsApi};
use axum::{
    Json, Router, async_trait,
    body::Bytes,
    extract::{FromRequestParts, Path, State},
    http::{HeaderValue, Method, StatusCode, header, request::Parts},
    response::{Html, IntoResponse, Response},
    routing::{delete, get},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};

const BANNER: &str = "<h1 style='text-align:center;color:teal;'>Supabase postgres server</h1>";

/// Build the HTTP router with CORS restricted to `allowed_origins`.
pub fn create_router<S>(service: Arc<S>, allowed_origins: &[String]) -> Router
where
    S: StudentsApi + 'static,
{
    Router::new()
        .route("/", get(root))
        .route(
            "/api/students",
            get(list_students::<S>).post(create_student::<S>),
        )
        .route("/api/students/:student_id", delete(delete_student::<S>))
        .layer(cors_layer(allowed_origins))
        .with_state(service)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            if origin == "*" {
                tracing::warn!("Ignoring wildcard CORS origin; credentials need explicit origins");
                return None;
            }
            match origin.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin, "Ignoring invalid CORS origin");
                    None
                }
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Uniform JSON body returned by every `/api` operation.
///
/// Absent fields are omitted: `count` only appears on listings, `message` on mutations,
/// `deleted_record` on deletes, and `error` only when `success` is false.
#[derive(Debug, Serialize)]
pub struct Envelope {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<EnvelopeData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deleted_record: Option<Student>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EnvelopeData {
    Many(Vec<Student>),
    One(Student),
}

impl Envelope {
    fn empty(success: bool) -> Self {
        Self {
            success,
            data: None,
            count: None,
            message: None,
            deleted_record: None,
            error: None,
        }
    }

    /// Successful listing; `count` always equals the number of rows.
    pub fn listing(students: Vec<Student>) -> Self {
        Self {
            count: Some(students.len()),
            data: Some(EnvelopeData::Many(students)),
            ..Self::empty(true)
        }
    }

    /// Successful insert echoing the stored row.
    pub fn created(student: Student) -> Self {
        Self {
            data: Some(EnvelopeData::One(student)),
            message: Some("Student created successfully".to_string()),
            ..Self::empty(true)
        }
    }

    /// Successful delete echoing the row as it was before removal.
    pub fn deleted(id: i64, record: Student) -> Self {
        Self {
            message: Some(format!("Student with ID {id} deleted successfully")),
            deleted_record: Some(record),
            ..Self::empty(true)
        }
    }

    /// Failed operation carrying a human-readable description.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::empty(false)
        }
    }
}

/// Map a failed operation to its HTTP status.
pub fn status_for(error: &StudentError) -> StatusCode {
    match error {
        StudentError::MissingFields | StudentError::InvalidTypes => StatusCode::BAD_REQUEST,
        StudentError::NotFound(_) => StatusCode::NOT_FOUND,
        StudentError::EmptyInsert | StudentError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn root() -> Html<&'static str> {
    Html(BANNER)
}

/// List every student.
async fn list_students<S>(State(service): State<Arc<S>>) -> Result<Json<Envelope>, ApiError>
where
    S: StudentsApi,
{
    let students = service.list_students().await?;
    tracing::info!(count = students.len(), "Listed students");
    Ok(Json(Envelope::listing(students)))
}

/// Validate the body and insert a new student.
///
/// The body is read as raw bytes so that missing, malformed, or non-object payloads all land in
/// the same validation path instead of being rejected by a typed extractor.
async fn create_student<S>(
    State(service): State<Arc<S>>,
    body: Bytes,
) -> Result<(StatusCode, Json<Envelope>), ApiError>
where
    S: StudentsApi,
{
    let student = NewStudent::from_body(&body)?;
    let created = service.create_student(student).await?;
    tracing::info!(id = ?created.id(), "Created student");
    Ok((StatusCode::CREATED, Json(Envelope::created(created))))
}

/// Delete a student by id.
async fn delete_student<S>(
    State(service): State<Arc<S>>,
    StudentId(id): StudentId,
) -> Result<Json<Envelope>, ApiError>
where
    S: StudentsApi,
{
    let record = service.delete_student(id).await?;
    tracing::info!(id, "Deleted student");
    Ok(Json(Envelope::deleted(id, record)))
}

/// Positive integer `:student_id` path segment.
///
/// Only plain decimal digits are accepted (no sign, no zero). Anything else answers a bare 404,
/// as if no route had matched, and never reaches the database.
struct StudentId(i64);

impl StudentId {
    fn parse(segment: &str) -> Option<Self> {
        if segment.is_empty() || !segment.bytes().all(|byte| byte.is_ascii_digit()) {
            return None;
        }
        segment.parse::<i64>().ok().filter(|id| *id > 0).map(Self)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for StudentId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(segment) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| StatusCode::NOT_FOUND)?;
        Self::parse(&segment).ok_or(StatusCode::NOT_FOUND)
    }
}

struct ApiError(StudentError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Student operation failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self.0, "Student request rejected");
        }
        (status, Json(Envelope::failure(self.0.to_string()))).into_response()
    }
}

impl From<StudentError> for ApiError {
    fn from(inner: StudentError) -> Self {
        Self(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supabase::SupabaseError;
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use serde_json::{Map, Value, json};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    struct InMemoryStudents {
        rows: Mutex<Vec<Student>>,
        next_id: Mutex<i64>,
        failure: Option<String>,
    }

    impl InMemoryStudents {
        fn new() -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                next_id: Mutex::new(1),
                failure: None,
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                failure: Some(message.to_string()),
                ..Self::new()
            }
        }

        fn check(&self) -> Result<(), StudentError> {
            match &self.failure {
                Some(message) => Err(StudentError::Store(SupabaseError::Api {
                    status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                    message: message.clone(),
                })),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl StudentsApi for InMemoryStudents {
        async fn list_students(&self) -> Result<Vec<Student>, StudentError> {
            self.check()?;
            Ok(self.rows.lock().await.clone())
        }

        async fn create_student(&self, student: NewStudent) -> Result<Student, StudentError> {
            self.check()?;
            let mut next_id = self.next_id.lock().await;
            let mut fields = Map::new();
            fields.insert("id".into(), json!(*next_id));
            fields.insert("name".into(), json!(student.name));
            fields.insert("age".into(), json!(student.age));
            let row = Student::from_fields(fields);
            *next_id += 1;
            self.rows.lock().await.push(row.clone());
            Ok(row)
        }

        async fn delete_student(&self, id: i64) -> Result<Student, StudentError> {
            self.check()?;
            let mut rows = self.rows.lock().await;
            let position = rows
                .iter()
                .position(|row| row.id() == Some(id))
                .ok_or(StudentError::NotFound(id))?;
            Ok(rows.remove(position))
        }
    }

    fn origins() -> Vec<String> {
        vec![
            "http://localhost:5173".to_string(),
            "http://localhost:4173".to_string(),
        ]
    }

    async fn send(
        router: &Router,
        method: Method,
        uri: &str,
        body: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if body.is_some() {
            request = request.header("content-type", "application/json");
        }
        let request = request
            .body(
                body.map(|text| Body::from(text.to_string()))
                    .unwrap_or_else(Body::empty),
            )
            .expect("request");

        let response = router
            .clone()
            .oneshot(request)
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, json)
    }

    #[test]
    fn status_mapping_covers_every_error() {
        assert_eq!(status_for(&StudentError::MissingFields), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&StudentError::InvalidTypes), StatusCode::BAD_REQUEST);
        assert_eq!(status_for(&StudentError::NotFound(3)), StatusCode::NOT_FOUND);
        assert_eq!(
            status_for(&StudentError::EmptyInsert),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_for(&StudentError::Store(SupabaseError::InvalidUrl("x".into()))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn student_id_accepts_only_positive_digits() {
        assert_eq!(StudentId::parse("42").map(|id| id.0), Some(42));
        assert_eq!(StudentId::parse("007").map(|id| id.0), Some(7));
        for segment in ["", "0", "-3", "+3", " 3", "3a", "1e3"] {
            assert!(StudentId::parse(segment).is_none(), "{segment:?}");
        }
    }

    #[tokio::test]
    async fn wildcard_origin_is_skipped_when_building_cors() {
        let router = create_router(
            Arc::new(InMemoryStudents::new()),
            &["*".to_string(), "http://localhost:5173".to_string()],
        );
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/students")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
    }

    #[test]
    fn failure_envelope_only_has_success_and_error() {
        let value = serde_json::to_value(Envelope::failure("boom")).expect("json");
        assert_eq!(value, json!({ "success": false, "error": "boom" }));
    }

    #[tokio::test]
    async fn root_serves_html_banner() {
        let router = create_router(Arc::new(InMemoryStudents::new()), &origins());
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(
            response.headers()[header::CONTENT_TYPE]
                .to_str()
                .expect("content type")
                .starts_with("text/html")
        );
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(&bytes[..], BANNER.as_bytes());
    }

    #[tokio::test]
    async fn create_then_list_reports_matching_count() {
        let router = create_router(Arc::new(InMemoryStudents::new()), &origins());

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/students",
            Some(r#"{"name":"Alice","age":20}"#),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(
            body,
            json!({
                "success": true,
                "data": { "id": 1, "name": "Alice", "age": 20 },
                "message": "Student created successfully"
            })
        );

        send(
            &router,
            Method::POST,
            "/api/students",
            Some(r#"{"name":"Bob","age":22}"#),
        )
        .await;

        let (status, body) = send(&router, Method::GET, "/api/students", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"].as_array().expect("array").len(), 2);
        assert!(body.get("message").is_none());
    }

    #[tokio::test]
    async fn create_rejects_missing_and_mistyped_fields() {
        let service = Arc::new(InMemoryStudents::new());
        let router = create_router(service.clone(), &origins());

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/students",
            Some(r#"{"name":"A"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({ "success": false, "error": "Name and age are required" })
        );

        let (status, body) = send(&router, Method::POST, "/api/students", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Name and age are required");

        let (status, body) = send(
            &router,
            Method::POST,
            "/api/students",
            Some(r#"{"name":"A","age":"twenty"}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "success": false,
                "error": "Name must be a string and age must be an integer"
            })
        );

        assert!(service.rows.lock().await.is_empty());
    }

    #[tokio::test]
    async fn delete_echoes_record_and_repeats_as_not_found() {
        let router = create_router(Arc::new(InMemoryStudents::new()), &origins());
        send(
            &router,
            Method::POST,
            "/api/students",
            Some(r#"{"name":"Alice","age":20}"#),
        )
        .await;

        let (status, body) = send(&router, Method::DELETE, "/api/students/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "message": "Student with ID 1 deleted successfully",
                "deleted_record": { "id": 1, "name": "Alice", "age": 20 }
            })
        );

        let (_, listing) = send(&router, Method::GET, "/api/students", None).await;
        assert_eq!(listing["count"], 0);

        for _ in 0..2 {
            let (status, body) = send(&router, Method::DELETE, "/api/students/1", None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(
                body,
                json!({ "success": false, "error": "Student with ID 1 not found" })
            );
        }
    }

    #[tokio::test]
    async fn non_positive_or_non_integer_ids_are_not_routed() {
        let service = Arc::new(InMemoryStudents::failing("should not be called"));
        let router = create_router(service, &origins());

        for uri in [
            "/api/students/abc",
            "/api/students/1.5",
            "/api/students/-1",
            "/api/students/0",
            "/api/students/+5",
            "/api/students/99999999999999999999",
        ] {
            let (status, body) = send(&router, Method::DELETE, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
            assert_eq!(body, Value::Null);
        }
    }

    #[tokio::test]
    async fn store_failures_surface_raw_error_text() {
        let service = Arc::new(InMemoryStudents::failing("connection reset"));
        let router = create_router(service, &origins());

        let (status, body) = send(&router, Method::GET, "/api/students", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(
            body["error"],
            "Database request failed (500 Internal Server Error): connection reset"
        );

        let (status, _) = send(
            &router,
            Method::POST,
            "/api/students",
            Some(r#"{"name":"A","age":1}"#),
        )
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let (status, _) = send(&router, Method::DELETE, "/api/students/4", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn cors_preflight_allows_configured_origin_with_credentials() {
        let router = create_router(Arc::new(InMemoryStudents::new()), &origins());
        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/students/1")
                    .header(header::ORIGIN, "http://localhost:5173")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "DELETE")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "http://localhost:5173"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .expect("methods");
        assert!(methods.contains("DELETE"));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/students")
                    .header(header::ORIGIN, "http://evil.example")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");
        assert!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .is_none()
        );
    }
}
