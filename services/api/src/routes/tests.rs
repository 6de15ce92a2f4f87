use super::*;
use crate::infra::{InMemoryApplicantRepository, InMemoryUserRepository};
use axum::body::Body;
use axum::http::Request;
use intern_intake::auth::{TokenIssuer, UserAccount, UserId, UserRole};
use intern_intake::forms::FormAssembler;
use intern_intake::mail::{AttachmentResolver, BulkPolicy, MessageId, OutboundEmail};
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::Value;
use std::sync::atomic::AtomicBool;
use std::sync::Mutex;
use std::time::Duration;
use tower::ServiceExt;

#[derive(Default)]
struct FakeTransport {
    refuse_verify: bool,
    failing_recipient: Option<String>,
    sent: Mutex<Vec<String>>,
}

impl MailTransport for FakeTransport {
    async fn verify(&self) -> Result<(), MailError> {
        if self.refuse_verify {
            Err(MailError::Authentication("535 rejected".to_string()))
        } else {
            Ok(())
        }
    }

    async fn send(&self, email: OutboundEmail) -> Result<MessageId, MailError> {
        let to = email.to.to_string();
        if self.failing_recipient.as_deref() == Some(to.as_str()) {
            return Err(MailError::Rejected("550 no such user".to_string()));
        }
        let mut sent = self.sent.lock().expect("sent mutex poisoned");
        sent.push(to);
        Ok(MessageId(format!("<{}@fake>", sent.len())))
    }
}

fn forms() -> AttachmentResolver {
    let dir = std::env::temp_dir();
    AttachmentResolver::new(
        FormAssembler::from_font_path(dir.join("intern-intake-api-no-font.ttf")),
        dir.join("intern-intake-api-no-template.pdf"),
    )
}

fn dispatcher(transport: FakeTransport) -> Mailer<FakeTransport> {
    Some(Arc::new(MailDispatcher::new(
        Arc::new(transport),
        forms(),
        BulkPolicy {
            batch_size: 5,
            pause: Duration::ZERO,
        },
    )))
}

fn state(ready: bool, email_configured: bool) -> AppState {
    AppState {
        readiness: Arc::new(AtomicBool::new(ready)),
        metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
        email_configured,
    }
}

struct Harness {
    router: Router,
    issuer: Arc<TokenIssuer>,
}

fn harness(mailer: Mailer<FakeTransport>, ready: bool) -> Harness {
    let issuer = Arc::new(TokenIssuer::new("api-tests", 1));
    let email_configured = mailer.is_some();
    let applicants = Arc::new(ApplicantService::new(
        Arc::new(InMemoryApplicantRepository::default()),
        forms(),
    ));
    let auth = Arc::new(AuthService::new(
        Arc::new(InMemoryUserRepository::default()),
        issuer.clone(),
    ));

    let router = api_router(applicants, auth, mailer)
        .layer(Extension(issuer.clone()))
        .layer(Extension(state(ready, email_configured)));
    Harness { router, issuer }
}

impl Harness {
    fn token(&self) -> String {
        let account = UserAccount {
            id: UserId("usr-api".to_string()),
            email: "hr@ongc.co.in".to_string(),
            password_hash: String::new(),
            name: "HR Manager".to_string(),
            role: UserRole::HrManager,
            department: "Human Resources".to_string(),
            employee_id: "HR001".to_string(),
            is_active: true,
            last_login: None,
            created_at: Utc::now(),
        };
        self.issuer.issue(&account).expect("token").token
    }

    async fn post(&self, uri: &str, body: Value, authorized: bool) -> (StatusCode, Value) {
        let mut request = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if authorized {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", self.token()));
        }
        let response = self
            .router
            .clone()
            .oneshot(
                request
                    .body(Body::from(serde_json::to_vec(&body).expect("encode")))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json payload"))
    }
}

fn email(to: &str) -> Value {
    json!({ "to": to, "subject": "Internship update", "html": "<p>Hello</p>" })
}

#[tokio::test]
async fn health_reports_email_configuration() {
    let harness = harness(None, true);
    let response = harness
        .router
        .clone()
        .oneshot(Request::get("/api/health").body(Body::empty()).expect("request"))
        .await
        .expect("route executes");

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    let payload: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(payload["status"], json!("OK"));
    assert_eq!(payload["email"], json!("Not Configured"));
    assert_eq!(payload["storage"], json!("in-memory"));
}

#[tokio::test]
async fn readiness_reflects_startup_flag() {
    let response = harness(None, false)
        .router
        .oneshot(Request::get("/ready").body(Body::empty()).expect("request"))
        .await
        .expect("route executes");
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn send_email_requires_authentication() {
    let harness = harness(dispatcher(FakeTransport::default()), true);
    let (status, _) = harness
        .post("/api/send-email", email("asha@example.com"), false)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn send_email_validates_before_checking_configuration() {
    let harness = harness(None, true);

    let (status, payload) = harness
        .post("/api/send-email", json!({ "to": "asha@example.com" }), true)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        payload["message"],
        json!("Missing required fields: to, subject, and html/text content")
    );

    let (status, payload) = harness
        .post("/api/send-email", email("asha@example.com"), true)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(payload["message"]
        .as_str()
        .unwrap_or_default()
        .starts_with("Email configuration not found"));
}

#[tokio::test]
async fn send_email_returns_message_id() {
    let harness = harness(dispatcher(FakeTransport::default()), true);
    let (status, payload) = harness
        .post("/api/send-email", email("asha@example.com"), true)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["messageId"], json!("<1@fake>"));
}

#[tokio::test]
async fn verification_failure_is_configuration_error() {
    let harness = harness(
        dispatcher(FakeTransport {
            refuse_verify: true,
            ..FakeTransport::default()
        }),
        true,
    );
    let (status, payload) = harness
        .post("/api/send-email", email("asha@example.com"), true)
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        payload["message"],
        json!("Email service configuration error. Please check your email credentials.")
    );
}

#[tokio::test]
async fn bulk_send_reports_summary() {
    let harness = harness(
        dispatcher(FakeTransport {
            failing_recipient: Some("intern4@example.com".to_string()),
            ..FakeTransport::default()
        }),
        true,
    );
    let emails: Vec<Value> = (1..=7)
        .map(|n| email(&format!("intern{n}@example.com")))
        .collect();

    let (status, payload) = harness
        .post("/api/send-bulk-emails", json!({ "emails": emails }), true)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["batches"], json!(2));
    assert_eq!(payload["summary"], json!({ "total": 7, "sent": 6, "failed": 1 }));
    assert_eq!(payload["results"][3]["success"], json!(false));
    assert_eq!(
        payload["message"],
        json!("Bulk email sending completed. 6 sent, 1 failed.")
    );
}

#[tokio::test]
async fn bulk_send_rejects_empty_list() {
    let harness = harness(dispatcher(FakeTransport::default()), true);
    let (status, payload) = harness
        .post("/api/send-bulk-emails", json!({ "emails": [] }), true)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["message"], json!("Invalid emails array provided"));
}

#[tokio::test]
async fn bulk_send_survives_malformed_entries() {
    let harness = harness(dispatcher(FakeTransport::default()), true);
    let emails = json!([
        email("intern1@example.com"),
        { "to": 12345, "subject": "Internship update", "html": "<p>Hello</p>" },
        {
            "to": "intern3@example.com",
            "subject": "Internship update",
            "html": "<p>Hello</p>",
            "attachTemplate": true,
            "applicantData": "oops"
        }
    ]);

    let (status, payload) = harness
        .post("/api/send-bulk-emails", json!({ "emails": emails }), true)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["summary"], json!({ "total": 3, "sent": 2, "failed": 1 }));
    assert_eq!(payload["results"][1]["to"], json!("12345"));
    assert_eq!(payload["results"][1]["success"], json!(false));
    assert_eq!(payload["results"][2]["success"], json!(true));
}

#[tokio::test]
async fn bulk_send_rejects_non_array_emails() {
    let harness = harness(dispatcher(FakeTransport::default()), true);
    let (status, payload) = harness
        .post("/api/send-bulk-emails", json!({ "emails": "intern1@example.com" }), true)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["message"], json!("Invalid emails array provided"));
}

#[tokio::test]
async fn send_email_tolerates_malformed_applicant_data() {
    let harness = harness(dispatcher(FakeTransport::default()), true);
    let body = json!({
        "to": "asha@example.com",
        "subject": "Selected",
        "html": "<p>Welcome</p>",
        "attachTemplate": true,
        "applicantData": "oops"
    });

    let (status, payload) = harness.post("/api/send-email", body, true).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["success"], json!(true));
}

#[tokio::test]
async fn test_email_is_public_but_needs_html() {
    let harness = harness(dispatcher(FakeTransport::default()), true);

    let (status, _) = harness
        .post(
            "/api/test-email",
            json!({ "to": "asha@example.com", "subject": "Ping", "text": "plain" }),
            false,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, payload) = harness
        .post("/api/test-email", email("asha@example.com"), false)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["message"], json!("Test email sent successfully"));
}

#[tokio::test]
async fn legacy_routes_redirect_authenticated_callers() {
    let harness = harness(None, true);

    let anonymous = harness
        .router
        .clone()
        .oneshot(Request::get("/api/approved").body(Body::empty()).expect("request"))
        .await
        .expect("route executes");
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let response = harness
        .router
        .clone()
        .oneshot(
            Request::get("/api/shortlisted")
                .header(header::AUTHORIZATION, format!("Bearer {}", harness.token()))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers().get(header::LOCATION).map(|value| value.as_bytes()),
        Some(b"/api/applicants/shortlisted".as_slice())
    );
}
