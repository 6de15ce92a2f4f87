use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryApplicantRepository, InMemoryUserRepository, STORAGE_BACKEND};
use crate::routes::{api_router, Mailer};
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use intern_intake::applicants::ApplicantService;
use intern_intake::auth::{AuthService, TokenIssuer};
use intern_intake::config::AppConfig;
use intern_intake::error::AppError;
use intern_intake::forms::FormAssembler;
use intern_intake::mail::{AttachmentResolver, BulkPolicy, MailDispatcher, SmtpMailTransport};
use intern_intake::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));

    let issuer = Arc::new(TokenIssuer::from_config(&config.auth));
    let auth_service = Arc::new(AuthService::new(
        Arc::new(InMemoryUserRepository::default()),
        issuer.clone(),
    ));
    seed_default_users(auth_service.clone()).await;

    let forms = AttachmentResolver::new(
        FormAssembler::from_font_path(config.forms.font_path.clone()),
        config.forms.template_path.clone(),
    );
    let applicant_service = Arc::new(ApplicantService::new(
        Arc::new(InMemoryApplicantRepository::default()),
        forms.clone(),
    ));

    let mailer: Mailer<SmtpMailTransport> = match SmtpMailTransport::from_config(&config.mail) {
        Ok(transport) => Some(Arc::new(MailDispatcher::new(
            Arc::new(transport),
            forms,
            BulkPolicy::from(&config.mail),
        ))),
        Err(err) => {
            warn!(error = %err, "outbound email disabled");
            None
        }
    };

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        email_configured: mailer.is_some(),
    };

    let app = api_router(applicant_service, auth_service, mailer)
        .layer(Extension(issuer))
        .layer(Extension(app_state))
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(CompressionLayer::new())
        .layer(cors_layer(&config.server.cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        storage = STORAGE_BACKEND,
        email = config.mail.is_configured(),
        font = %config.forms.font_path.display(),
        "internship intake service ready"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn seed_default_users(service: Arc<AuthService<InMemoryUserRepository>>) {
    match tokio::task::spawn_blocking(move || service.seed_defaults()).await {
        Ok(Ok(0)) => {}
        Ok(Ok(created)) => info!(created, "seeded default staff accounts"),
        Ok(Err(err)) => error!(error = %err, "error initializing staff accounts"),
        Err(err) => error!(error = %err, "staff account seeding task failed"),
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
