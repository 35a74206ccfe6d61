use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryAnalysisRepository, InMemoryLawyerDirectory};
use crate::limiter::{limit_requests, RequestLimiter};
use crate::routes::with_workflow_routes;
use axum::http::{header, HeaderValue, Method};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use legal_expert::auth::TokenVerifier;
use legal_expert::config::{AppConfig, ServerConfig};
use legal_expert::error::AppError;
use legal_expert::telemetry;
use legal_expert::workflows::analysis::{CaseAnalysisService, ModelAssessmentClient};
use legal_expert::workflows::directory::{DirectoryImporter, ProBonoDirectoryService};
use legal_expert::workflows::model::MistralClient;
use legal_expert::workflows::triage::RiskTriage;
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

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
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let completions = Arc::new(MistralClient::from_config(&config.assessment)?);
    let directory = Arc::new(load_directory(&config)?);
    let analyses = Arc::new(InMemoryAnalysisRepository::default());

    let analysis_service = Arc::new(
        CaseAnalysisService::new(
            Arc::new(ModelAssessmentClient::from_config(
                completions.clone(),
                &config.assessment,
            )),
            directory.clone(),
            analyses,
        )
        .with_timeout(config.assessment.timeout),
    );
    let directory_service = Arc::new(ProBonoDirectoryService::new(directory));
    let triage = Arc::new(RiskTriage::new(completions.clone()));

    let verifier = TokenVerifier::from_secret(config.auth.jwt_secret()?);
    let limiter = RequestLimiter::new(&config.rate_limit)?;

    let app = with_workflow_routes(analysis_service, directory_service, triage)
        .layer(Extension(verifier))
        .layer(Extension(app_state))
        .layer(axum::middleware::from_fn_with_state(limiter, limit_requests))
        .layer(cors_layer(&config.server))
        .layer(TraceLayer::new_for_http())
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        environment = ?config.environment,
        %addr,
        model = %completions.model(),
        "legal expert api ready"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}

fn load_directory(config: &AppConfig) -> Result<InMemoryLawyerDirectory, AppError> {
    let Some(path) = config.directory.seed_csv.as_ref() else {
        return Ok(InMemoryLawyerDirectory::default());
    };

    let profiles = DirectoryImporter::from_path(path)?;
    let count = profiles.len();
    let directory = InMemoryLawyerDirectory::seeded(profiles).map_err(|err| {
        AppError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("directory seed rejected: {err}"),
        ))
    })?;
    info!(path = %path.display(), profiles = count, "pro-bono directory seeded");
    Ok(directory)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
}
