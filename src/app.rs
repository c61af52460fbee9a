use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::ServerArgs;
use crate::dashboard::{Dashboard, DashboardRequest, build_dashboard, export_file_name, filtered_detail};
use crate::downloader;
use crate::error::LoadError;
use crate::filter::{DetailFilter, Selection};
use crate::graph::{ChartKind, create_graph};
use crate::loader::{RecordSet, Upload, load_records};
use crate::schema::TemplateSchema;

/// Read-only settings shared by every request. Uploads and derived records
/// live only for the request that carried them.
pub struct AppState {
    example_dataset: Option<PathBuf>,
    schema: TemplateSchema,
    default_top_n: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: Option<String>,
    failures: Vec<String>,
}

enum AppError {
    BadRequest(String),
    NoData(LoadError),
    Internal(String),
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::BadRequest(format!("invalid upload: {}", e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, failures) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message, Vec::new()),
            AppError::NoData(error) => {
                let message = error.to_string();
                let LoadError::NoData { failures } = error;
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    message,
                    failures.iter().map(|f| f.to_string()).collect(),
                )
            }
            AppError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message, Vec::new()),
        };
        let body = ErrorResponse {
            status: "error".to_string(),
            message: Some(message),
            failures,
        };
        (status, Json(body)).into_response()
    }
}

impl AppState {
    pub fn new(example_dataset: Option<PathBuf>, default_top_n: usize) -> Self {
        AppState {
            example_dataset,
            schema: TemplateSchema::default(),
            default_top_n,
        }
    }
}

/// All dashboard routes, with `static_dir` served under `/static` and request
/// bodies capped at `body_limit` bytes.
pub fn router(state: Arc<AppState>, static_dir: &std::path::Path, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(serve_dashboard))
        .route("/api/dashboard", post(dashboard_json))
        .route("/api/export/csv", post(export_csv))
        .route("/api/export/xlsx", post(export_xlsx))
        .route("/api/chart/:kind", post(chart_png))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

pub async fn run(args: ServerArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Setup app state
    let app_state = Arc::new(AppState::new(args.example_dataset.clone(), args.top_n));
    let app = router(app_state, &args.static_dir, args.body_limit());

    // Start server
    let listener = TcpListener::bind(&args.bind).await?;
    info!("Listening on http://{}", args.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_dashboard() -> Html<&'static str> {
    Html(include_str!("../static/index.html"))
}

/// One render pass worth of input: the uploaded workbooks and the selections.
struct RenderInput {
    uploads: Vec<Upload>,
    request: DashboardRequest,
}

/// Collect `files`, `scope`, `category` and `top_n` fields from the form.
async fn read_form(mut multipart: Multipart, default_top_n: usize) -> Result<RenderInput, AppError> {
    let mut uploads = Vec::new();
    let mut scopes = Vec::new();
    let mut categories = Vec::new();
    let mut top_n = default_top_n;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("unknown").to_string();
        match field_name.as_str() {
            "files" => {
                let name = field.file_name().unwrap_or("upload.xlsx").to_string();
                let bytes = field.bytes().await?.to_vec();
                // Browsers send an empty part when no file was chosen
                if !bytes.is_empty() {
                    uploads.push(Upload { name, bytes });
                }
            }
            "scope" => scopes.push(field.text().await?),
            "category" => categories.push(field.text().await?),
            "top_n" => {
                let text = field.text().await?;
                top_n = text
                    .trim()
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("top_n must be a number, got '{}'", text)))?;
            }
            other => warn!("Ignoring unexpected form field '{}'", other),
        }
    }

    Ok(RenderInput {
        uploads,
        request: DashboardRequest {
            filter: DetailFilter {
                scopes: Selection::from_values(scopes),
                categories: Selection::from_values(categories),
            },
            top_n,
        },
    })
}

fn render(state: &AppState, input: &RenderInput) -> Result<(RecordSet, Dashboard), AppError> {
    let set = load_records(&input.uploads, state.example_dataset.as_deref(), &state.schema)
        .map_err(AppError::NoData)?;
    let dashboard = build_dashboard(&set, &input.request)
        .ok_or_else(|| AppError::Internal("record set is empty".to_string()))?;
    Ok((set, dashboard))
}

async fn dashboard_json(State(state): State<Arc<AppState>>, multipart: Multipart) -> Result<Json<Dashboard>, AppError> {
    let input = read_form(multipart, state.default_top_n).await?;
    let (_, dashboard) = render(&state, &input)?;
    Ok(Json(dashboard))
}

fn attachment(content_type: &str, file_name: &str, body: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", file_name)),
        ],
        body,
    )
        .into_response()
}

async fn export_csv(State(state): State<Arc<AppState>>, multipart: Multipart) -> Result<Response, AppError> {
    let input = read_form(multipart, state.default_top_n).await?;
    let (set, _) = render(&state, &input)?;
    let record = set
        .latest()
        .ok_or_else(|| AppError::Internal("record set is empty".to_string()))?;

    let rows = filtered_detail(record, &input.request.filter);
    let csv = downloader::to_csv(&rows);
    Ok(attachment(
        "text/csv; charset=utf-8",
        &export_file_name(record, "csv"),
        csv.into_bytes(),
    ))
}

async fn export_xlsx(State(state): State<Arc<AppState>>, multipart: Multipart) -> Result<Response, AppError> {
    let input = read_form(multipart, state.default_top_n).await?;
    let (set, _) = render(&state, &input)?;
    let record = set
        .latest()
        .ok_or_else(|| AppError::Internal("record set is empty".to_string()))?;

    let rows = filtered_detail(record, &input.request.filter);
    let xlsx = downloader::to_xlsx(&rows).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(attachment(
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        &export_file_name(record, "xlsx"),
        xlsx,
    ))
}

async fn chart_png(
    Path(kind): Path<String>,
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let kind = ChartKind::from_name(&kind).ok_or_else(|| AppError::BadRequest(format!("unknown chart '{}'", kind)))?;
    let input = read_form(multipart, state.default_top_n).await?;
    let (_, dashboard) = render(&state, &input)?;

    let png = create_graph(kind, &dashboard).map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
