use anyhow::Context;
use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::NaiveDate;
use cinema_booking::{BookingError, CinemaHallId, Metrics, MovieId, Result, ServiceConfig, ShowId};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Instant};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

mod service;

use service::BookingService;

#[derive(Parser, Debug)]
#[command(name = "booking-service")]
#[command(about = "Movie ticket booking REST API")]
struct Args {
    /// Port to listen on, overrides the config file
    #[arg(short = 'p', long = "port")]
    port: Option<u16>,

    /// Properties file to load, e.g. booking.dev.properties
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Extra properties file layered over the config file
    #[arg(long = "override-config")]
    override_config: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateMovieRequest {
    title: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateCinemaRequest {
    name: String,
    city: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateShowRequest {
    movie_id: MovieId,
    date: NaiveDate,
    time: String,
    total_seats: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CreateBookingRequest {
    show_id: ShowId,
    seat_count: u32,
}

#[derive(Debug, Deserialize)]
struct DateFilter {
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CinemaShowsQuery {
    movie_id: MovieId,
    date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CinemaSearchQuery {
    city: String,
    movie_id: MovieId,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

type ApiResult<T> = (StatusCode, Json<ApiResponse<T>>);

fn respond<T>(operation: &str, result: Result<T>) -> ApiResult<T> {
    match result {
        Ok(data) => (StatusCode::OK, Json(ApiResponse::success(data))),
        Err(e) => {
            error!("Error {}: {}", operation, e);
            (status_for(&e), Json(ApiResponse::error(e.to_string())))
        }
    }
}

fn status_for(error: &BookingError) -> StatusCode {
    match error {
        e if e.is_not_found() => StatusCode::NOT_FOUND,
        BookingError::Capacity { .. }
        | BookingError::InvalidCancellation { .. }
        | BookingError::InvalidState(_) => StatusCode::CONFLICT,
        BookingError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut config = load_config(&args)?;
    if let Some(port) = args.port {
        config.port = port;
    }

    info!("Starting {} on port {}", config.application_id, config.port);
    info!(
        "Payment delay: {}ms, default seats per show: {}",
        config.payment_delay_ms, config.default_total_seats
    );

    let metrics = Arc::new(Metrics::new()?);
    let booking_service = BookingService::new(&config, metrics);

    let app = Router::new()
        .route("/movies", post(add_movie).get(list_movies))
        .route("/cinemas", post(add_cinema).get(list_cinemas))
        .route("/cinemas/search", get(search_cinemas))
        .route("/cinemas/:cinema_id/shows", post(add_show).get(shows_in_cinema))
        .route("/shows", get(list_shows))
        .route("/bookings", post(create_booking).get(list_bookings))
        .route("/bookings/:index/confirm", post(confirm_booking))
        .route("/bookings/:index/cancel", post(cancel_booking))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn_with_state(booking_service.clone(), track_request)),
        )
        .with_state(booking_service);

    let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.listen_addr, config.port))?;
    info!("Booking Service listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Booking Service stopped");
    Ok(())
}

fn load_config(args: &Args) -> Result<ServiceConfig> {
    use cinema_booking::{merge_properties, parse_properties_file};

    let mut config = match &args.config {
        Some(path) => {
            info!("Config file: {:?}", path);
            parse_properties_file(path, "booking-service")?
        }
        None => ServiceConfig::default(),
    };

    if let Some(path) = &args.override_config {
        info!("Loading override config from: {:?}", path);
        config = merge_properties(config, path)?;
    }

    for key in config.additional_properties.keys() {
        warn!("Ignoring unknown config property: {}", key);
    }

    config.apply_env_overrides()
}

async fn track_request(State(service): State<BookingService>, req: Request, next: Next) -> Response {
    let start = Instant::now();
    let response = next.run(req).await;
    service.metrics().record_request(start.elapsed());
    response
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to setup SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), initiating graceful shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}

async fn add_movie(
    State(service): State<BookingService>,
    Json(request): Json<CreateMovieRequest>,
) -> ApiResult<cinema_booking::Movie> {
    respond("adding movie", service.add_movie(request).await)
}

async fn list_movies(State(service): State<BookingService>) -> ApiResult<Vec<cinema_booking::Movie>> {
    respond("listing movies", Ok(service.movies().await))
}

async fn add_cinema(
    State(service): State<BookingService>,
    Json(request): Json<CreateCinemaRequest>,
) -> ApiResult<cinema_booking::CinemaHall> {
    respond("adding cinema", service.add_cinema_hall(request).await)
}

async fn list_cinemas(State(service): State<BookingService>) -> ApiResult<Vec<cinema_booking::CinemaHall>> {
    respond("listing cinemas", Ok(service.cinema_halls().await))
}

async fn search_cinemas(
    State(service): State<BookingService>,
    Query(query): Query<CinemaSearchQuery>,
) -> ApiResult<Vec<cinema_booking::CinemaHall>> {
    respond(
        "searching cinemas",
        service.search_cinemas(&query.city, query.movie_id).await,
    )
}

async fn add_show(
    State(service): State<BookingService>,
    Path(cinema_id): Path<CinemaHallId>,
    Json(request): Json<CreateShowRequest>,
) -> ApiResult<service::ShowView> {
    respond("adding show", service.add_show(cinema_id, request).await)
}

async fn shows_in_cinema(
    State(service): State<BookingService>,
    Path(cinema_id): Path<CinemaHallId>,
    Query(query): Query<CinemaShowsQuery>,
) -> ApiResult<Vec<service::ShowView>> {
    respond(
        "listing cinema shows",
        service
            .shows_of_movie_in_cinema(cinema_id, query.movie_id, query.date)
            .await,
    )
}

async fn list_shows(
    State(service): State<BookingService>,
    Query(filter): Query<DateFilter>,
) -> ApiResult<Vec<service::ShowView>> {
    respond("listing shows", service.all_shows(filter.date).await)
}

async fn create_booking(
    State(service): State<BookingService>,
    Json(request): Json<CreateBookingRequest>,
) -> ApiResult<service::PaymentStarted> {
    respond("creating booking", service.create_booking(request).await)
}

async fn list_bookings(State(service): State<BookingService>) -> ApiResult<Vec<service::BookingView>> {
    respond("listing bookings", service.bookings().await)
}

async fn confirm_booking(
    State(service): State<BookingService>,
    Path(index): Path<usize>,
) -> ApiResult<service::ConfirmOutcome> {
    respond("confirming booking", service.confirm_booking(index).await)
}

async fn cancel_booking(
    State(service): State<BookingService>,
    Path(index): Path<usize>,
) -> ApiResult<service::BookingView> {
    respond("cancelling booking", service.cancel_booking(index).await)
}

async fn health_check() -> Json<ApiResponse<String>> {
    Json(ApiResponse::success("OK".to_string()))
}

async fn metrics_endpoint(State(service): State<BookingService>) -> Response {
    match service.metrics().export() {
        Ok(metrics_data) => metrics_data.into_response(),
        Err(e) => {
            error!("Failed to export metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to export metrics").into_response()
        }
    }
}
