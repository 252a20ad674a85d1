/// HTTP server with a WebSocket endpoint serving table views
use actix_web::{middleware, web, App, Error, HttpRequest, HttpResponse, HttpServer};
use actix_web_actors::ws;

use crate::websocket::{AppState, TableWebSocket};

/// WebSocket endpoint handler
async fn ws_index(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let resp = ws::start(TableWebSocket::new(state), &req, stream)?;
    Ok(resp)
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let datasets: Vec<String> = {
        let datasets = state.datasets.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<String> = datasets.keys().cloned().collect();
        names.sort();
        names
    };
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "message": "TableView WebSocket server is running",
        "datasets": datasets,
    }))
}

/// Start the HTTP server with WebSocket support
pub async fn run_server(host: &str, port: u16) -> std::io::Result<()> {
    run_server_with_state(host, port, AppState::new()).await
}

pub async fn run_server_with_state(host: &str, port: u16, state: AppState) -> std::io::Result<()> {
    let state = web::Data::new(state);

    log::info!("TableView WebSocket server");
    log::info!("WebSocket: ws://{}:{}/ws", host, port);
    log::info!("Health check: http://{}:{}/health", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            // CORS for development
            .wrap(
                actix_cors::Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/ws", web::get().to(ws_index))
            .route("/health", web::get().to(health_check))
    })
    .bind((host, port))?
    .run()
    .await
}
