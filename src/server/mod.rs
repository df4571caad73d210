mod extract;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, patch, post},
    Router,
};

use crate::api::API;
use crate::server::handlers::{earnings, health, rides, vehicles};

pub type DynAPI = Arc<dyn API + Send + Sync>;

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/api/health", get(health::check))
        .route(
            "/api/driver/vehicles",
            get(vehicles::list).post(vehicles::create),
        )
        .route(
            "/api/driver/vehicles/:id",
            get(vehicles::find)
                .patch(vehicles::update)
                .delete(vehicles::delete),
        )
        .route(
            "/api/driver/vehicles/:id/active-ride",
            get(vehicles::has_active_ride),
        )
        .route("/api/driver/rides", get(rides::list).post(rides::create))
        .route(
            "/api/driver/rides/:id",
            get(rides::find).patch(rides::edit).delete(rides::delete),
        )
        .route("/api/driver/rides/:id/status", patch(rides::update_status))
        .route("/api/driver/rides/:id/book-seat", post(rides::book_seat))
        .route("/api/driver/history", get(rides::history))
        .route("/api/driver/earnings/summary", get(earnings::summary))
        .layer(Extension(api))
}

pub async fn serve<T: API + Sync + Send + 'static>(api: T, addr: SocketAddr) {
    let api = Arc::new(api) as DynAPI;
    let app = router(api);

    tracing::info!("listening on {}", addr);

    if let Err(err) = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!(error = %err, "server stopped");
    }
}
