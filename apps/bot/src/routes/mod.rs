pub mod health;

use std::net::SocketAddr;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::Vacancy;
use crate::state::AppState;
use crate::store::vacancies;

/// GET /vacancies
/// The finder's last saved output.
async fn vacancies_handler(State(state): State<AppState>) -> Result<Json<Vec<Vacancy>>, AppError> {
    let path = state.paths.vacancies_file();
    if !path.exists() {
        return Err(AppError::NotFound(format!("{} not found", path.display())));
    }
    Ok(Json(vacancies::load(&path)))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/vacancies", get(vacancies_handler))
        .with_state(state)
}

/// Serves the status routes in the background.
pub fn spawn_status_server(state: AppState, port: u16) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let app = build_router(state).layer(TraceLayer::new_for_http());
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = match tokio::net::TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Status server could not bind {addr}: {e}");
                return;
            }
        };
        info!("Status server listening on {addr}");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Status server stopped: {e}");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::testing::{test_app, FakeChat};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_reports_counters() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_app(dir.path(), &FakeChat::default());
        state
            .store
            .lock()
            .await
            .sent
            .mark("https://hh.ru/vacancy/1")
            .unwrap();

        let response = build_router(state)
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["sent"], 1);
        assert_eq!(json["subscribers"], 0);
        assert_eq!(json["fresh"], 0);
    }

    #[tokio::test]
    async fn test_vacancies_missing_file_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_app(dir.path(), &FakeChat::default());

        let response = build_router(state)
            .oneshot(Request::get("/vacancies").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_vacancies_lists_saved_postings() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_app(dir.path(), &FakeChat::default());
        let saved = vec![Vacancy {
            title: "Product Manager".to_string(),
            url: "https://hh.ru/vacancy/1".to_string(),
            ..Default::default()
        }];
        vacancies::save(&state.paths.vacancies_file(), &saved).unwrap();

        let response = build_router(state)
            .oneshot(Request::get("/vacancies").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json[0]["title"], "Product Manager");
    }
}
