use axum::{routing::get, routing::post, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::calibration::CalibrationRegistry;
use crate::config::Config;
use crate::station::StationCatalog;

use super::api::mapping as mapping_handlers;
use super::api::stations as station_handlers;
use super::api_doc::ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<StationCatalog>,
    pub registry: Arc<CalibrationRegistry>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/stations", get(station_handlers::list_stations))
        .route("/api/map", post(mapping_handlers::map_track))
        .route("/api/mask", post(mapping_handlers::mask_track))
        // OpenAPI / Swagger
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        // Middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_server(
    config: Config,
    catalog: StationCatalog,
    registry: CalibrationRegistry,
) -> std::io::Result<()> {
    let bind_addr = config.web.bind.clone();
    log::info!(
        "Serving {} stations ({} calibrated)",
        catalog.len(),
        registry.len()
    );

    let state = AppState {
        config: Arc::new(config),
        catalog: Arc::new(catalog),
        registry: Arc::new(registry),
    };
    let app = router(state);

    log::info!("Starting server on {}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::test_support::rank_registry;

    /// RANK calibrated, GILL only in the catalog.
    pub fn test_state() -> AppState {
        let config = Config::from_yaml(
            r#"
stations:
  - { array: REGO, code: RANK, latitude_deg: 62.82, longitude_deg: -92.11, altitude_km: 0.03 }
  - { array: THEMIS, code: GILL, latitude_deg: 56.38, longitude_deg: -94.64 }
"#,
        )
        .unwrap();
        let catalog = config.catalog().unwrap();
        AppState {
            config: Arc::new(config),
            catalog: Arc::new(catalog),
            registry: Arc::new(rank_registry()),
        }
    }

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/api/stations", "/api/map", "/api/mask"] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn router_builds() {
        let _ = router(test_state());
    }
}
