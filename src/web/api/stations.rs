use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::station::StationInfo;
use crate::web::server::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct StationEntry {
    #[serde(flatten)]
    pub station: StationInfo,
    pub calibrated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_cols: Option<usize>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StationsResponse {
    pub stations: Vec<StationEntry>,
}

#[utoipa::path(
    get,
    path = "/api/stations",
    tag = "stations",
    responses(
        (status = 200, description = "Configured stations and their calibration status", body = StationsResponse)
    )
)]
pub async fn list_stations(State(state): State<AppState>) -> Json<StationsResponse> {
    let stations = state
        .catalog
        .all()
        .iter()
        .map(|station| {
            let shape = state.registry.get(&station.code).ok().map(|r| r.shape());
            StationEntry {
                station: station.clone(),
                calibrated: shape.is_some(),
                frame_rows: shape.map(|s| s.0),
                frame_cols: shape.map(|s| s.1),
            }
        })
        .collect();

    Json(StationsResponse { stations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::server::tests::test_state;

    #[tokio::test]
    async fn lists_catalog_with_calibration_status() {
        let Json(response) = list_stations(State(test_state())).await;
        assert_eq!(response.stations.len(), 2);

        let rank = &response.stations[0];
        assert_eq!(rank.station.code, "RANK");
        assert!(rank.calibrated);
        assert_eq!(rank.frame_rows, Some(256));

        let gill = &response.stations[1];
        assert!(!gill.calibrated);
        assert_eq!(gill.frame_cols, None);
    }
}
