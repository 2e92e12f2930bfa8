use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::mapper::{AzEl, Pixel, SkyMapper};
use crate::mask::PixelBounds;
use crate::track::{GroundTrack, TrackPoint};
use crate::web::api::error::{ApiError, ApiResult, ErrorResponse};
use crate::web::server::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct MapRequest {
    pub station: String,
    pub track: Vec<TrackPoint>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MapResponse {
    pub station: String,
    pub azel: Vec<AzEl>,
    /// `null` where the sample is outside the camera's field of view.
    pub pixels: Vec<Option<Pixel>>,
    pub in_frame: usize,
}

#[utoipa::path(
    post,
    path = "/api/map",
    tag = "mapping",
    request_body = MapRequest,
    responses(
        (status = 200, description = "Look angles and pixels of every track sample", body = MapResponse),
        (status = 400, description = "Malformed track", body = ErrorResponse),
        (status = 404, description = "No calibration for the station", body = ErrorResponse)
    )
)]
pub async fn map_track(
    State(state): State<AppState>,
    Json(request): Json<MapRequest>,
) -> ApiResult<Json<MapResponse>> {
    let station = request.station;
    let track = GroundTrack::new(request.track);
    let (azel, pixels) = tokio::task::spawn_blocking({
        let station = station.clone();
        move || {
            SkyMapper::with_options(&state.registry, state.config.mapper_options())
                .map_to_pixels(&station, &track)
        }
    })
    .await??;

    Ok(Json(MapResponse {
        station: station.to_uppercase(),
        in_frame: pixels.iter().filter(|p| p.is_some()).count(),
        azel,
        pixels,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MaskRequest {
    pub station: String,
    pub track: Vec<TrackPoint>,
    /// Defaults to the configured box size.
    #[serde(default)]
    pub width_km: Option<f64>,
    #[serde(default)]
    pub height_km: Option<f64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MaskStep {
    pub index: usize,
    /// `null` when the box center is out of frame.
    pub bounds: Option<PixelBounds>,
    pub pixel_count: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MaskResponse {
    pub station: String,
    pub width_km: f64,
    pub height_km: f64,
    pub rows: usize,
    pub cols: usize,
    pub steps: Vec<MaskStep>,
}

#[utoipa::path(
    post,
    path = "/api/mask",
    tag = "mapping",
    request_body = MaskRequest,
    responses(
        (status = 200, description = "Pixel rectangle of the box at every track sample", body = MaskResponse),
        (status = 400, description = "Malformed track or box size", body = ErrorResponse),
        (status = 404, description = "No calibration for the station", body = ErrorResponse)
    )
)]
pub async fn mask_track(
    State(state): State<AppState>,
    Json(request): Json<MaskRequest>,
) -> ApiResult<Json<MaskResponse>> {
    let [default_width, default_height] = state.config.mapping.default_box_km;
    let width_km = request.width_km.unwrap_or(default_width);
    let height_km = request.height_km.unwrap_or(default_height);

    let station = request.station;
    let track = GroundTrack::new(request.track);
    let (rows, cols, bounds) = tokio::task::spawn_blocking({
        let station = station.clone();
        move || {
            let mapper = SkyMapper::with_options(&state.registry, state.config.mapper_options());
            let (rows, cols) = mapper.calibration(&station)?.shape();
            let bounds = mapper.mask_bounds(&station, &track, (width_km, height_km))?;
            Ok::<_, ApiError>((rows, cols, bounds))
        }
    })
    .await??;

    let steps = bounds
        .into_iter()
        .enumerate()
        .map(|(index, bounds)| MaskStep {
            index,
            bounds,
            pixel_count: bounds.map_or(0, |b| b.pixel_count()),
        })
        .collect();

    Ok(Json(MaskResponse {
        station: station.to_uppercase(),
        width_km,
        height_km,
        rows,
        cols,
        steps,
    }))
}
