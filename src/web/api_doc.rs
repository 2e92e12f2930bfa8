use utoipa::OpenApi;

use super::api::error::ErrorResponse;
use super::api::mapping::{MapRequest, MapResponse, MaskRequest, MaskResponse, MaskStep};
use super::api::stations::{StationEntry, StationsResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::stations::list_stations,
        super::api::mapping::map_track,
        super::api::mapping::mask_track,
    ),
    components(
        schemas(
            StationEntry,
            StationsResponse,
            MapRequest,
            MapResponse,
            MaskRequest,
            MaskResponse,
            MaskStep,
            ErrorResponse,
            crate::station::StationInfo,
            crate::track::TrackPoint,
            crate::mapper::AzEl,
            crate::mapper::Pixel,
            crate::mask::PixelBounds,
        )
    ),
    info(
        title = "ASI Overlay API",
        description = "Map satellite ground tracks into all-sky imager frames",
        version = "0.1.0"
    ),
    tags(
        (name = "stations", description = "Configured imager stations"),
        (name = "mapping", description = "Track to pixel mapping and box masks")
    )
)]
pub struct ApiDoc;
