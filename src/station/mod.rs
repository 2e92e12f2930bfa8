mod catalog;
mod error;
mod ground_station;

pub use catalog::{ImagerArray, StationCatalog, StationInfo};
pub use error::StationError;
pub use ground_station::{
    ecef_to_geodetic, geodetic_to_ecef_km, great_circle_km, GroundStation, LookAngles,
    EARTH_RADIUS_KM,
};
