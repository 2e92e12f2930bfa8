use serde::Serialize;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LookAngles {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroundStation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

impl Default for GroundStation {
    fn default() -> Self {
        Self {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            altitude_km: 0.0,
        }
    }
}

impl GroundStation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_km,
        }
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        geodetic_to_ecef_km(self.latitude_deg, self.longitude_deg, self.altitude_km)
    }

    /// Azimuth (clockwise from north, `[0, 360)`), elevation and slant range to
    /// the target. Targets below the horizon produce negative elevations.
    pub fn look_angles(&self, latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> LookAngles {
        let sta = self.position_ecef_km();
        let target = geodetic_to_ecef_km(latitude_deg, longitude_deg, altitude_km);
        let dr = [
            target[0] - sta[0],
            target[1] - sta[1],
            target[2] - sta[2],
        ];
        let range_km = norm(dr);

        let enu = ecef_to_enu(dr, self.lat_rad(), self.lon_rad());
        let azimuth = enu.0.atan2(enu.1).to_degrees().rem_euclid(360.0);
        let elevation = if range_km > 0.0 {
            (enu.2 / range_km).clamp(-1.0, 1.0).asin().to_degrees()
        } else {
            90.0
        };

        LookAngles {
            azimuth_deg: azimuth,
            elevation_deg: elevation,
            range_km,
        }
    }

    /// Intersects the line of sight `(azimuth, elevation)` with the sphere at
    /// `altitude_km` and returns the geographic point `(lat, lon)` it hits.
    pub fn footprint(&self, azimuth_deg: f64, elevation_deg: f64, altitude_km: f64) -> Option<(f64, f64)> {
        let az = azimuth_deg.to_radians();
        let el = elevation_deg.to_radians();
        let enu = (az.sin() * el.cos(), az.cos() * el.cos(), el.sin());
        let dir = enu_to_ecef(enu, self.lat_rad(), self.lon_rad());

        let origin = self.position_ecef_km();
        let shell = EARTH_RADIUS_KM + altitude_km;
        let b = dot(origin, dir);
        let c = dot(origin, origin) - shell * shell;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let t = -b + disc.sqrt();
        if t <= 0.0 {
            return None;
        }
        let hit = [
            origin[0] + t * dir[0],
            origin[1] + t * dir[1],
            origin[2] + t * dir[2],
        ];
        let (lat, lon, _) = ecef_to_geodetic(hit);
        Some((lat, lon))
    }
}

pub fn geodetic_to_ecef_km(latitude_deg: f64, longitude_deg: f64, altitude_km: f64) -> [f64; 3] {
    let lat = latitude_deg.to_radians();
    let lon = longitude_deg.to_radians();
    let r = EARTH_RADIUS_KM + altitude_km;
    [
        r * lat.cos() * lon.cos(),
        r * lat.cos() * lon.sin(),
        r * lat.sin(),
    ]
}

pub fn ecef_to_geodetic(pos: [f64; 3]) -> (f64, f64, f64) {
    let r = norm(pos);
    if r == 0.0 {
        return (0.0, 0.0, -EARTH_RADIUS_KM);
    }
    let lat = (pos[2] / r).clamp(-1.0, 1.0).asin().to_degrees();
    let lon = pos[1].atan2(pos[0]).to_degrees();
    (lat, lon, r - EARTH_RADIUS_KM)
}

pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

pub fn enu_to_ecef(enu: (f64, f64, f64), lat_rad: f64, lon_rad: f64) -> [f64; 3] {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();
    let (e, n, u) = enu;

    [
        -sin_lon * e - sin_lat * cos_lon * n + cos_lat * cos_lon * u,
        cos_lon * e - sin_lat * sin_lon * n + cos_lat * sin_lon * u,
        cos_lat * n + sin_lat * u,
    ]
}

/// Haversine distance between two points on a sphere of the given radius.
pub fn great_circle_km(lat1_deg: f64, lon1_deg: f64, lat2_deg: f64, lon2_deg: f64, radius_km: f64) -> f64 {
    let lat1 = lat1_deg.to_radians();
    let lat2 = lat2_deg.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (lon2_deg - lon1_deg).to_radians();
    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * radius_km * a.sqrt().min(1.0).asin()
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}
