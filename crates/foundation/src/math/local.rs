use super::{Ecef, Geodetic, Vec3, geodetic_to_ecef};

/// Local East-North-Up coordinates (meters).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

impl Enu {
    pub fn new(east: f64, north: f64, up: f64) -> Self {
        Self { east, north, up }
    }
}

/// Rotates an ENU direction at `origin` into an ECEF direction (no translation).
pub fn enu_direction_to_ecef(dir: Enu, origin: Geodetic) -> Vec3 {
    let (sin_lat, cos_lat) = origin.lat_rad.sin_cos();
    let (sin_lon, cos_lon) = origin.lon_rad.sin_cos();

    Vec3::new(
        -sin_lon * dir.east - sin_lat * cos_lon * dir.north + cos_lat * cos_lon * dir.up,
        cos_lon * dir.east - sin_lat * sin_lon * dir.north + cos_lat * sin_lon * dir.up,
        cos_lat * dir.north + sin_lat * dir.up,
    )
}

/// Rotates an ECEF direction into the ENU frame at `origin` (no translation).
pub fn ecef_direction_to_enu(dir: Vec3, origin: Geodetic) -> Enu {
    let (sin_lat, cos_lat) = origin.lat_rad.sin_cos();
    let (sin_lon, cos_lon) = origin.lon_rad.sin_cos();

    Enu::new(
        -sin_lon * dir.x + cos_lon * dir.y,
        -sin_lat * cos_lon * dir.x - sin_lat * sin_lon * dir.y + cos_lat * dir.z,
        cos_lat * cos_lon * dir.x + cos_lat * sin_lon * dir.y + sin_lat * dir.z,
    )
}

pub fn ecef_to_enu(point: Ecef, origin: Geodetic) -> Enu {
    let delta = point.as_vec3() - geodetic_to_ecef(origin).as_vec3();
    ecef_direction_to_enu(delta, origin)
}

pub fn enu_to_ecef(enu: Enu, origin: Geodetic) -> Ecef {
    let base = geodetic_to_ecef(origin).as_vec3();
    Ecef::from_vec3(base + enu_direction_to_ecef(enu, origin))
}
