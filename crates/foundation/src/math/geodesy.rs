use super::Ecef;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// WGS84 second eccentricity squared.
pub const WGS84_EP2: f64 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

/// Geodetic coordinates in radians and meters above the ellipsoid.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Geodetic {
    pub lat_rad: f64,
    pub lon_rad: f64,
    pub alt_m: f64,
}

impl Geodetic {
    pub fn new(lat_rad: f64, lon_rad: f64, alt_m: f64) -> Self {
        Self {
            lat_rad,
            lon_rad,
            alt_m,
        }
    }

    pub fn from_degrees(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Self {
        Self::new(lat_deg.to_radians(), lon_deg.to_radians(), alt_m)
    }

    pub fn lat_deg(&self) -> f64 {
        self.lat_rad.to_degrees()
    }

    pub fn lon_deg(&self) -> f64 {
        self.lon_rad.to_degrees()
    }
}

pub fn geodetic_to_ecef(geo: Geodetic) -> Ecef {
    let (sin_lat, cos_lat) = geo.lat_rad.sin_cos();
    let (sin_lon, cos_lon) = geo.lon_rad.sin_cos();

    // Prime vertical radius of curvature.
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();

    Ecef::new(
        (n + geo.alt_m) * cos_lat * cos_lon,
        (n + geo.alt_m) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + geo.alt_m) * sin_lat,
    )
}

/// Inverse of [`geodetic_to_ecef`] using Bowring's closed form.
///
/// Accurate to well under a millimeter for points near the surface, which is
/// all the viewer ever asks for.
pub fn ecef_to_geodetic(ecef: Ecef) -> Geodetic {
    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let lon = ecef.y.atan2(ecef.x);

    let theta = (ecef.z * WGS84_A).atan2(p * WGS84_B);
    let (sin_theta, cos_theta) = theta.sin_cos();

    let lat = (ecef.z + WGS84_EP2 * WGS84_B * sin_theta.powi(3))
        .atan2(p - WGS84_E2 * WGS84_A * cos_theta.powi(3));

    let sin_lat = lat.sin();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    let alt = if lat.cos().abs() > 1e-12 {
        p / lat.cos() - n
    } else {
        // At the poles p collapses to zero; measure along the minor axis.
        ecef.z.abs() - WGS84_B
    };

    Geodetic::new(lat, lon, alt)
}

#[cfg(test)]
mod tests {
    use super::{Geodetic, WGS84_A, WGS84_B, ecef_to_geodetic, geodetic_to_ecef};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn equator_prime_meridian_lies_on_x_axis() {
        let ecef = geodetic_to_ecef(Geodetic::new(0.0, 0.0, 0.0));
        assert_close(ecef.x, WGS84_A, 1e-6);
        assert_close(ecef.y, 0.0, 1e-6);
        assert_close(ecef.z, 0.0, 1e-6);
    }

    #[test]
    fn north_pole_lies_on_minor_axis() {
        let ecef = geodetic_to_ecef(Geodetic::from_degrees(90.0, 0.0, 0.0));
        assert_close(ecef.x, 0.0, 1e-6);
        assert_close(ecef.z, WGS84_B, 1e-6);

        let back = ecef_to_geodetic(ecef);
        assert_close(back.lat_deg(), 90.0, 1e-9);
        assert_close(back.alt_m, 0.0, 1e-6);
    }

    #[test]
    fn city_block_round_trip() {
        // Lower Manhattan, 400 m up.
        let geo = Geodetic::from_degrees(40.724, -73.995, 400.0);
        let back = ecef_to_geodetic(geodetic_to_ecef(geo));
        assert_close(back.lat_deg(), 40.724, 1e-9);
        assert_close(back.lon_deg(), -73.995, 1e-9);
        assert_close(back.alt_m, 400.0, 1e-6);
    }

    #[test]
    fn altitude_moves_along_the_normal() {
        let low = geodetic_to_ecef(Geodetic::from_degrees(0.0, 90.0, 0.0));
        let high = geodetic_to_ecef(Geodetic::from_degrees(0.0, 90.0, 20.0));
        assert_close(high.y - low.y, 20.0, 1e-6);
    }
}
