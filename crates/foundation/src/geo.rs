use serde::{Deserialize, Serialize};

use crate::math::{Ecef, Geodetic, ecef_to_geodetic, geodetic_to_ecef};

/// Why a coordinate was rejected.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum CoordinateError {
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
    NonFinite,
}

impl std::fmt::Display for CoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateError::LatitudeOutOfRange(v) => {
                write!(f, "latitude {v} outside [-90, 90]")
            }
            CoordinateError::LongitudeOutOfRange(v) => {
                write!(f, "longitude {v} outside [-180, 180]")
            }
            CoordinateError::NonFinite => write!(f, "coordinate is not a finite number"),
        }
    }
}

impl std::error::Error for CoordinateError {}

/// A location on the WGS84 ellipsoid in degrees, with altitude in meters.
///
/// The fields are public so that application state can carry whatever it was
/// given; call [`GeoPoint::validate`] before trusting the values.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
    #[serde(default)]
    pub altitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: 0.0,
        }
    }

    pub const fn with_altitude(self, altitude: f64) -> Self {
        Self {
            latitude: self.latitude,
            longitude: self.longitude,
            altitude,
        }
    }

    pub fn validate(self) -> Result<Self, CoordinateError> {
        if !(self.latitude.is_finite() && self.longitude.is_finite() && self.altitude.is_finite())
        {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(self.longitude));
        }
        Ok(self)
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Moves the point `degrees` of latitude towards the south pole, clamped at the pole.
    pub fn offset_south(self, degrees: f64) -> Self {
        Self {
            latitude: (self.latitude - degrees).clamp(-90.0, 90.0),
            ..self
        }
    }

    pub fn to_geodetic(self) -> Geodetic {
        Geodetic::from_degrees(self.latitude, self.longitude, self.altitude)
    }

    pub fn from_geodetic(geo: Geodetic) -> Self {
        Self {
            latitude: geo.lat_deg(),
            longitude: geo.lon_deg(),
            altitude: geo.alt_m,
        }
    }

    pub fn to_ecef(self) -> Ecef {
        geodetic_to_ecef(self.to_geodetic())
    }

    pub fn from_ecef(ecef: Ecef) -> Self {
        Self::from_geodetic(ecef_to_geodetic(ecef))
    }
}

/// A lat/lon rectangle given by its south-west (`low`) and north-east (`high`) corners.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRect {
    pub low: GeoPoint,
    pub high: GeoPoint,
}

impl GeoRect {
    pub const fn new(low: GeoPoint, high: GeoPoint) -> Self {
        Self { low, high }
    }

    pub fn validate(self) -> Result<Self, CoordinateError> {
        self.low.validate()?;
        self.high.validate()?;
        Ok(self)
    }

    pub fn center(&self) -> GeoPoint {
        let mut lon = 0.5 * (self.low.longitude + self.high.longitude);
        // Rectangles crossing the antimeridian have low.lon > high.lon.
        if self.low.longitude > self.high.longitude {
            lon += 180.0;
            if lon > 180.0 {
                lon -= 360.0;
            }
        }
        GeoPoint::new(0.5 * (self.low.latitude + self.high.latitude), lon)
    }

    /// Great-circle-free approximation of the diagonal length in meters.
    pub fn approx_diagonal_m(&self) -> f64 {
        let lat_mid = 0.5 * (self.low.latitude + self.high.latitude);
        let mut dlon = (self.high.longitude - self.low.longitude).abs();
        if dlon > 180.0 {
            dlon = 360.0 - dlon;
        }
        let dlat = (self.high.latitude - self.low.latitude).abs();
        let meters_per_deg = 111_320.0;
        let dx = dlon * meters_per_deg * lat_mid.to_radians().cos();
        let dy = dlat * meters_per_deg;
        (dx * dx + dy * dy).sqrt()
    }
}
