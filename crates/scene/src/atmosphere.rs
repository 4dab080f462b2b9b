//! Weather classification to fog and sky parameters.

use std::convert::Infallible;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use crate::handle::SceneHandle;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherClass {
    #[default]
    Clear,
    Rain,
    HeavyRain,
    Snow,
    Fog,
    Overcast,
}

impl WeatherClass {
    /// Exact, case-sensitive match. Anything else, including padded or
    /// capitalised spellings, reads as `Clear`.
    pub fn parse(s: &str) -> Self {
        match s {
            "rain" => WeatherClass::Rain,
            "heavy_rain" => WeatherClass::HeavyRain,
            "snow" => WeatherClass::Snow,
            "fog" => WeatherClass::Fog,
            "overcast" => WeatherClass::Overcast,
            _ => WeatherClass::Clear,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherClass::Clear => "clear",
            WeatherClass::Rain => "rain",
            WeatherClass::HeavyRain => "heavy_rain",
            WeatherClass::Snow => "snow",
            WeatherClass::Fog => "fog",
            WeatherClass::Overcast => "overcast",
        }
    }

    /// Classifies a WMO weather interpretation code.
    ///
    /// Partly cloudy and overcast codes only count as overcast above 80% cloud cover.
    pub fn from_wmo_code(code: i32, cloud_cover_pct: f64) -> Self {
        match code {
            0 | 1 => WeatherClass::Clear,
            2 | 3 if cloud_cover_pct > 80.0 => WeatherClass::Overcast,
            2 | 3 => WeatherClass::Clear,
            45 | 48 => WeatherClass::Fog,
            51..=57 | 61..=67 => WeatherClass::Rain,
            71..=77 | 85 | 86 => WeatherClass::Snow,
            80..=82 | 95..=99 => WeatherClass::HeavyRain,
            _ => WeatherClass::Clear,
        }
    }
}

impl FromStr for WeatherClass {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl std::fmt::Display for WeatherClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scene fog and sky-atmosphere parameters. Always applied as a whole.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct AtmosphereParams {
    pub fog_enabled: bool,
    pub fog_density: f64,
    pub hue_shift: f64,
    pub saturation_shift: f64,
    pub brightness_shift: f64,
}

impl AtmosphereParams {
    pub const CLEAR: AtmosphereParams = AtmosphereParams::row(0.0002, 0.0, 0.0);
    pub const RAIN: AtmosphereParams = AtmosphereParams::row(0.0012, -0.7, -0.4);
    pub const SNOW: AtmosphereParams = AtmosphereParams::row(0.0025, -0.5, 0.3);
    pub const FOG: AtmosphereParams = AtmosphereParams::row(0.0015, -0.8, -0.2);

    const fn row(fog_density: f64, saturation_shift: f64, brightness_shift: f64) -> Self {
        Self {
            fog_enabled: true,
            fog_density,
            hue_shift: 0.0,
            saturation_shift,
            brightness_shift,
        }
    }
}

impl Default for AtmosphereParams {
    fn default() -> Self {
        Self::CLEAR
    }
}

pub fn map_weather(class: WeatherClass) -> AtmosphereParams {
    match class {
        WeatherClass::Clear => AtmosphereParams::CLEAR,
        WeatherClass::Rain | WeatherClass::HeavyRain => AtmosphereParams::RAIN,
        WeatherClass::Snow => AtmosphereParams::SNOW,
        WeatherClass::Fog | WeatherClass::Overcast => AtmosphereParams::FOG,
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum AtmosphereOutcome {
    Applied(AtmosphereParams),
    Unchanged,
    /// No scene to apply to; the same classification is tried again later.
    SceneUnavailable,
}

/// Applies atmosphere parameters when the weather classification input changes.
#[derive(Debug, Default)]
pub struct AtmosphereMapper {
    applied: Option<String>,
}

impl AtmosphereMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classification most recently pushed to the scene.
    pub fn applied(&self) -> Option<&str> {
        self.applied.as_deref()
    }

    pub fn on_classification(
        &mut self,
        classification: &str,
        scene: &mut dyn SceneHandle,
    ) -> AtmosphereOutcome {
        if self.applied.as_deref() == Some(classification) {
            return AtmosphereOutcome::Unchanged;
        }
        if !scene.is_active() {
            return AtmosphereOutcome::SceneUnavailable;
        }

        let class = WeatherClass::parse(classification);
        let params = map_weather(class);
        scene.set_atmosphere(&params);
        debug!(classification, %class, fog_density = params.fog_density, "atmosphere applied");
        self.applied = Some(classification.to_string());
        AtmosphereOutcome::Applied(params)
    }

    /// Forgets the applied classification so the next one is pushed again.
    pub fn reset(&mut self) {
        self.applied = None;
    }
}

#[cfg(test)]
mod tests {
    use super::{AtmosphereMapper, AtmosphereOutcome, AtmosphereParams, WeatherClass, map_weather};
    use crate::headless::HeadlessScene;
    use pretty_assertions::assert_eq;

    #[test]
    fn heavy_rain_row() {
        let p = map_weather(WeatherClass::parse("heavy_rain"));
        assert_eq!(p.fog_density, 0.0012);
        assert_eq!(p.saturation_shift, -0.7);
        assert_eq!(p.brightness_shift, -0.4);
        assert_eq!(p.hue_shift, 0.0);
        assert!(p.fog_enabled);
    }

    #[test]
    fn table_rows() {
        assert_eq!(map_weather(WeatherClass::Rain), AtmosphereParams::RAIN);
        assert_eq!(map_weather(WeatherClass::Snow).fog_density, 0.0025);
        assert_eq!(map_weather(WeatherClass::Snow).brightness_shift, 0.3);
        assert_eq!(map_weather(WeatherClass::Overcast), map_weather(WeatherClass::Fog));
        assert_eq!(map_weather(WeatherClass::Fog).saturation_shift, -0.8);
        assert_eq!(map_weather(WeatherClass::Clear).fog_density, 0.0002);
    }

    #[test]
    fn unknown_classification_is_clear() {
        assert_eq!(WeatherClass::parse("volcanic_ash"), WeatherClass::Clear);
        assert_eq!(WeatherClass::parse(""), WeatherClass::Clear);
        assert_eq!("snow".parse::<WeatherClass>(), Ok(WeatherClass::Snow));
        assert_eq!("Snow".parse::<WeatherClass>(), Ok(WeatherClass::Clear));
        assert_eq!(WeatherClass::parse(" rain"), WeatherClass::Clear);
    }

    #[test]
    fn wmo_codes() {
        assert_eq!(WeatherClass::from_wmo_code(0, 100.0), WeatherClass::Clear);
        assert_eq!(WeatherClass::from_wmo_code(3, 50.0), WeatherClass::Clear);
        assert_eq!(WeatherClass::from_wmo_code(3, 90.0), WeatherClass::Overcast);
        assert_eq!(WeatherClass::from_wmo_code(48, 0.0), WeatherClass::Fog);
        assert_eq!(WeatherClass::from_wmo_code(55, 0.0), WeatherClass::Rain);
        assert_eq!(WeatherClass::from_wmo_code(63, 0.0), WeatherClass::Rain);
        assert_eq!(WeatherClass::from_wmo_code(58, 0.0), WeatherClass::Clear);
        assert_eq!(WeatherClass::from_wmo_code(86, 0.0), WeatherClass::Snow);
        assert_eq!(WeatherClass::from_wmo_code(81, 0.0), WeatherClass::HeavyRain);
        assert_eq!(WeatherClass::from_wmo_code(99, 0.0), WeatherClass::HeavyRain);
        assert_eq!(WeatherClass::from_wmo_code(-1, 0.0), WeatherClass::Clear);
    }

    #[test]
    fn applies_only_on_change_and_is_idempotent() {
        let mut scene = HeadlessScene::new(1280.0, 720.0);
        let mut mapper = AtmosphereMapper::new();

        let first = mapper.on_classification("snow", &mut scene);
        assert_eq!(first, AtmosphereOutcome::Applied(AtmosphereParams::SNOW));
        assert_eq!(mapper.on_classification("snow", &mut scene), AtmosphereOutcome::Unchanged);
        assert_eq!(scene.atmosphere(), AtmosphereParams::SNOW);
        assert_eq!(scene.atmosphere_writes(), 1);

        mapper.on_classification("clear", &mut scene);
        assert_eq!(scene.atmosphere(), AtmosphereParams::CLEAR);
    }

    #[test]
    fn full_replace_between_classifications() {
        let mut scene = HeadlessScene::new(1280.0, 720.0);
        let mut mapper = AtmosphereMapper::new();
        mapper.on_classification("snow", &mut scene);
        mapper.on_classification("tornado", &mut scene);
        assert_eq!(scene.atmosphere(), AtmosphereParams::CLEAR);
    }

    #[test]
    fn inactive_scene_retries_later() {
        let mut scene = HeadlessScene::new(1280.0, 720.0);
        scene.set_active(false);
        let mut mapper = AtmosphereMapper::new();
        assert_eq!(
            mapper.on_classification("fog", &mut scene),
            AtmosphereOutcome::SceneUnavailable
        );
        assert_eq!(mapper.applied(), None);

        scene.set_active(true);
        assert_eq!(
            mapper.on_classification("fog", &mut scene),
            AtmosphereOutcome::Applied(AtmosphereParams::FOG)
        );
    }
}
