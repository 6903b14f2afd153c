//! Scene configuration.
//!
//! All generation, simulation and camera parameters live here, validated once
//! at startup. A [`SceneConfig`] that passes [`SceneConfig::validate`] cannot
//! produce degenerate geometry later.

use glam::Vec3;

use crate::error::ConfigError;

/// Inclusive-min, exclusive-max sampling interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// True when the interval contains at least one value.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.min < self.max
    }
}

/// Parameters for the procedural city generator.
#[derive(Debug, Clone)]
pub struct CityConfig {
    /// Target number of candidate building slots. Slots landing on the road
    /// are discarded without retry, so the effective count may be lower.
    pub building_count: u32,
    /// Sampling extent along X (buildings land in `[-x_extent, x_extent]`).
    pub x_extent: f32,
    /// Sampling extent along Z.
    pub z_extent: f32,
    /// Half-width of the central exclusion band where nothing is placed.
    pub road_half_width: f32,
    /// Building footprint width range.
    pub width: Span,
    /// Building footprint depth range.
    pub depth: Span,
    /// Exponent of the power-shaped height distribution. Values above 1 make
    /// tall towers rare.
    pub height_exponent: f32,
    /// Scale applied to the shaped height sample.
    pub height_scale: f32,
    /// Minimum building height.
    pub min_height: f32,
    /// Vertical spacing between window rows.
    pub row_spacing: f32,
    /// Number of window columns per facade, sampled per building.
    pub cols: (u32, u32),
    /// Probability that a candidate window is lit.
    pub window_density: f32,
    /// Accent colors windows and decorations pick from.
    pub palette: Vec<Vec3>,
    /// Probability a building gets a rooftop accent block.
    pub roof_accent_chance: f32,
    /// Probability a building gets a floating ring near its top.
    pub ring_chance: f32,
    /// Probability a building emits a vertical light beam.
    pub beam_chance: f32,
    /// Probability a building gets edge light strips.
    pub edge_strip_chance: f32,
}

impl Default for CityConfig {
    fn default() -> Self {
        Self {
            building_count: 300,
            x_extent: 180.0,
            z_extent: 260.0,
            road_half_width: 14.0,
            width: Span::new(6.0, 16.0),
            depth: Span::new(6.0, 16.0),
            height_exponent: 2.2,
            height_scale: 70.0,
            min_height: 8.0,
            row_spacing: 3.5,
            cols: (2, 5),
            window_density: 0.35,
            palette: vec![
                Vec3::new(1.0, 0.0, 0.5),  // hot pink
                Vec3::new(0.0, 1.0, 1.0),  // cyan
                Vec3::new(0.5, 0.0, 1.0),  // purple
                Vec3::new(1.0, 0.6, 0.1),  // amber
                Vec3::new(0.0, 1.0, 0.3),  // toxic green
            ],
            roof_accent_chance: 0.25,
            ring_chance: 0.08,
            beam_chance: 0.06,
            edge_strip_chance: 0.3,
        }
    }
}

/// Parameters for the rain streak pool.
#[derive(Debug, Clone)]
pub struct RainConfig {
    /// Fixed pool size, constant for the session.
    pub count: u32,
    /// Initial sampling half-extent along X and Z.
    pub spawn_half_extent: f32,
    /// Altitude particles respawn at, and the upper bound of initial heights.
    pub max_height: f32,
    /// Streak segment length range, re-sampled on every respawn.
    pub streak_length: Span,
    /// Per-particle fall speed range, sampled once at creation.
    ///
    /// This is displacement per `advance` call, not per second: motion is
    /// frame-rate-dependent by design.
    pub fall_speed: Span,
    /// Respawned particles land within this half-width of the camera's
    /// ground position.
    pub respawn_half_width: f32,
}

impl Default for RainConfig {
    fn default() -> Self {
        Self {
            count: 10_000,
            spawn_half_extent: 200.0,
            max_height: 200.0,
            streak_length: Span::new(1.5, 4.0),
            fall_speed: Span::new(1.2, 3.0),
            respawn_half_width: 150.0,
        }
    }
}

/// Parameters for the flythrough camera path.
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Z displacement per frame (constant per call, like the rain).
    pub z_step: f32,
    /// When z drops below this (negative) threshold, it wraps.
    pub wrap_threshold: f32,
    /// Z value the camera wraps back to.
    pub wrap_reset: f32,
    /// Base camera altitude before bob is applied.
    pub base_height: f32,
    /// Lateral sway amplitude and frequency (x axis).
    pub sway_amplitude: f32,
    pub sway_frequency: f32,
    /// Vertical bob amplitude and frequency (y axis).
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
    /// How far ahead of the camera the look-at point sits.
    pub look_ahead: f32,
    /// Altitude of the look-at point.
    pub look_height: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            z_step: 0.4,
            wrap_threshold: -400.0,
            wrap_reset: 400.0,
            base_height: 30.0,
            sway_amplitude: 12.0,
            sway_frequency: 0.11,
            bob_amplitude: 4.0,
            bob_frequency: 0.17,
            look_ahead: 60.0,
            look_height: 20.0,
        }
    }
}

/// Top-level configuration for a session.
#[derive(Debug, Clone, Default)]
pub struct SceneConfig {
    pub city: CityConfig,
    pub rain: RainConfig,
    pub camera: CameraConfig,
}

impl SceneConfig {
    /// Reject out-of-range parameters before anything is generated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.city;
        if c.building_count == 0 {
            return Err(ConfigError::ZeroCount("building_count"));
        }
        for (name, v) in [
            ("x_extent", c.x_extent),
            ("z_extent", c.z_extent),
            ("road_half_width", c.road_half_width),
            ("height_scale", c.height_scale),
            ("min_height", c.min_height),
            ("row_spacing", c.row_spacing),
        ] {
            if v <= 0.0 {
                return Err(ConfigError::NonPositive(name, v));
            }
        }
        for (name, span) in [("city.width", c.width), ("city.depth", c.depth)] {
            if !span.is_valid() {
                return Err(ConfigError::EmptyRange(name));
            }
        }
        if c.cols.0 >= c.cols.1 {
            return Err(ConfigError::EmptyRange("city.cols"));
        }
        if !(0.0..=1.0).contains(&c.window_density) {
            return Err(ConfigError::BadProbability("window_density", c.window_density));
        }
        for (name, p) in [
            ("roof_accent_chance", c.roof_accent_chance),
            ("ring_chance", c.ring_chance),
            ("beam_chance", c.beam_chance),
            ("edge_strip_chance", c.edge_strip_chance),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::BadProbability(name, p));
            }
        }
        if c.palette.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        let r = &self.rain;
        if r.count == 0 {
            return Err(ConfigError::ZeroCount("rain.count"));
        }
        for (name, v) in [
            ("rain.spawn_half_extent", r.spawn_half_extent),
            ("rain.max_height", r.max_height),
            ("rain.respawn_half_width", r.respawn_half_width),
        ] {
            if v <= 0.0 {
                return Err(ConfigError::NonPositive(name, v));
            }
        }
        for (name, span) in [
            ("rain.streak_length", r.streak_length),
            ("rain.fall_speed", r.fall_speed),
        ] {
            if !span.is_valid() || span.min <= 0.0 {
                return Err(ConfigError::EmptyRange(name));
            }
        }

        let cam = &self.camera;
        if cam.z_step <= 0.0 {
            return Err(ConfigError::NonPositive("camera.z_step", cam.z_step));
        }
        if cam.wrap_threshold >= cam.wrap_reset {
            return Err(ConfigError::EmptyRange("camera.wrap"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SceneConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_building_count_rejected() {
        let mut cfg = SceneConfig::default();
        cfg.city.building_count = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroCount("building_count")));
    }

    #[test]
    fn inverted_span_rejected() {
        let mut cfg = SceneConfig::default();
        cfg.city.width = Span::new(10.0, 4.0);
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyRange("city.width")));
    }

    #[test]
    fn window_density_out_of_range_rejected() {
        let mut cfg = SceneConfig::default();
        cfg.city.window_density = 1.5;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BadProbability("window_density", _))
        ));
    }

    #[test]
    fn empty_palette_rejected() {
        let mut cfg = SceneConfig::default();
        cfg.city.palette.clear();
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyPalette));
    }

    #[test]
    fn zero_rain_pool_rejected() {
        let mut cfg = SceneConfig::default();
        cfg.rain.count = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroCount("rain.count")));
    }

    #[test]
    fn camera_wrap_must_be_ordered() {
        let mut cfg = SceneConfig::default();
        cfg.camera.wrap_threshold = 100.0;
        cfg.camera.wrap_reset = -100.0;
        assert_eq!(cfg.validate(), Err(ConfigError::EmptyRange("camera.wrap")));
    }
}
