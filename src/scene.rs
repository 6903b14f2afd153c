//! Session state.
//!
//! [`Scene`] is the explicit context object the frame loop drives: it owns
//! the sampler, the generated city, the rain pool and the flight path, and
//! runs one frame of CPU work per [`Scene::tick`]. Nothing in the crate
//! keeps scene state in module globals.

use glam::Vec2;
use log::info;

use crate::city::{self, City};
use crate::config::SceneConfig;
use crate::error::ConfigError;
use crate::flight::{CameraPose, FlightPath};
use crate::rain::RainPool;
use crate::sampler::Sampler;

pub struct Scene {
    pub city: City,
    pub rain: RainPool,
    pub flight: FlightPath,
    sampler: Sampler,
    /// Camera x from the previous frame's pose; rain respawns center on it.
    camera_x: f32,
}

impl Scene {
    /// Validate the configuration and generate the session state.
    ///
    /// `seed` makes the whole session (generation and every future respawn)
    /// reproducible; `None` seeds from entropy.
    pub fn new(config: SceneConfig, seed: Option<u64>) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut sampler = match seed {
            Some(s) => Sampler::seeded(s),
            None => Sampler::from_entropy(),
        };

        let city = city::generate(&config.city, &mut sampler);
        let rain = RainPool::new(&config.rain, &mut sampler);
        let flight = FlightPath::new(config.camera.clone());

        info!(
            "scene generated: {} buildings, {} windows, {} decorations, {} rain streaks",
            city.buildings.len(),
            city.windows.len(),
            city.decoration_instances.len(),
            rain.len()
        );

        Ok(Self {
            city,
            rain,
            flight,
            sampler,
            camera_x: 0.0,
        })
    }

    /// Run one frame of CPU-side work, in order: rain advance centered on the
    /// current camera ground position, then the camera pose for this frame.
    pub fn tick(&mut self, elapsed: f32) -> CameraPose {
        let camera_xz = Vec2::new(self.camera_x, self.flight.z());
        self.rain.advance(camera_xz, &mut self.sampler);

        let pose = self.flight.advance(elapsed);
        self.camera_x = pose.position.x;
        pose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn invalid_config_fails_fast() {
        let mut cfg = SceneConfig::default();
        cfg.city.building_count = 0;
        assert!(matches!(
            Scene::new(cfg, Some(1)),
            Err(ConfigError::ZeroCount("building_count"))
        ));
    }

    #[test]
    fn seeded_scenes_are_reproducible() {
        let a = Scene::new(SceneConfig::default(), Some(77)).unwrap();
        let b = Scene::new(SceneConfig::default(), Some(77)).unwrap();
        assert_eq!(a.city.buildings.len(), b.city.buildings.len());
        assert_eq!(a.rain.vertex_bytes(), b.rain.vertex_bytes());
    }

    #[test]
    fn tick_runs_rain_then_camera() {
        let mut scene = Scene::new(SceneConfig::default(), Some(3)).unwrap();
        let z0 = scene.flight.z();
        let before = scene.rain.segment(0);

        let pose = scene.tick(0.25);

        assert!(scene.flight.z() < z0);
        assert_eq!(pose.position.z, scene.flight.z());
        let after = scene.rain.segment(0);
        assert!(after.0.y != before.0.y, "rain did not advance");
    }
}
