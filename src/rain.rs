//! Rain streak pool.
//!
//! A fixed-size pool of vertical line segments, advanced once per rendered
//! frame. The pool owns the flat vertex buffer the renderer draws as a line
//! list (start xyz, end xyz per streak) and mutates it in place, raising a
//! dirty flag for re-upload instead of ever reallocating.
//!
//! Fall speed is a constant per-call displacement, not scaled by wall-clock
//! delta: motion is frame-rate-dependent by design and preserved as such.

use glam::{Vec2, Vec3};

use crate::config::RainConfig;
use crate::sampler::Sampler;

/// Floats per streak in the vertex buffer: two xyz endpoints.
const STRIDE: usize = 6;

pub struct RainPool {
    cfg: RainConfig,
    /// Interleaved `[sx, sy, sz, ex, ey, ez]` per streak.
    vertices: Vec<f32>,
    /// Per-streak fall displacement per `advance` call, fixed at creation.
    speeds: Vec<f32>,
    dirty: bool,
}

impl RainPool {
    /// Allocate and scatter the pool. Heights start uniformly distributed so
    /// the first frames already look like steady rain.
    pub fn new(cfg: &RainConfig, sampler: &mut Sampler) -> Self {
        let count = cfg.count as usize;
        let mut vertices = Vec::with_capacity(count * STRIDE);
        let mut speeds = Vec::with_capacity(count);

        for _ in 0..count {
            let x = sampler.range(-cfg.spawn_half_extent, cfg.spawn_half_extent);
            let z = sampler.range(-cfg.spawn_half_extent, cfg.spawn_half_extent);
            let y = sampler.range(0.0, cfg.max_height);
            let len = sampler.range(cfg.streak_length.min, cfg.streak_length.max);

            vertices.extend_from_slice(&[x, y, z, x, y - len, z]);
            speeds.push(sampler.range(cfg.fall_speed.min, cfg.fall_speed.max));
        }

        Self {
            cfg: cfg.clone(),
            vertices,
            speeds,
            dirty: true,
        }
    }

    /// Advance every streak by its own fall speed, respawning any that fell
    /// below the ground plane. Visits each particle exactly once; the pool
    /// size never changes.
    pub fn advance(&mut self, camera_xz: Vec2, sampler: &mut Sampler) {
        for (i, speed) in self.speeds.iter().enumerate() {
            let base = i * STRIDE;
            self.vertices[base + 1] -= speed;
            self.vertices[base + 4] -= speed;

            if self.vertices[base + 1] < 0.0 {
                // In-place respawn: back to the top, recentered on the camera.
                let len = sampler.range(self.cfg.streak_length.min, self.cfg.streak_length.max);
                let half = self.cfg.respawn_half_width;
                let x = camera_xz.x + sampler.range(-half, half);
                let z = camera_xz.y + sampler.range(-half, half);

                self.vertices[base] = x;
                self.vertices[base + 1] = self.cfg.max_height;
                self.vertices[base + 2] = z;
                self.vertices[base + 3] = x;
                self.vertices[base + 4] = self.cfg.max_height - len;
                self.vertices[base + 5] = z;
            }
        }
        self.dirty = true;
    }

    /// Number of streaks in the pool.
    #[inline]
    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }

    /// Raw vertex bytes for buffer upload (two vertices per streak).
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Whether the vertex buffer changed since the last upload.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Called by the renderer after re-uploading the vertex buffer.
    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Start and end point of one streak.
    pub fn segment(&self, index: usize) -> (Vec3, Vec3) {
        let base = index * STRIDE;
        (
            Vec3::from_slice(&self.vertices[base..base + 3]),
            Vec3::from_slice(&self.vertices[base + 3..base + 6]),
        )
    }

    /// Per-call fall displacement of one streak.
    pub fn speed(&self, index: usize) -> f32 {
        self.speeds[index]
    }

    #[cfg(test)]
    pub(crate) fn force_segment(&mut self, index: usize, y: f32, length: f32, speed: f32) {
        let base = index * STRIDE;
        self.vertices[base + 1] = y;
        self.vertices[base + 4] = y - length;
        self.speeds[index] = speed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Span;

    fn test_cfg() -> RainConfig {
        RainConfig {
            count: 500,
            spawn_half_extent: 100.0,
            max_height: 200.0,
            streak_length: Span::new(1.5, 4.0),
            fall_speed: Span::new(1.2, 3.0),
            respawn_half_width: 150.0,
        }
    }

    fn streak_invariant_holds(pool: &RainPool, cfg: &RainConfig) {
        for i in 0..pool.len() {
            let (start, end) = pool.segment(i);
            let len = start.y - end.y;
            assert!(
                len >= cfg.streak_length.min && len <= cfg.streak_length.max,
                "streak {} length {} outside configured range",
                i,
                len
            );
            assert_eq!(start.x, end.x);
            assert_eq!(start.z, end.z);
        }
    }

    #[test]
    fn initial_pool_satisfies_streak_invariant() {
        let cfg = test_cfg();
        let pool = RainPool::new(&cfg, &mut Sampler::seeded(4));
        assert_eq!(pool.len(), cfg.count as usize);
        streak_invariant_holds(&pool, &cfg);
    }

    #[test]
    fn streak_invariant_survives_advances() {
        let cfg = test_cfg();
        let mut sampler = Sampler::seeded(4);
        let mut pool = RainPool::new(&cfg, &mut sampler);
        for _ in 0..300 {
            pool.advance(Vec2::new(5.0, -40.0), &mut sampler);
        }
        streak_invariant_holds(&pool, &cfg);
    }

    #[test]
    fn particles_fall_by_their_own_speed() {
        let cfg = test_cfg();
        let mut sampler = Sampler::seeded(8);
        let mut pool = RainPool::new(&cfg, &mut sampler);
        pool.force_segment(0, 100.0, 2.0, 1.7);

        pool.advance(Vec2::ZERO, &mut sampler);

        let (start, end) = pool.segment(0);
        assert!((start.y - 98.3).abs() < 1e-4);
        assert!((end.y - 96.3).abs() < 1e-4);
    }

    #[test]
    fn ground_crossing_respawns_near_the_camera() {
        let cfg = test_cfg();
        let mut sampler = Sampler::seeded(2);
        let mut pool = RainPool::new(&cfg, &mut sampler);
        pool.force_segment(7, 0.5, 2.0, 2.0);

        let camera = Vec2::new(12.0, -80.0);
        pool.advance(camera, &mut sampler);

        let (start, end) = pool.segment(7);
        assert_eq!(start.y, cfg.max_height);
        let len = start.y - end.y;
        assert!(len >= cfg.streak_length.min && len <= cfg.streak_length.max);
        assert!((start.x - camera.x).abs() <= cfg.respawn_half_width);
        assert!((start.z - camera.y).abs() <= cfg.respawn_half_width);
        assert_eq!(start.x, end.x);
        assert_eq!(start.z, end.z);
        // Respawn leaves the particle's speed alone.
        assert_eq!(pool.speed(7), 2.0);
    }

    #[test]
    fn pool_size_is_invariant() {
        let cfg = test_cfg();
        let mut sampler = Sampler::seeded(6);
        let mut pool = RainPool::new(&cfg, &mut sampler);
        let bytes = pool.vertex_bytes().len();
        for _ in 0..2000 {
            pool.advance(Vec2::ZERO, &mut sampler);
        }
        assert_eq!(pool.len(), cfg.count as usize);
        assert_eq!(pool.vertex_bytes().len(), bytes);
    }

    #[test]
    fn advance_marks_the_buffer_dirty() {
        let cfg = test_cfg();
        let mut sampler = Sampler::seeded(6);
        let mut pool = RainPool::new(&cfg, &mut sampler);
        pool.mark_clean();
        assert!(!pool.is_dirty());
        pool.advance(Vec2::ZERO, &mut sampler);
        assert!(pool.is_dirty());
    }
}
