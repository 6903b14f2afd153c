//! Procedural city generator.
//!
//! Runs once at startup and emits flat instance lists (position, scale, color
//! per instance) for the renderer's instanced box pipeline. Nothing here is
//! touched again after generation; the whole city is static for the session.
//!
//! Buildings are sampled uniformly over the ground plane, with a central
//! exclusion band kept clear for the road the camera flies along. A candidate
//! slot landing inside the band is discarded rather than resampled, so the
//! effective building count may be below the configured target.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::config::CityConfig;
use crate::sampler::Sampler;

/// One instanced box: unit cube transformed by position and per-axis scale,
/// tinted by a flat emissive-ish color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub position: Vec3,
    pub scale: Vec3,
    pub color: Vec3,
}

/// GPU layout of [`Instance`]. vec3 fields are padded to 16 bytes to satisfy
/// WGSL alignment.
#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
pub struct InstanceGpu {
    position: [f32; 3],
    _pad0: f32,
    scale: [f32; 3],
    _pad1: f32,
    color: [f32; 3],
    _pad2: f32,
}

impl Instance {
    pub fn to_gpu(&self) -> InstanceGpu {
        InstanceGpu {
            position: self.position.to_array(),
            _pad0: 0.0,
            scale: self.scale.to_array(),
            _pad1: 0.0,
            color: self.color.to_array(),
            _pad2: 0.0,
        }
    }
}

/// Pack a CPU instance list for buffer upload.
pub fn pack_instances(instances: &[Instance]) -> Vec<InstanceGpu> {
    instances.iter().map(Instance::to_gpu).collect()
}

/// One accepted building placement. Immutable after generation.
#[derive(Debug, Clone, Copy)]
pub struct BuildingSpec {
    /// Footprint center on the ground plane.
    pub x: f32,
    pub z: f32,
    pub width: f32,
    pub depth: f32,
    pub height: f32,
    /// Accent color used by this building's decorations.
    pub accent: Vec3,
}

/// One lit window, expressed relative to its parent building's center.
#[derive(Debug, Clone, Copy)]
pub struct WindowSpec {
    /// Index of the parent building in [`City::buildings`].
    pub building: usize,
    /// Offset from the building's footprint center. `offset.y` is height
    /// above ground.
    pub offset: Vec3,
    pub color: Vec3,
}

/// Generated city: retained specs for derivation/tests plus the flat instance
/// lists the renderer consumes.
pub struct City {
    pub buildings: Vec<BuildingSpec>,
    pub windows: Vec<WindowSpec>,
    pub building_instances: Vec<Instance>,
    pub window_instances: Vec<Instance>,
    pub decoration_instances: Vec<Instance>,
}

const BUILDING_BODY: Vec3 = Vec3::new(0.012, 0.014, 0.030);
const GROUND_COLOR: Vec3 = Vec3::new(0.006, 0.007, 0.016);
const WINDOW_SIZE: Vec3 = Vec3::new(0.9, 1.3, 0.12);

/// Generate the full city from validated configuration.
///
/// Pure given the sampler state: a seeded [`Sampler`] reproduces the same
/// city bit-for-bit.
pub fn generate(cfg: &CityConfig, sampler: &mut Sampler) -> City {
    let mut city = City {
        buildings: Vec::with_capacity(cfg.building_count as usize),
        windows: Vec::new(),
        building_instances: Vec::with_capacity(cfg.building_count as usize + 1),
        window_instances: Vec::new(),
        decoration_instances: Vec::new(),
    };

    for _ in 0..cfg.building_count {
        let x = sampler.range(-cfg.x_extent, cfg.x_extent);
        let z = sampler.range(-cfg.z_extent, cfg.z_extent);
        if x.abs() < cfg.road_half_width {
            // Road slot: dropped, not resampled.
            continue;
        }

        let width = sampler.range(cfg.width.min, cfg.width.max);
        let depth = sampler.range(cfg.depth.min, cfg.depth.max);
        let height = sampler.power_height(cfg.height_exponent, cfg.height_scale, cfg.min_height);
        let accent = *sampler.pick(&cfg.palette);

        let spec = BuildingSpec {
            x,
            z,
            width,
            depth,
            height,
            accent,
        };
        let index = city.buildings.len();
        city.buildings.push(spec);

        city.building_instances.push(Instance {
            position: Vec3::new(x, height * 0.5, z),
            scale: Vec3::new(width, height, depth),
            color: sampler.jitter_color(BUILDING_BODY, 0.004),
        });

        derive_windows(cfg, sampler, &spec, index, &mut city.windows);
        derive_decorations(cfg, sampler, &spec, &mut city.decoration_instances);
    }

    for w in &city.windows {
        let b = &city.buildings[w.building];
        city.window_instances.push(Instance {
            position: Vec3::new(b.x, 0.0, b.z) + w.offset,
            scale: WINDOW_SIZE,
            color: w.color,
        });
    }

    // Ground slab under everything, wide enough to cover the rain volume.
    city.building_instances.push(Instance {
        position: Vec3::new(0.0, -0.25, 0.0),
        scale: Vec3::new(cfg.x_extent * 2.4, 0.5, cfg.z_extent * 2.4),
        color: GROUND_COLOR,
    });

    city
}

/// Derive the lit-window grid for one building.
///
/// `rows = floor(height / row_spacing)`, columns from the configured range.
/// Each cell is lit with probability `window_density`; unlit cells emit
/// nothing. Offsets keep every window inside the footprint width and below
/// the roofline.
fn derive_windows(
    cfg: &CityConfig,
    sampler: &mut Sampler,
    b: &BuildingSpec,
    index: usize,
    out: &mut Vec<WindowSpec>,
) {
    let rows = (b.height / cfg.row_spacing).floor() as u32;
    let cols = sampler.range_u32(cfg.cols.0, cfg.cols.1);

    for row in 0..rows {
        let y = (row as f32 + 0.5) * cfg.row_spacing;
        for col in 0..cols {
            // Even spacing strictly inside the facade width.
            let lx = -b.width * 0.5 + (col as f32 + 1.0) * b.width / (cols as f32 + 1.0);
            for side in [-1.0f32, 1.0] {
                if !sampler.chance(cfg.window_density) {
                    continue;
                }
                out.push(WindowSpec {
                    building: index,
                    offset: Vec3::new(lx, y, side * (b.depth * 0.5 + 0.08)),
                    color: *sampler.pick(&cfg.palette),
                });
            }
        }
    }
}

/// Independent Bernoulli trials per building for the one-shot decorations:
/// corner light strips, rooftop accents, floating rings, vertical beams.
fn derive_decorations(
    cfg: &CityConfig,
    sampler: &mut Sampler,
    b: &BuildingSpec,
    out: &mut Vec<Instance>,
) {
    if sampler.chance(cfg.edge_strip_chance) {
        for sx in [-1.0f32, 1.0] {
            for sz in [-1.0f32, 1.0] {
                out.push(Instance {
                    position: Vec3::new(
                        b.x + sx * b.width * 0.5,
                        b.height * 0.5,
                        b.z + sz * b.depth * 0.5,
                    ),
                    scale: Vec3::new(0.18, b.height, 0.18),
                    color: b.accent,
                });
            }
        }
    }

    if sampler.chance(cfg.roof_accent_chance) {
        out.push(Instance {
            position: Vec3::new(b.x, b.height + 1.0, b.z),
            scale: Vec3::new(b.width * 0.4, 2.0, b.depth * 0.4),
            color: b.accent,
        });
    }

    if sampler.chance(cfg.ring_chance) {
        out.push(Instance {
            position: Vec3::new(b.x, b.height * sampler.range(0.6, 0.95), b.z),
            scale: Vec3::new(b.width * 1.6, 0.25, b.depth * 1.6),
            color: b.accent,
        });
    }

    if sampler.chance(cfg.beam_chance) {
        let reach = sampler.range(40.0, 90.0);
        out.push(Instance {
            position: Vec3::new(b.x, b.height + reach * 0.5, b.z),
            scale: Vec3::new(0.45, reach, 0.45),
            color: b.accent,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CityConfig;

    fn generate_seeded(seed: u64) -> (CityConfig, City) {
        let cfg = CityConfig::default();
        let mut sampler = Sampler::seeded(seed);
        let city = generate(&cfg, &mut sampler);
        (cfg, city)
    }

    #[test]
    fn buildings_stay_off_the_road() {
        let (cfg, city) = generate_seeded(11);
        assert!(!city.buildings.is_empty());
        for b in &city.buildings {
            assert!(
                b.x.abs() >= cfg.road_half_width,
                "building at x={} inside exclusion band",
                b.x
            );
        }
    }

    #[test]
    fn road_slots_lower_the_effective_count() {
        let (cfg, city) = generate_seeded(11);
        assert!(city.buildings.len() <= cfg.building_count as usize);
    }

    #[test]
    fn heights_follow_the_configured_bounds() {
        let (cfg, city) = generate_seeded(23);
        for b in &city.buildings {
            assert!(b.height >= cfg.min_height);
            assert!(b.height <= cfg.min_height + cfg.height_scale);
        }
    }

    #[test]
    fn windows_stay_within_parent_bounds() {
        let (_, city) = generate_seeded(5);
        assert!(!city.windows.is_empty());
        for w in &city.windows {
            let b = &city.buildings[w.building];
            assert!(w.offset.x.abs() < b.width * 0.5, "window outside facade width");
            assert!(w.offset.y > 0.0 && w.offset.y < b.height, "window above roofline");
        }
    }

    #[test]
    fn window_colors_come_from_the_palette() {
        let (cfg, city) = generate_seeded(7);
        for w in &city.windows {
            assert!(cfg.palette.contains(&w.color));
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_city() {
        let (_, a) = generate_seeded(99);
        let (_, b) = generate_seeded(99);
        assert_eq!(a.buildings.len(), b.buildings.len());
        assert_eq!(a.windows.len(), b.windows.len());
        assert_eq!(a.decoration_instances.len(), b.decoration_instances.len());
        for (x, y) in a.building_instances.iter().zip(&b.building_instances) {
            assert_eq!(x, y);
        }
    }

    #[test]
    fn instance_gpu_layout_is_48_bytes() {
        assert_eq!(std::mem::size_of::<InstanceGpu>(), 48);
    }
}
