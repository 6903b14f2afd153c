//! Static WGSL sources.
//!
//! The city and rain shaders read the shared frame uniforms; the post shader
//! applies the one-shot configured bloom/tonemap pass.

/// Instanced unit-cube shader for buildings, windows and decorations.
///
/// Vertex buffer 0 is the shared cube mesh (position + normal), buffer 1 the
/// per-instance transform and color. Shading is a fixed-direction lambert
/// term plus the instance color as emission, so neon accents survive into
/// the bloom threshold.
pub const CITY_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    time: f32,
    delta_time: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) instance_pos: vec3<f32>,
    @location(3) instance_scale: vec3<f32>,
    @location(4) instance_color: vec3<f32>,
) -> VertexOutput {
    let world_pos = position * instance_scale + instance_pos;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(world_pos, 1.0);
    out.color = instance_color;
    out.normal = normal;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 0.8, 0.5));
    let diffuse = max(dot(normalize(in.normal), light_dir), 0.0) * 0.25;
    let shaded = in.color * (0.9 + diffuse);
    return vec4<f32>(shaded, 1.0);
}
"#;

/// Line-list shader for the rain vertex buffer.
pub const RAIN_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    time: f32,
    delta_time: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(position, 1.0);
    out.color = vec4<f32>(0.55, 0.65, 0.9, 0.35);
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

/// Fullscreen bloom + tonemap pass over the offscreen scene texture.
///
/// Threshold, radius and strength are baked constants, configured once here
/// and never touched per frame.
pub const POST_SHADER: &str = r#"
@group(0) @binding(0)
var scene_tex: texture_2d<f32>;
@group(0) @binding(1)
var scene_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@vertex
fn vs_main(@builtin(vertex_index) index: u32) -> VertexOutput {
    // Fullscreen triangle.
    var out: VertexOutput;
    let x = f32(i32(index) / 2) * 4.0 - 1.0;
    let y = f32(i32(index) % 2) * 4.0 - 1.0;
    out.clip_position = vec4<f32>(x, y, 0.0, 1.0);
    out.uv = vec2<f32>(x * 0.5 + 0.5, 0.5 - y * 0.5);
    return out;
}

const BLOOM_THRESHOLD: f32 = 0.55;
const BLOOM_RADIUS: f32 = 2.5;
const BLOOM_STRENGTH: f32 = 0.8;

fn bright(c: vec3<f32>) -> vec3<f32> {
    let luma = dot(c, vec3<f32>(0.2126, 0.7152, 0.0722));
    return c * max(luma - BLOOM_THRESHOLD, 0.0);
}

fn aces(c: vec3<f32>) -> vec3<f32> {
    return clamp(
        (c * (2.51 * c + 0.03)) / (c * (2.43 * c + 0.59) + 0.14),
        vec3<f32>(0.0),
        vec3<f32>(1.0),
    );
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = BLOOM_RADIUS / vec2<f32>(textureDimensions(scene_tex));
    let base = textureSample(scene_tex, scene_sampler, in.uv).rgb;

    var glow = vec3<f32>(0.0);
    for (var dx = -2; dx <= 2; dx++) {
        for (var dy = -2; dy <= 2; dy++) {
            let offset = vec2<f32>(f32(dx), f32(dy)) * texel;
            glow += bright(textureSample(scene_tex, scene_sampler, in.uv + offset).rgb);
        }
    }
    glow /= 25.0;

    let color = aces(base + glow * BLOOM_STRENGTH);
    return vec4<f32>(color, 1.0);
}
"#;
