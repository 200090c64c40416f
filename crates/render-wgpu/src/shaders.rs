/// Uniform block shared by every pipeline. Must match `FrameUniforms` in `frame.rs`.
const UNIFORMS: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
    inv_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    ambient: vec4<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
    environment: vec4<f32>,
    // x = background intensity, y = exposure, z = 1 when a background is bound
    params: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

fn aces(color: vec3<f32>) -> vec3<f32> {
    let a = 2.51;
    let b = 0.03;
    let c = 2.43;
    let d = 0.59;
    let e = 0.14;
    return clamp((color * (a * color + b)) / (color * (c * color + d) + e), vec3<f32>(0.0), vec3<f32>(1.0));
}
"#;

const MESH_BODY: &str = r#"
struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    // x = roughness, y = metalness
    @location(7) material: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) world_pos: vec3<f32>,
    @location(2) color: vec4<f32>,
    @location(3) material: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.world_pos = world_pos.xyz;
    out.color = instance.color;
    out.material = instance.material;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let n = normalize(in.world_normal);
    let l = normalize(-uniforms.light_dir.xyz);
    let v = normalize(uniforms.camera_pos.xyz - in.world_pos);
    let h = normalize(l + v);

    let roughness = clamp(in.material.x, 0.05, 1.0);
    let metalness = clamp(in.material.y, 0.0, 1.0);
    let albedo = in.color.rgb;

    let n_dot_l = max(dot(n, l), 0.0);
    let shininess = 2.0 / (roughness * roughness) - 2.0;
    let specular = pow(max(dot(n, h), 0.0), max(shininess, 1.0)) * (1.0 - roughness);
    let spec_color = mix(vec3<f32>(0.04), albedo, metalness);

    let diffuse = albedo * (1.0 - metalness) * n_dot_l;
    let direct = (diffuse + spec_color * specular * n_dot_l) * uniforms.light_color.rgb;
    let indirect = albedo * (uniforms.ambient.rgb + uniforms.environment.rgb);

    let color = aces((direct + indirect) * uniforms.params.y);
    return vec4<f32>(color, in.color.a);
}
"#;

const LINE_BODY: &str = r#"
struct LineVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct LineOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_line(vertex: LineVertex) -> LineOutput {
    var out: LineOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_line(in: LineOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

const SKY_BODY: &str = r#"
const PI: f32 = 3.14159265;

@group(1) @binding(0)
var sky_texture: texture_2d<f32>;
@group(1) @binding(1)
var sky_sampler: sampler;

struct SkyOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) ndc: vec2<f32>,
};

// Fullscreen triangle drawn at the far plane.
@vertex
fn vs_sky(@builtin(vertex_index) index: u32) -> SkyOutput {
    let x = f32((index << 1u) & 2u) * 2.0 - 1.0;
    let y = f32(index & 2u) * 2.0 - 1.0;
    var out: SkyOutput;
    out.clip_position = vec4<f32>(x, y, 1.0, 1.0);
    out.ndc = vec2<f32>(x, y);
    return out;
}

@fragment
fn fs_sky(in: SkyOutput) -> @location(0) vec4<f32> {
    let far = uniforms.inv_view_proj * vec4<f32>(in.ndc, 1.0, 1.0);
    let dir = normalize(far.xyz / far.w - uniforms.camera_pos.xyz);

    let theta = atan2(dir.x, dir.z);
    let phi = asin(clamp(dir.y, -1.0, 1.0));
    let uv = vec2<f32>((theta + PI) / (2.0 * PI), 1.0 - (phi + PI * 0.5) / PI);

    let hdr = textureSample(sky_texture, sky_sampler, uv).rgb;
    let color = aces(hdr * uniforms.params.x * uniforms.params.y);
    return vec4<f32>(color, 1.0);
}
"#;

/// Lit box meshes.
pub fn mesh_shader() -> String {
    format!("{UNIFORMS}{MESH_BODY}")
}

/// Unlit colored lines for light helpers.
pub fn line_shader() -> String {
    format!("{UNIFORMS}{LINE_BODY}")
}

/// Equirectangular background.
pub fn sky_shader() -> String {
    format!("{UNIFORMS}{SKY_BODY}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shaders_share_uniform_block() {
        for source in [mesh_shader(), line_shader(), sky_shader()] {
            assert!(source.contains("var<uniform> uniforms: Uniforms;"));
        }
    }

    fn validate(name: &str, source: &str) {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{name}: {}", e.emit_to_string(source)));
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::default(),
        )
        .validate(&module)
        .unwrap_or_else(|e| panic!("{name}: {e:?}"));
    }

    #[test]
    fn shaders_parse_and_validate() {
        validate("mesh", &mesh_shader());
        validate("line", &line_shader());
        validate("sky", &sky_shader());
    }

    #[test]
    fn entry_points_present() {
        assert!(mesh_shader().contains("fn vs_main"));
        assert!(mesh_shader().contains("fn fs_main"));
        assert!(line_shader().contains("fn vs_line"));
        assert!(sky_shader().contains("fn fs_sky"));
    }
}
