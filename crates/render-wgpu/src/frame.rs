//! CPU-side frame data: uniforms, mesh instances, helper lines and texels,
//! built from a scene without touching the GPU.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use worldscene_assets::{Texture, TextureId};
use worldscene_render::RenderSettings;
use worldscene_scene::{NodeKind, PerspectiveCamera, Scene};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub ambient: [f32; 4],
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    pub environment: [f32; 4],
    pub params: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub(crate) struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    pub color: [f32; 4],
    pub material: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(crate) struct LineVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl FrameUniforms {
    /// Camera matrices plus the summed light contributions of every visible light.
    pub fn build(scene: &Scene, camera: &PerspectiveCamera, settings: &RenderSettings) -> Self {
        let graph = &scene.graph;
        let mut ambient = Vec3::ZERO;
        let mut light_dir = Vec3::NEG_Y;
        let mut light_color = Vec3::ZERO;
        let mut have_directional = false;

        for id in graph.traverse() {
            if !graph.is_effectively_visible(id) {
                continue;
            }
            let Some(node) = graph.get(id) else {
                continue;
            };
            match &node.kind {
                NodeKind::AmbientLight(params) => ambient += params.radiance(),
                // Only the first directional light is shaded.
                NodeKind::DirectionalLight(light) if !have_directional => {
                    light_dir = light.direction_from(graph.world_position(id));
                    light_color = light.params.radiance();
                    have_directional = true;
                }
                _ => {}
            }
        }

        let environment = scene
            .environment
            .as_ref()
            .map(|tex| Vec3::from(tex.average_color()) * scene.environment_intensity)
            .unwrap_or(Vec3::ZERO);

        let view_proj = camera.view_projection();
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            ambient: ambient.extend(0.0).to_array(),
            light_dir: light_dir.extend(0.0).to_array(),
            light_color: light_color.extend(0.0).to_array(),
            environment: environment.extend(0.0).to_array(),
            params: [
                scene.background_intensity,
                settings.tone_mapping_exposure,
                if scene.background.is_some() { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// One instance per visible box mesh, scaled to the box extents.
pub(crate) fn collect_instances(scene: &Scene) -> Vec<InstanceData> {
    let graph = &scene.graph;
    graph
        .traverse()
        .into_iter()
        .filter(|id| graph.is_effectively_visible(*id))
        .filter_map(|id| {
            let node = graph.get(id)?;
            let NodeKind::Mesh(mesh) = &node.kind else {
                return None;
            };
            let model = graph.world_matrix(id) * Mat4::from_scale(mesh.extents());
            let cols = model.to_cols_array_2d();
            let [r, g, b] = mesh.color.to_array();
            Some(InstanceData {
                model_0: cols[0],
                model_1: cols[1],
                model_2: cols[2],
                model_3: cols[3],
                color: [r, g, b, 1.0],
                material: [mesh.roughness, mesh.metalness, 0.0, 0.0],
            })
        })
        .collect()
}

/// Line-list vertices for every visible directional light helper.
///
/// The light plane is a square of side `size` facing the light's target and
/// the cone is a single line from the light to its target.
pub(crate) fn helper_lines(scene: &Scene) -> Vec<LineVertex> {
    let graph = &scene.graph;
    let mut lines = Vec::new();
    for id in graph.traverse() {
        if !graph.is_effectively_visible(id) {
            continue;
        }
        let Some(NodeKind::DirectionalLightHelper(helper)) = graph.get(id).map(|n| &n.kind) else {
            continue;
        };
        let Some(NodeKind::DirectionalLight(light)) = graph.get(helper.light).map(|n| &n.kind)
        else {
            continue;
        };
        let origin = graph.world_position(helper.light);
        let [r, g, b] = light.params.color.to_array();
        let color = [r, g, b, 1.0];

        if helper.light_plane.visible {
            let dir = light.direction_from(origin);
            let helper_up = if dir.abs_diff_eq(Vec3::NEG_Y, 1e-3) || dir.abs_diff_eq(Vec3::Y, 1e-3)
            {
                Vec3::Z
            } else {
                Vec3::Y
            };
            let right = dir.cross(helper_up).normalize() * helper.size;
            let up = right.cross(dir).normalize() * helper.size;
            let corners = [
                origin - right + up,
                origin + right + up,
                origin + right - up,
                origin - right - up,
            ];
            for i in 0..4 {
                lines.push(LineVertex {
                    position: corners[i].to_array(),
                    color,
                });
                lines.push(LineVertex {
                    position: corners[(i + 1) % 4].to_array(),
                    color,
                });
            }
        }
        if helper.cone.visible {
            lines.push(LineVertex {
                position: origin.to_array(),
                color,
            });
            lines.push(LineVertex {
                position: light.target.to_array(),
                color,
            });
        }
    }
    lines
}

/// Whether background `id` still has to be uploaded, given the one already
/// on the GPU and the last one that was rejected.
pub(crate) fn background_needs_upload(
    uploaded: Option<TextureId>,
    rejected: Option<TextureId>,
    id: TextureId,
) -> bool {
    uploaded != Some(id) && rejected != Some(id)
}

/// Size of a background on the GPU and the source stride used to reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UploadExtent {
    pub width: u32,
    pub height: u32,
    pub step: u32,
}

/// Fit a `width` x `height` texture under the device's `max_dimension`,
/// keeping every `step`-th texel. `None` for empty textures.
pub(crate) fn upload_extent(width: u32, height: u32, max_dimension: u32) -> Option<UploadExtent> {
    if width == 0 || height == 0 || max_dimension == 0 {
        return None;
    }
    let step = width.max(height).div_ceil(max_dimension);
    Some(UploadExtent {
        width: width.div_ceil(step),
        height: height.div_ceil(step),
        step,
    })
}

/// Pack an RGB float texture into `Rgba16Float` texel bytes at `extent`.
pub(crate) fn rgba16f_texels(texture: &Texture, extent: UploadExtent) -> Vec<u8> {
    let mut data = Vec::with_capacity(extent.width as usize * extent.height as usize * 8);
    let one = half::f16::from_f32(1.0);
    let stride = texture.width as usize;
    for y in 0..extent.height as usize {
        let row = y * extent.step as usize * stride;
        for x in 0..extent.width as usize {
            let i = (row + x * extent.step as usize) * 3;
            for channel in &texture.data[i..i + 3] {
                data.extend_from_slice(&half::f16::from_f32(*channel).to_le_bytes());
            }
            data.extend_from_slice(&one.to_le_bytes());
        }
    }
    data
}

/// Generate unit cube vertices and indices.
pub(crate) fn cube_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0], [[-p, -p, p], [p, -p, p], [p, p, p], [-p, p, p]]),
        ([0.0, 0.0, -1.0], [[p, -p, -p], [-p, -p, -p], [-p, p, -p], [p, p, -p]]),
        ([1.0, 0.0, 0.0], [[p, -p, p], [p, -p, -p], [p, p, -p], [p, p, p]]),
        ([-1.0, 0.0, 0.0], [[-p, -p, -p], [-p, -p, p], [-p, p, p], [-p, p, -p]]),
        ([0.0, 1.0, 0.0], [[-p, p, p], [p, p, p], [p, p, -p], [-p, p, -p]]),
        ([0.0, -1.0, 0.0], [[-p, -p, -p], [p, -p, -p], [p, -p, p], [-p, -p, p]]),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = vertices.len() as u16;
        vertices.extend(corners.map(|position| Vertex { position, normal }));
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}
