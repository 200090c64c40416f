//! Constructors for the stock scene content: a box floor, ambient and
//! directional lights, and the optional directional light helper.

use crate::graph::{
    BoxMesh, DirectionalLight, DirectionalLightHelper, HelperPart, LightParams, Node, NodeKind,
    NodeRole,
};
use glam::Vec3;
use worldscene_common::{Color, Transform};

/// Default floor surface color.
const FLOOR_COLOR: u32 = 0x8a8a8a;

pub struct Floor;

impl Floor {
    /// A static box whose top face lies on the y = 0 plane.
    pub fn create_box_floor(width: f32, depth: f32, height: f32) -> Node {
        let mesh = BoxMesh {
            width,
            height,
            depth,
            color: Color::from_hex(FLOOR_COLOR),
            roughness: 0.8,
            metalness: 0.0,
        };
        Node::new("floor", NodeRole::Floor, NodeKind::Mesh(mesh))
            .with_transform(Transform::from_position(Vec3::new(0.0, -height / 2.0, 0.0)))
    }
}

pub struct Light;

impl Light {
    pub fn create_ambient_light(color: Color, intensity: f32) -> Node {
        Node::new(
            "ambient-light",
            NodeRole::AmbientLight,
            NodeKind::AmbientLight(LightParams::new(color, intensity)),
        )
    }

    /// A directional light at `(x, y, z)` aimed at the origin.
    pub fn create_directional_light(x: f32, y: f32, z: f32, color: Color, intensity: f32) -> Node {
        let light = DirectionalLight {
            params: LightParams::new(color, intensity),
            target: Vec3::ZERO,
            cast_shadow: true,
        };
        Node::new(
            "directional-light",
            NodeRole::DirectionalLight,
            NodeKind::DirectionalLight(light),
        )
        .with_transform(Transform::from_position(Vec3::new(x, y, z)))
    }

    /// Build a helper node for `light` through `factory`.
    ///
    /// Returns `None` when the factory cannot produce one or `light` is not a
    /// directional light. Sub-parts the factory left out come back invisible.
    pub fn create_directional_light_helper(
        factory: &dyn HelperFactory,
        light: &Node,
        size: f32,
    ) -> Option<Node> {
        let NodeKind::DirectionalLight(directional) = &light.kind else {
            tracing::warn!(node = %light.id().short(), "helper requested for a non-directional light");
            return None;
        };
        let parts = factory.create_directional_light_helper(directional, size)?;
        let (light_plane, cone) = parts.normalize();
        let helper = DirectionalLightHelper {
            light: light.id(),
            size,
            light_plane,
            cone,
        };
        Some(Node::new(
            "directional-light-helper",
            NodeRole::Helper,
            NodeKind::DirectionalLightHelper(helper),
        ))
    }
}

/// Raw helper output. A factory may leave either sub-part undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HelperParts {
    pub light_plane: Option<HelperPart>,
    pub cone: Option<HelperPart>,
}

impl HelperParts {
    /// Both sub-parts present and shown.
    pub fn complete() -> Self {
        Self {
            light_plane: Some(HelperPart { visible: true }),
            cone: Some(HelperPart { visible: true }),
        }
    }

    /// Fill undefined sub-parts with an invisible placeholder.
    pub fn normalize(self) -> (HelperPart, HelperPart) {
        (
            self.light_plane.unwrap_or_default(),
            self.cone.unwrap_or_default(),
        )
    }
}

/// Produces helper visuals for lights.
pub trait HelperFactory {
    fn create_directional_light_helper(
        &self,
        light: &DirectionalLight,
        size: f32,
    ) -> Option<HelperParts>;
}

/// Full helpers with every sub-part visible.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardHelpers;

impl HelperFactory for StandardHelpers {
    fn create_directional_light_helper(
        &self,
        _light: &DirectionalLight,
        _size: f32,
    ) -> Option<HelperParts> {
        Some(HelperParts::complete())
    }
}

/// Helper construction unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHelpers;

impl HelperFactory for NoHelpers {
    fn create_directional_light_helper(
        &self,
        _light: &DirectionalLight,
        _size: f32,
    ) -> Option<HelperParts> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PlaneOnly;

    impl HelperFactory for PlaneOnly {
        fn create_directional_light_helper(
            &self,
            _light: &DirectionalLight,
            _size: f32,
        ) -> Option<HelperParts> {
            Some(HelperParts {
                light_plane: Some(HelperPart { visible: true }),
                cone: None,
            })
        }
    }

    fn helper_of(node: &Node) -> DirectionalLightHelper {
        match node.kind {
            NodeKind::DirectionalLightHelper(h) => h,
            _ => panic!("not a helper"),
        }
    }

    #[test]
    fn box_floor_sits_on_ground() {
        let floor = Floor::create_box_floor(7.0, 7.0, 0.4);
        assert_eq!(floor.role, NodeRole::Floor);
        let NodeKind::Mesh(mesh) = floor.kind else {
            panic!("floor is not a mesh");
        };
        assert_eq!(mesh.extents(), Vec3::new(7.0, 0.4, 7.0));
        assert_eq!(floor.transform.position.y, -0.2);
    }

    #[test]
    fn ambient_light_params() {
        let light = Light::create_ambient_light(Color::from_hex(0xffffff), 0.5);
        assert_eq!(light.role, NodeRole::AmbientLight);
        let params = light.light_params().unwrap();
        assert_eq!(params.color, Color::WHITE);
        assert_eq!(params.intensity(), 0.5);
    }

    #[test]
    fn directional_light_position() {
        let light = Light::create_directional_light(0.0, 5.0, 0.0, Color::from_hex(0xff0000), 0.5);
        assert_eq!(light.role, NodeRole::DirectionalLight);
        assert_eq!(light.transform.position, Vec3::new(0.0, 5.0, 0.0));
        assert_eq!(light.light_params().unwrap().color.to_hex(), 0xff0000);
    }

    #[test]
    fn standard_helper_is_fully_visible() {
        let light = Light::create_directional_light(0.0, 5.0, 0.0, Color::WHITE, 1.0);
        let node = Light::create_directional_light_helper(&StandardHelpers, &light, 1.0).unwrap();
        let helper = helper_of(&node);
        assert_eq!(helper.light, light.id());
        assert!(helper.light_plane.visible);
        assert!(helper.cone.visible);
    }

    #[test]
    fn missing_sub_parts_default_to_invisible() {
        let light = Light::create_directional_light(0.0, 5.0, 0.0, Color::WHITE, 1.0);
        let node = Light::create_directional_light_helper(&PlaneOnly, &light, 1.0).unwrap();
        let helper = helper_of(&node);
        assert!(helper.light_plane.visible);
        assert!(!helper.cone.visible);

        let (plane, cone) = HelperParts::default().normalize();
        assert!(!plane.visible);
        assert!(!cone.visible);
    }

    #[test]
    fn unsupported_helper_yields_none() {
        let light = Light::create_directional_light(0.0, 5.0, 0.0, Color::WHITE, 1.0);
        assert!(Light::create_directional_light_helper(&NoHelpers, &light, 1.0).is_none());
    }

    #[test]
    fn helper_requires_directional_light() {
        let ambient = Light::create_ambient_light(Color::WHITE, 1.0);
        assert!(Light::create_directional_light_helper(&StandardHelpers, &ambient, 1.0).is_none());
    }
}
