use glam::Vec3;

use crate::camera::OrbitCamera;
use crate::model::{Model, ModelId, Transform, load_default};
use crate::types::LightUniform;

/// Largest dimension of every normalized upload
pub const REFERENCE_SIZE: f32 = 2.5;

/// Releases GPU-side resources of a model leaving the scene
pub trait ModelDisposer {
    fn dispose(&mut self, model: Model);
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Light {
    Ambient { color: Vec3, intensity: f32 },
    Directional { color: Vec3, intensity: f32, position: Vec3 },
}

/// Entry in the render graph
#[derive(Clone, Debug)]
pub enum SceneNode {
    Light(Light),
    Model(Model),
}

/// Owns the render graph (lights plus at most one model) and the camera
pub struct SceneContainer {
    nodes: Vec<SceneNode>,
    /// Built-in model parked while an upload is displayed
    parked_default: Option<Model>,
    pub camera: OrbitCamera,
    pub background: [f64; 4],
}

impl SceneContainer {
    /// Scene showing `initial`, with the stock lights
    pub fn new(mut initial: Model, aspect: f32) -> Self {
        place(&mut initial);

        Self {
            nodes: vec![
                SceneNode::Light(Light::Ambient {
                    color: Vec3::ONE,
                    intensity: 0.5,
                }),
                SceneNode::Light(Light::Directional {
                    color: Vec3::ONE,
                    intensity: 0.5,
                    position: Vec3::new(5.0, 5.0, 5.0),
                }),
                SceneNode::Model(initial),
            ],
            parked_default: None,
            camera: OrbitCamera::new(aspect),
            background: [0.0, 0.0, 0.0, 1.0],
        }
    }

    pub fn active_model(&self) -> Option<&Model> {
        self.nodes.iter().find_map(|node| match node {
            SceneNode::Model(model) => Some(model),
            SceneNode::Light(_) => None,
        })
    }

    pub fn active_model_mut(&mut self) -> Option<&mut Model> {
        self.nodes.iter_mut().find_map(|node| match node {
            SceneNode::Model(model) => Some(model),
            SceneNode::Light(_) => None,
        })
    }

    pub fn active_model_id(&self) -> Option<ModelId> {
        self.active_model().map(|m| m.id)
    }

    pub fn attached_model_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, SceneNode::Model(_)))
            .count()
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.nodes.iter().filter_map(|node| match node {
            SceneNode::Light(light) => Some(light),
            SceneNode::Model(_) => None,
        })
    }

    /// Swap in `model`. The outgoing model is disposed unless it is the
    /// built-in default, which is parked for reuse instead.
    pub fn set_active_model(&mut self, mut model: Model, disposer: &mut dyn ModelDisposer) {
        if let Some(previous) = self.detach_model() {
            if previous.is_builtin_default() {
                log::debug!("Parking built-in model");
                self.parked_default = Some(previous);
            } else {
                log::debug!("Disposing model {:?} ({})", previous.id, previous.name());
                disposer.dispose(previous);
            }
        }

        if model.is_builtin_default() {
            self.parked_default = None;
        }

        place(&mut model);
        log::info!("Active model: {} ({} triangles)", model.name(), model.triangle_count());
        self.nodes.push(SceneNode::Model(model));

        self.camera.reset();
    }

    /// Reinstall the built-in model. Returns false when it is already shown.
    pub fn restore_default(&mut self, disposer: &mut dyn ModelDisposer) -> bool {
        if self.active_model().is_some_and(Model::is_builtin_default) {
            return false;
        }

        let default = self.parked_default.take().unwrap_or_else(load_default);
        self.set_active_model(default, disposer);
        true
    }

    /// Light block for the mesh shader
    pub fn light_uniform(&self) -> LightUniform {
        let mut uniform = LightUniform {
            ambient: [0.0; 4],
            direction: [0.0, 1.0, 0.0, 0.0],
            directional: [0.0; 4],
        };

        for light in self.lights() {
            match *light {
                Light::Ambient { color, intensity } => {
                    let c = color * intensity;
                    uniform.ambient = [c.x, c.y, c.z, 0.0];
                }
                Light::Directional {
                    color,
                    intensity,
                    position,
                } => {
                    let c = color * intensity;
                    let d = position.try_normalize().unwrap_or(Vec3::Y);
                    uniform.directional = [c.x, c.y, c.z, 0.0];
                    uniform.direction = [d.x, d.y, d.z, 0.0];
                }
            }
        }

        uniform
    }

    fn detach_model(&mut self) -> Option<Model> {
        let index = self
            .nodes
            .iter()
            .position(|node| matches!(node, SceneNode::Model(_)))?;
        match self.nodes.remove(index) {
            SceneNode::Model(model) => Some(model),
            SceneNode::Light(_) => None,
        }
    }
}

/// The built-in model keeps its authored size at the origin; uploads are
/// normalized
fn place(model: &mut Model) {
    if model.is_builtin_default() {
        model.transform = Transform::default();
    } else {
        recenter_and_scale(model);
    }
}

/// Center the model on the origin and scale it so its largest dimension is
/// [`REFERENCE_SIZE`]. Degenerate bounds keep scale 1.
pub fn recenter_and_scale(model: &mut Model) {
    let Some(bounds) = model.local_bounds() else {
        model.transform = Transform::default();
        return;
    };

    let max_dim = bounds.max_dimension();
    let scale = if max_dim.is_finite() && max_dim > f32::EPSILON {
        REFERENCE_SIZE / max_dim
    } else {
        1.0
    };

    model.transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale,
        pivot: bounds.center(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mesh;

    #[derive(Default)]
    struct Recorder(Vec<ModelId>);

    impl ModelDisposer for Recorder {
        fn dispose(&mut self, model: Model) {
            self.0.push(model.id);
        }
    }

    fn cube(name: &str, size: f32, offset: Vec3) -> Model {
        let positions = (0..8)
            .map(|i| {
                (offset
                    + Vec3::new(
                        (i & 1) as f32 * size,
                        ((i >> 1) & 1) as f32 * size,
                        ((i >> 2) & 1) as f32 * size,
                    ))
                .to_array()
            })
            .collect();
        let mesh = Mesh::from_attributes(None, positions, None, vec![0, 1, 2, 1, 3, 2]);
        Model::uploaded(name, vec![mesh])
    }

    #[test]
    fn new_scene_has_lights_and_one_model() {
        let scene = SceneContainer::new(load_default(), 1.0);
        assert_eq!(scene.attached_model_count(), 1);
        assert_eq!(scene.lights().count(), 2);
        assert_eq!(scene.active_model_id(), Some(ModelId::DEFAULT));
    }

    #[test]
    fn uploaded_model_is_disposed_on_replacement() {
        let mut scene = SceneContainer::new(load_default(), 1.0);
        let mut disposer = Recorder::default();

        let first = cube("a.obj", 1.0, Vec3::ZERO);
        let first_id = first.id;
        scene.set_active_model(first, &mut disposer);
        assert!(disposer.0.is_empty());

        scene.set_active_model(cube("b.obj", 1.0, Vec3::ZERO), &mut disposer);
        assert_eq!(disposer.0, vec![first_id]);
        assert_eq!(scene.attached_model_count(), 1);
    }

    #[test]
    fn restore_default_reuses_parked_model() {
        let mut scene = SceneContainer::new(load_default(), 1.0);
        let mut disposer = Recorder::default();

        assert!(!scene.restore_default(&mut disposer));

        scene.set_active_model(cube("a.obj", 1.0, Vec3::ZERO), &mut disposer);
        assert!(scene.restore_default(&mut disposer));
        assert_eq!(scene.active_model_id(), Some(ModelId::DEFAULT));
        assert!(!disposer.0.contains(&ModelId::DEFAULT));
    }

    #[test]
    fn replacement_resets_camera() {
        let mut scene = SceneContainer::new(load_default(), 1.0);
        scene.camera.target = Vec3::new(3.0, 0.0, 0.0);
        scene.camera.zoom(10.0);

        scene.set_active_model(cube("a.obj", 1.0, Vec3::ZERO), &mut Recorder::default());

        assert_eq!(scene.camera.target, Vec3::ZERO);
        assert!((scene.camera.distance() - 5.0).abs() < 1e-5);
    }

    #[test]
    fn recenter_normalizes_offset_cube() {
        let mut model = cube("far.obj", 40.0, Vec3::new(100.0, -20.0, 7.0));
        recenter_and_scale(&mut model);

        let bounds = model.world_bounds().unwrap();
        assert!((bounds.max_dimension() - REFERENCE_SIZE).abs() < 1e-4);
        assert!(bounds.center().abs_diff_eq(Vec3::ZERO, 1e-4));
    }

    #[test]
    fn flat_model_keeps_unit_scale() {
        let mesh = Mesh::from_attributes(
            None,
            vec![[1.0, 1.0, 1.0]; 3],
            None,
            vec![0, 1, 2],
        );
        let mut model = Model::uploaded("point.obj", vec![mesh]);
        recenter_and_scale(&mut model);
        assert_eq!(model.transform.scale, 1.0);
        assert_eq!(model.transform.pivot, Vec3::ONE);
    }

    #[test]
    fn default_keeps_authored_size() {
        let mut scene = SceneContainer::new(load_default(), 1.0);
        let natural = load_default().local_bounds().unwrap();

        let shown = scene.active_model().unwrap();
        assert_eq!(shown.transform.scale, 1.0);
        let shown_dim = shown.world_bounds().unwrap().max_dimension();
        assert!((shown_dim - natural.max_dimension()).abs() < 1e-5);

        scene.active_model_mut().unwrap().transform.rotation.y = 2.0;
        scene.set_active_model(cube("a.obj", 1.0, Vec3::ZERO), &mut Recorder::default());
        assert!(scene.restore_default(&mut Recorder::default()));

        let restored = scene.active_model().unwrap();
        assert_eq!(restored.transform.scale, 1.0);
        assert_eq!(restored.transform.rotation, Vec3::ZERO);
        assert!(natural.max_dimension() > REFERENCE_SIZE);
    }

    #[test]
    fn light_uniform_matches_stock_rig() {
        let scene = SceneContainer::new(load_default(), 1.0);
        let lights = scene.light_uniform();
        assert_eq!(lights.ambient, [0.5, 0.5, 0.5, 0.0]);
        assert_eq!(lights.directional, [0.5, 0.5, 0.5, 0.0]);
        let d = Vec3::new(lights.direction[0], lights.direction[1], lights.direction[2]);
        assert!(d.abs_diff_eq(Vec3::ONE.normalize(), 1e-6));
    }
}
