//! Demo scenes

use cameras::LookAt;
use lights::*;
use materials::create_material;
use media::HomogeneousMedium;
use render_core::error::ConfigError;
use render_core::geometry::*;
use render_core::light::ArcLight;
use render_core::material::ArcMaterial;
use render_core::medium::*;
use render_core::paramset::ParamSet;
use render_core::pbrt::Float;
use render_core::primitives::*;
use render_core::scene::Scene;
use render_core::spectrum::Spectrum;
use shapes::*;
use std::sync::Arc;

/// Names accepted by `create_scene()`.
pub const SCENE_NAMES: [&str; 3] = ["plane", "spheres", "fog"];

/// A built-in scene with the camera placement that frames it.
pub struct DemoScene {
    /// The scene.
    pub scene: Scene,

    /// Camera frame.
    pub look_at: LookAt,

    /// Medium the camera lies in.
    pub camera_medium: Option<ArcMedium>,
}

/// Builds a demo scene by name.
///
/// * `name` - Scene name; see `SCENE_NAMES`.
pub fn create_scene(name: &str) -> Result<DemoScene, ConfigError> {
    let demo = match name {
        "plane" => plane()?,
        "spheres" => spheres()?,
        "fog" => fog()?,
        _ => {
            return Err(ConfigError::Unknown {
                kind: "scene",
                name: name.to_string(),
            })
        }
    };
    info!(
        "Built scene '{}' with {} lights, bounds {:?}",
        name,
        demo.scene.lights.len(),
        demo.scene.world_bound
    );
    Ok(demo)
}

fn look_at(pos: Point3f, look: Point3f) -> Result<LookAt, ConfigError> {
    LookAt::new(pos, look, Vector3f::new(0.0, 0.0, 1.0)).ok_or_else(|| ConfigError::InvalidParameter {
        name: "lookat".to_string(),
        reason: format!("camera at {:?} cannot look at {:?}", pos, look),
    })
}

fn matte(rgb: [Float; 3]) -> Result<ArcMaterial, ConfigError> {
    let mut params = ParamSet::new();
    params.add_rgb_spectrum("Kd", &rgb);
    create_material("matte", &params)
}

fn primitive(shape: ArcShape, material: ArcMaterial, medium_interface: MediumInterface) -> ArcPrimitive {
    Arc::new(GeometricPrimitive::new(shape, Some(material), None, medium_interface))
}

/// Large ground disk at `z = 0`.
fn floor() -> ArcShape {
    Arc::new(Disk::new(Point3f::ZERO, Vector3f::new(0.0, 0.0, 1.0), 20.0, false))
}

/// A diffuse sphere on a floor lit by a point light.
fn plane() -> Result<DemoScene, ConfigError> {
    let primitives = vec![
        primitive(floor(), matte([0.5, 0.5, 0.5])?, MediumInterface::default()),
        primitive(
            Arc::new(Sphere::new(Point3f::new(0.0, 0.0, 1.0), 1.0, false)),
            matte([0.8, 0.3, 0.2])?,
            MediumInterface::default(),
        ),
    ];

    let mut params = ParamSet::new();
    params.add_point3f("from", &[Point3f::new(2.0, -2.0, 4.0)]);
    params.add_rgb_spectrum("I", &[30.0, 30.0, 30.0]);
    let lights: Vec<ArcLight> = vec![Arc::new(PointLight::from((&params, None)))];

    Ok(DemoScene {
        scene: Scene::new(Arc::new(PrimitiveList::new(primitives)), lights),
        look_at: look_at(Point3f::new(0.0, -6.0, 3.0), Point3f::new(0.0, 0.0, 0.8))?,
        camera_medium: None,
    })
}

/// Mirror and glass spheres under a spherical area light and a dim sky.
fn spheres() -> Result<DemoScene, ConfigError> {
    let mut mirror = ParamSet::new();
    mirror.add_rgb_spectrum("Kr", &[0.9, 0.9, 0.9]);
    let mut glass = ParamSet::new();
    glass.add_float("eta", &[1.5]);

    let mut primitives = vec![
        primitive(floor(), matte([0.6, 0.6, 0.5])?, MediumInterface::default()),
        primitive(
            Arc::new(Sphere::new(Point3f::new(-1.2, 0.0, 1.0), 1.0, false)),
            create_material("mirror", &mirror)?,
            MediumInterface::default(),
        ),
        primitive(
            Arc::new(Sphere::new(Point3f::new(1.2, 0.0, 1.0), 1.0, false)),
            create_material("glass", &glass)?,
            MediumInterface::default(),
        ),
    ];

    // Spherical emitter.
    let bulb: ArcShape = Arc::new(Sphere::new(Point3f::new(0.0, -1.0, 5.0), 0.5, false));
    let mut params = ParamSet::new();
    params.add_rgb_spectrum("L", &[20.0, 18.0, 15.0]);
    params.add_int("samples", &[4]);
    let area: ArcLight = Arc::new(DiffuseAreaLight::from((&params, None, Arc::clone(&bulb))));
    primitives.push(Arc::new(GeometricPrimitive::new(
        bulb,
        Some(matte([0.0, 0.0, 0.0])?),
        Some(Arc::clone(&area)),
        MediumInterface::default(),
    )));

    let sky: ArcLight = Arc::new(UniformInfiniteLight::new(Spectrum::new(0.05), 1));

    Ok(DemoScene {
        scene: Scene::new(Arc::new(PrimitiveList::new(primitives)), vec![area, sky]),
        look_at: look_at(Point3f::new(0.0, -7.0, 3.0), Point3f::new(0.0, 0.0, 1.0))?,
        camera_medium: None,
    })
}

/// A sphere on a floor inside scattering fog, lit by a spot light.
fn fog() -> Result<DemoScene, ConfigError> {
    let mut params = ParamSet::new();
    params.add_rgb_spectrum("sigma_a", &[0.02, 0.02, 0.02]);
    params.add_rgb_spectrum("sigma_s", &[0.1, 0.1, 0.1]);
    params.add_float("g", &[0.3]);
    let fog: ArcMedium = Arc::new(HomogeneousMedium::from(&params));
    let mi = MediumInterface::from(Some(Arc::clone(&fog)));

    let primitives = vec![
        primitive(floor(), matte([0.5, 0.5, 0.5])?, mi.clone()),
        primitive(
            Arc::new(Sphere::new(Point3f::new(0.0, 0.0, 1.0), 1.0, false)),
            matte([0.2, 0.4, 0.8])?,
            mi,
        ),
    ];

    let mut params = ParamSet::new();
    params.add_point3f("from", &[Point3f::new(0.0, 0.0, 6.0)]);
    params.add_point3f("to", &[Point3f::ZERO]);
    params.add_rgb_spectrum("I", &[200.0, 200.0, 200.0]);
    params.add_float("coneangle", &[25.0]);
    let lights: Vec<ArcLight> = vec![Arc::new(SpotLight::from((&params, Some(Arc::clone(&fog)))))];

    Ok(DemoScene {
        scene: Scene::new(Arc::new(PrimitiveList::new(primitives)), lights),
        look_at: look_at(Point3f::new(0.0, -8.0, 3.0), Point3f::new(0.0, 0.0, 1.0))?,
        camera_medium: Some(fog),
    })
}

// ---- Tests ----

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_scene_is_lit_and_bounded() {
        for name in SCENE_NAMES {
            let demo = create_scene(name).unwrap();
            assert!(!demo.scene.lights.is_empty(), "{} has no lights", name);
            let d = demo.scene.world_bound.diagonal();
            assert!(d.x > 0.0 && d.y > 0.0 && d.z > 0.0, "{} is flat", name);
        }
    }

    #[test]
    fn only_the_fog_scene_places_the_camera_in_a_medium() {
        assert!(create_scene("plane").unwrap().camera_medium.is_none());
        assert!(create_scene("fog").unwrap().camera_medium.is_some());
    }

    #[test]
    fn unknown_scene_is_rejected() {
        assert!(matches!(create_scene("cornell"), Err(ConfigError::Unknown { kind: "scene", .. })));
    }
}
