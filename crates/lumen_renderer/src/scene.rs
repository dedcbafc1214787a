//! Render scene: an arena of shapes plus the materials they use.
//!
//! Objects reference materials through [`MaterialId`] handles resolved once,
//! when the object is added, so the integrator never looks names up.

use std::collections::HashMap;

use lumen_core::{Material, ObjectDescription, SceneDescription, ShapeDescription};
use lumen_math::hash::{self, StructuralHash};
use lumen_math::{Interval, Ray};

use crate::hittable::{HitRecord, Hittable, Shape};
use crate::rect::AxisAlignedRect;
use crate::sphere::Sphere;
use crate::stats::RayCounters;
use crate::triangle::TriangleMesh;

/// Handle into a [`MaterialLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MaterialId(u32);

impl MaterialId {
    /// The built-in grey diffuse material.
    pub const DEFAULT: MaterialId = MaterialId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Name-keyed material arena. Slot 0 always holds the default material.
#[derive(Debug, Clone)]
pub struct MaterialLibrary {
    materials: Vec<Material>,
    by_name: HashMap<String, MaterialId>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self {
            materials: vec![Material::default()],
            by_name: HashMap::new(),
        }
    }

    /// Add a material, replacing any earlier one with the same name.
    pub fn insert(&mut self, material: Material) -> MaterialId {
        let material = material.sanitized();
        if !material.name.is_empty() {
            if let Some(&id) = self.by_name.get(&material.name) {
                log::debug!("Replacing material '{}'", material.name);
                self.materials[id.index()] = material;
                return id;
            }
        }

        let id = MaterialId(self.materials.len() as u32);
        if !material.name.is_empty() {
            self.by_name.insert(material.name.clone(), id);
        }
        self.materials.push(material);
        id
    }

    /// Look a material up by name, falling back to the default material.
    pub fn resolve(&self, name: &str) -> MaterialId {
        if name.is_empty() {
            return MaterialId::DEFAULT;
        }
        match self.by_name.get(name) {
            Some(&id) => id,
            None => {
                log::warn!("Unknown material '{}', using the default material", name);
                MaterialId::DEFAULT
            }
        }
    }

    pub fn get(&self, id: MaterialId) -> &Material {
        self.materials.get(id.index()).unwrap_or(&self.materials[0])
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of an object in its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u32);

/// A shape with a material.
pub struct SceneObject {
    pub name: String,
    pub shape: Shape,
    pub material: MaterialId,
}

/// Closest intersection found by [`Scene::intersect`].
#[derive(Debug, Clone, Copy)]
pub struct SceneHit {
    pub record: HitRecord,
    pub object: ObjectId,
    pub material: MaterialId,
}

/// Ordered collection of objects. Read-only while a frame renders.
pub struct Scene {
    objects: Vec<SceneObject>,
    materials: MaterialLibrary,
    use_bounding_boxes: bool,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            materials: MaterialLibrary::new(),
            use_bounding_boxes: true,
        }
    }

    /// Build a scene from a loaded description.
    pub fn from_description(description: &SceneDescription) -> Self {
        let mut scene = Self::new();
        for material in &description.materials {
            scene.add_material(material.clone());
        }
        for object in &description.objects {
            scene.add_description(object);
        }
        log::info!(
            "Built scene: {} objects, {} materials, {} lights",
            scene.len(),
            scene.materials.len(),
            scene.query_lights().len()
        );
        scene
    }

    fn add_description(&mut self, object: &ObjectDescription) -> ObjectId {
        let shape: Shape = match &object.shape {
            ShapeDescription::Sphere { center, radius } => Sphere::new(*center, *radius).into(),
            ShapeDescription::Rect {
                plane,
                a0,
                a1,
                b0,
                b1,
                k,
            } => AxisAlignedRect::new(*plane, *a0, *a1, *b0, *b1, *k).into(),
            ShapeDescription::Mesh { faces } => TriangleMesh::new(faces.clone()).into(),
        };
        let material = self.materials.resolve(&object.material);
        self.add(object.name.clone(), shape, material)
    }

    /// Add or replace a material. Meshes already using a replaced material
    /// follow its refraction setting.
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = self.materials.insert(material);
        let drop_backface = !self.materials.get(id).can_refract();
        for object in self.objects.iter_mut().filter(|object| object.material == id) {
            if let Shape::Mesh(mesh) = &mut object.shape {
                mesh.set_drop_backface(drop_backface);
            }
        }
        id
    }

    /// Add an object. Meshes with a refractive material keep their backfaces.
    pub fn add(&mut self, name: impl Into<String>, shape: impl Into<Shape>, material: MaterialId) -> ObjectId {
        let mut shape = shape.into();
        if let Shape::Mesh(mesh) = &mut shape {
            mesh.set_drop_backface(!self.materials.get(material).can_refract());
        }

        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(SceneObject {
            name: name.into(),
            shape,
            material,
        });
        id
    }

    /// Add an object, resolving the material by name.
    pub fn add_named(&mut self, name: impl Into<String>, shape: impl Into<Shape>, material: &str) -> ObjectId {
        let material = self.materials.resolve(material);
        self.add(name, shape, material)
    }

    /// Toggle the bounding box pre-test in [`Scene::intersect`].
    pub fn set_use_bounding_boxes(&mut self, enabled: bool) {
        self.use_bounding_boxes = enabled;
    }

    /// Closest hit along the ray within `ray_t`.
    ///
    /// Linear scan. Among hits at the same distance the first object scanned wins.
    pub fn intersect(&self, ray: &Ray, ray_t: Interval, counters: &mut RayCounters) -> Option<SceneHit> {
        let mut closest: Option<SceneHit> = None;
        let mut closest_so_far = ray_t.max;

        for (index, object) in self.objects.iter().enumerate() {
            let interval = ray_t.with_max(closest_so_far);
            if self.use_bounding_boxes {
                counters.ray_box += 1;
                if !object.shape.bounding_box().hit(ray, interval) {
                    continue;
                }
            }

            counters.ray_object += 1;
            if let Some(record) = object.shape.hit(ray, interval, counters) {
                if record.t < closest_so_far {
                    closest_so_far = record.t;
                    closest = Some(SceneHit {
                        record,
                        object: ObjectId(index as u32),
                        material: object.material,
                    });
                }
            }
        }

        closest
    }

    /// Objects whose material is a light.
    pub fn query_lights(&self) -> Vec<ObjectId> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, object)| self.materials.get(object.material).is_light())
            .map(|(index, _)| ObjectId(index as u32))
            .collect()
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0 as usize)
    }

    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        self.materials.get(id)
    }

    pub fn materials(&self) -> &MaterialLibrary {
        &self.materials
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl StructuralHash for Scene {
    fn structural_hash(&self) -> u32 {
        self.objects.iter().fold(0, |acc, object| {
            let object_hash = hash::combine(
                object.shape.structural_hash(),
                self.materials.get(object.material).structural_hash(),
            );
            hash::combine(acc, object_hash)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{load_scene_from_str, Color, TriangleFace};
    use lumen_math::Vec3;

    fn two_spheres() -> Scene {
        let mut scene = Scene::new();
        let red = scene.add_material(Material::diffuse("red", Color::new(1.0, 0.0, 0.0)));
        let lamp = scene.add_material(Material::light("lamp", Color::splat(5.0)));
        scene.add("near", Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5), red);
        scene.add("far", Sphere::new(Vec3::new(0.0, 0.0, -6.0), 0.5), lamp);
        scene
    }

    #[test]
    fn test_intersect_returns_closest() {
        let scene = two_spheres();
        let mut counters = RayCounters::default();
        let hit = scene
            .intersect(&Ray::new(Vec3::ZERO, Vec3::NEG_Z), Interval::forward(), &mut counters)
            .unwrap();

        assert_eq!(hit.object, ObjectId(0));
        assert!((hit.record.t - 1.5).abs() < 1e-4);
        assert_eq!(scene.material(hit.material).name, "red");
        assert_eq!(counters.ray_box, 2);
    }

    #[test]
    fn test_bounding_box_pretest_skips_objects() {
        let mut scene = two_spheres();
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::NEG_Z);

        let mut counters = RayCounters::default();
        assert!(scene.intersect(&ray, Interval::forward(), &mut counters).is_none());
        assert_eq!(counters.ray_box, 2);
        assert_eq!(counters.ray_object, 0);

        scene.set_use_bounding_boxes(false);
        let mut counters = RayCounters::default();
        assert!(scene.intersect(&ray, Interval::forward(), &mut counters).is_none());
        assert_eq!(counters.ray_box, 0);
        assert_eq!(counters.ray_object, 2);
    }

    #[test]
    fn test_tie_goes_to_first_object() {
        let mut scene = Scene::new();
        let a = scene.add_material(Material::diffuse("a", Color::ONE));
        let b = scene.add_material(Material::diffuse("b", Color::ZERO));
        scene.add("first", AxisAlignedRect::xy(-1.0, 1.0, -1.0, 1.0, -2.0), a);
        scene.add("second", AxisAlignedRect::xy(-1.0, 1.0, -1.0, 1.0, -2.0), b);

        let hit = scene
            .intersect(&Ray::new(Vec3::ZERO, Vec3::NEG_Z), Interval::forward(), &mut RayCounters::default())
            .unwrap();
        assert_eq!(hit.object, ObjectId(0));
    }

    #[test]
    fn test_query_lights() {
        let scene = two_spheres();
        assert_eq!(scene.query_lights(), vec![ObjectId(1)]);
        assert!(Scene::new().query_lights().is_empty());
    }

    #[test]
    fn test_unknown_material_falls_back_to_default() {
        let mut scene = Scene::new();
        let id = scene.add_named("ball", Sphere::new(Vec3::ZERO, 1.0), "missing");
        let object = scene.object(id).unwrap();
        assert_eq!(object.material, MaterialId::DEFAULT);
        assert_eq!(scene.material(object.material).color, Color::splat(0.5));
    }

    #[test]
    fn test_material_replacement_keeps_handle() {
        let mut library = MaterialLibrary::new();
        let first = library.insert(Material::diffuse("paint", Color::ONE));
        let second = library.insert(Material::diffuse("paint", Color::ZERO));
        assert_eq!(first, second);
        assert_eq!(library.get(first).color, Color::ZERO);
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn test_refractive_mesh_keeps_backfaces() {
        let mut scene = Scene::new();
        let glass = scene.add_material(Material::diffuse("glass", Color::ONE).with_refraction(1.0, 1.5));
        let face = TriangleFace::new(Vec3::ZERO, Vec3::X, Vec3::Y);
        let opaque = scene.add_named("opaque", TriangleMesh::new(vec![face]), "");
        let clear = scene.add("clear", TriangleMesh::new(vec![face]), glass);

        let drops = |id: ObjectId| match &scene.object(id).unwrap().shape {
            Shape::Mesh(mesh) => mesh.drop_backface(),
            _ => unreachable!(),
        };
        assert!(drops(opaque));
        assert!(!drops(clear));
    }

    #[test]
    fn test_replaced_material_updates_mesh_backfaces() {
        let mut scene = Scene::new();
        let first = scene.add_material(Material::diffuse("pane", Color::ONE));
        let face = TriangleFace::new(Vec3::ZERO, Vec3::X, Vec3::Y);
        let pane = scene.add("pane", TriangleMesh::new(vec![face]), first);

        // Ray from behind the triangle
        let ray = Ray::new(Vec3::new(0.2, 0.2, -1.0), Vec3::Z);
        let mut counters = RayCounters::default();
        assert!(scene.intersect(&ray, Interval::forward(), &mut counters).is_none());

        let glass = scene.add_material(Material::diffuse("pane", Color::ONE).with_refraction(1.0, 1.5));
        assert_eq!(glass, first);
        let hit = scene.intersect(&ray, Interval::forward(), &mut counters).unwrap();
        assert_eq!(hit.object, pane);
        assert!(!hit.record.front_face);

        // And back to opaque
        scene.add_material(Material::diffuse("pane", Color::ONE));
        assert!(scene.intersect(&ray, Interval::forward(), &mut counters).is_none());
    }

    #[test]
    fn test_structural_hash_tracks_changes() {
        let a = two_spheres();
        let b = two_spheres();
        assert_eq!(a.structural_hash(), b.structural_hash());

        let mut c = two_spheres();
        c.add_named("extra", Sphere::new(Vec3::Y, 0.1), "red");
        assert_ne!(a.structural_hash(), c.structural_hash());

        let mut d = Scene::new();
        let red = d.add_material(Material::diffuse("red", Color::new(0.9, 0.0, 0.0)));
        let lamp = d.add_material(Material::light("lamp", Color::splat(5.0)));
        d.add("near", Sphere::new(Vec3::new(0.0, 0.0, -2.0), 0.5), red);
        d.add("far", Sphere::new(Vec3::new(0.0, 0.0, -6.0), 0.5), lamp);
        assert_ne!(a.structural_hash(), d.structural_hash());
    }

    #[test]
    fn test_from_description() {
        let description = load_scene_from_str(
            r#"{
                "materials": [ { "name": "lamp", "kind": "light", "emitted_color": [2, 2, 2] } ],
                "objects": [
                    { "name": "sun", "shape": { "type": "sphere", "center": [0, 5, 0], "radius": 1 }, "material": "lamp" },
                    { "name": "floor", "shape": { "type": "rect", "plane": "xz", "a0": -5, "a1": 5, "b0": -5, "b1": 5, "k": 0 } }
                ]
            }"#,
        )
        .unwrap();

        let scene = Scene::from_description(&description);
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.query_lights(), vec![ObjectId(0)]);
        assert_eq!(scene.objects()[1].material, MaterialId::DEFAULT);
        assert!(matches!(scene.objects()[1].shape, Shape::Rect(_)));
    }
}
