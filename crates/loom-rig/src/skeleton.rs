//! Skeleton pose access.

use std::collections::HashMap;

use loom_math::{Mat4, Vec3};
use loom_types::BoneId;

/// Read access to an evaluated skeleton pose.
///
/// Implemented by the animation system; the cloth layer only reads it.
pub trait SkeletonPose {
    /// Looks up a bone by name.
    fn find_bone_index(&self, name: &str) -> Option<BoneId>;

    /// World transform of `bone` for the current frame.
    fn bone_world_transform(&self, bone: BoneId) -> Option<Mat4>;
}

/// A flat list of named bones with world transforms.
#[derive(Debug, Clone, Default)]
pub struct Pose {
    names: Vec<String>,
    transforms: Vec<Mat4>,
    name_to_index: HashMap<String, usize>,
}

impl Pose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a bone, or replaces the transform of an existing bone with the same name.
    pub fn add_bone(&mut self, name: &str, world: Mat4) -> BoneId {
        if let Some(&i) = self.name_to_index.get(name) {
            self.transforms[i] = world;
            return BoneId(i as u32);
        }
        let index = self.names.len();
        self.name_to_index.insert(name.to_string(), index);
        self.names.push(name.to_string());
        self.transforms.push(world);
        BoneId(index as u32)
    }

    /// Sets a bone's world transform. Returns false for an unknown bone.
    pub fn set_world_transform(&mut self, bone: BoneId, world: Mat4) -> bool {
        match self.transforms.get_mut(bone.index()) {
            Some(t) => {
                *t = world;
                true
            }
            None => false,
        }
    }

    /// Moves a bone to `translation`, keeping its rotation and scale.
    pub fn set_translation(&mut self, bone: BoneId, translation: Vec3) -> bool {
        match self.transforms.get_mut(bone.index()) {
            Some(t) => {
                t.w_axis = translation.extend(1.0);
                true
            }
            None => false,
        }
    }

    pub fn bone_count(&self) -> usize {
        self.names.len()
    }

    pub fn bone_name(&self, bone: BoneId) -> Option<&str> {
        self.names.get(bone.index()).map(String::as_str)
    }
}

impl SkeletonPose for Pose {
    fn find_bone_index(&self, name: &str) -> Option<BoneId> {
        self.name_to_index.get(name).map(|&i| BoneId(i as u32))
    }

    fn bone_world_transform(&self, bone: BoneId) -> Option<Mat4> {
        self.transforms.get(bone.index()).copied()
    }
}
