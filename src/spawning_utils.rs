// src/spawning_utils.rs

use crate::components::PointKind;
use bevy::prelude::*;

/// Sphere radius and color for each kind of point. Atoms are drawn at twice
/// the size of electrons, green versus red.
pub fn get_point_visuals(kind: PointKind) -> (f32, Color) {
    match kind {
        PointKind::Atom => (0.1, Color::srgb(0.0, 1.0, 0.0)),
        PointKind::Electron => (0.05, Color::srgb(1.0, 0.0, 0.0)),
    }
}
