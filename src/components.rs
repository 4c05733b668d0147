// src/components.rs

use bevy::prelude::*;
use std::fmt;

/// The two kinds of particle a simulation output file carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointKind {
    Atom,
    Electron,
}

impl fmt::Display for PointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointKind::Atom => f.write_str("atom"),
            PointKind::Electron => f.write_str("electron"),
        }
    }
}

/// Marks one rendered sphere of the point cloud.
#[derive(Component, Debug, Clone, Copy)]
pub struct CloudPoint(pub PointKind);

/// Atom and electron counts over the given rendered points.
pub fn count_by_kind<'a>(points: impl IntoIterator<Item = &'a CloudPoint>) -> (usize, usize) {
    points
        .into_iter()
        .fold((0, 0), |(atoms, electrons), CloudPoint(kind)| match kind {
            PointKind::Atom => (atoms + 1, electrons),
            PointKind::Electron => (atoms, electrons + 1),
        })
}

/// Parent entity of the currently rendered point cloud.
#[derive(Component)]
pub struct PointCloudRoot;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_rendered_points_per_kind() {
        let mut app = App::new();
        app.world_mut().spawn_batch([
            CloudPoint(PointKind::Atom),
            CloudPoint(PointKind::Electron),
            CloudPoint(PointKind::Atom),
        ]);
        let mut query = app.world_mut().query::<&CloudPoint>();
        assert_eq!(count_by_kind(query.iter(app.world())), (2, 1));
        assert_eq!(count_by_kind(Vec::<&CloudPoint>::new()), (0, 0));
    }
}
