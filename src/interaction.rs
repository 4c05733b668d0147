// src/interaction.rs

use crate::components::CloudPoint;
use bevy::prelude::*;
use bevy_egui::EguiContexts;
use bevy_panorbit_camera::{PanOrbitCamera, PanOrbitCameraSystemSet};

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct InteractionSet;

pub struct InteractionPlugin;

impl Plugin for InteractionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                control_camera_activity.before(PanOrbitCameraSystemSet),
                focus_camera_on_cloud,
            )
                .in_set(InteractionSet),
        );
    }
}

/// The camera ignores the mouse while egui is using it, so typing into the
/// form or scrolling a window does not orbit the scene.
fn control_camera_activity(mut camera_q: Query<&mut PanOrbitCamera>, mut contexts: EguiContexts) {
    let Ok(mut camera) = camera_q.single_mut() else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else { return };

    let should_be_enabled = !(ctx.wants_pointer_input() || ctx.wants_keyboard_input());
    if camera.enabled != should_be_enabled {
        camera.enabled = should_be_enabled;
    }
}

fn focus_camera_on_cloud(
    keys: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut camera_query: Query<&mut PanOrbitCamera>,
    point_query: Query<&GlobalTransform, With<CloudPoint>>,
) {
    if !keys.just_pressed(KeyCode::KeyF) {
        return;
    }
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_keyboard_input() {
            return;
        }
    }
    let (sum, count) = point_query
        .iter()
        .fold((Vec3::ZERO, 0u32), |(sum, n), t| (sum + t.translation(), n + 1));
    if count == 0 {
        return;
    }
    if let Ok(mut camera) = camera_query.single_mut() {
        info!("Focusing camera on point cloud ({} points)", count);
        camera.target_focus = sum / count as f32;
    }
}
