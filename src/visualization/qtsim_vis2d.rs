use bevy::ecs::system::Local;
use bevy::math::primitives::Circle;
use bevy::prelude::*;
use bevy::sprite::{MaterialMesh2dBundle, Mesh2dHandle};

use crate::simulation::scenario::{FrameInput, Scenario};
use crate::simulation::states::{BodyColor, NVec2};

/// Ties a circle mesh to its body in `Scenario.stepper`
#[derive(Component)]
struct BodyIndex(pub usize);

#[derive(Component)]
struct HudText;

/// Occupant-count labels, rebuilt every frame while the overlay is on
#[derive(Component)]
struct OverlayLabel;

const SPAWN_KEY: KeyCode = KeyCode::Space;
const PAUSE_KEY: KeyCode = KeyCode::KeyA;
const OVERLAY_KEY: KeyCode = KeyCode::KeyQ;

const OVERLAY_COLOR: Color = Color::srgb(1.0, 0.0, 0.0);

pub fn run_2d(scenario: Scenario) {
    let width = scenario.stepper.params().width as f32;
    let height = scenario.stepper.params().height as f32;

    App::new()
        .insert_resource(scenario)
        .insert_resource(ClearColor(Color::WHITE))
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "qtsim".into(),
                resolution: (width, height).into(),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_systems(Startup, setup_system)
        .add_systems(
            Update,
            (
                physics_step_system,
                spawn_meshes_system,
                sync_transforms_system,
                overlay_system,
                hud_system,
            )
                .chain(),
        )
        .run();
}

/// Arena (top-left origin, y down) to Bevy world (centred, y up)
fn to_world(x: &NVec2, scenario: &Scenario) -> Vec2 {
    let p = scenario.stepper.params();
    Vec2::new(
        (x.x - p.width * 0.5) as f32,
        (p.height * 0.5 - x.y) as f32,
    )
}

fn to_bevy_color(c: BodyColor) -> Color {
    Color::srgba_u8(c.r, c.g, c.b, c.a)
}

fn setup_system(mut commands: Commands, scenario: Res<Scenario>) {
    info!(
        "qtsim viewer: {} bodies, broad phase {}",
        scenario.stepper.bodies().len(),
        scenario.stepper.index().name()
    );

    // 2D camera
    commands.spawn(Camera2dBundle::default());

    commands.spawn((
        TextBundle::from_section(
            "",
            TextStyle {
                font_size: 20.0,
                color: Color::BLACK,
                ..default()
            },
        )
        .with_style(Style {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        }),
        HudText,
    ));
}

/// Read this frame's key presses and feed the elapsed time to the scenario
fn physics_step_system(keys: Res<ButtonInput<KeyCode>>, time: Res<Time>, mut scenario: ResMut<Scenario>) {
    let input = FrameInput {
        spawn: keys.just_pressed(SPAWN_KEY),
        toggle_pause: keys.just_pressed(PAUSE_KEY),
        toggle_overlay: keys.just_pressed(OVERLAY_KEY),
    };

    if let Err(e) = scenario.frame(time.delta_seconds_f64(), input) {
        error!("frame failed: {e}");
    }
}

/// Bodies are never removed, so everything past `spawned` is new
fn spawn_meshes_system(
    mut commands: Commands,
    scenario: Res<Scenario>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut spawned: Local<usize>,
) {
    let bodies = scenario.stepper.bodies();
    for (i, body) in bodies.iter().enumerate().skip(*spawned) {
        let pos = to_world(&body.x, &scenario);
        commands.spawn((
            MaterialMesh2dBundle {
                mesh: Mesh2dHandle(meshes.add(Circle::new(body.r() as f32))),
                material: materials.add(ColorMaterial::from(to_bevy_color(body.color))),
                transform: Transform::from_xyz(pos.x, pos.y, 0.0),
                ..Default::default()
            },
            BodyIndex(i),
        ));
    }
    *spawned = bodies.len();
}

fn sync_transforms_system(scenario: Res<Scenario>, mut query: Query<(&BodyIndex, &mut Transform)>) {
    for (BodyIndex(i), mut transform) in &mut query {
        if let Some(b) = scenario.stepper.bodies().get(*i) {
            let pos = to_world(&b.x, &scenario);
            transform.translation.x = pos.x;
            transform.translation.y = pos.y;
        }
    }
}

/// Outline every non-empty region of the index and label its occupant count
fn overlay_system(
    mut commands: Commands,
    scenario: Res<Scenario>,
    mut gizmos: Gizmos,
    labels: Query<Entity, With<OverlayLabel>>,
) {
    for entity in &labels {
        commands.entity(entity).despawn();
    }
    if !scenario.show_overlay {
        return;
    }

    for region in scenario.stepper.index().regions() {
        let center = to_world(&region.bounds.center(), &scenario);
        let size = region.bounds.size();
        gizmos.rect_2d(center, 0.0, Vec2::new(size.x as f32, size.y as f32), OVERLAY_COLOR);

        if region.occupants > 0 {
            commands.spawn((
                Text2dBundle {
                    text: Text::from_section(
                        region.occupants.to_string(),
                        TextStyle {
                            font_size: 15.0,
                            color: OVERLAY_COLOR,
                            ..default()
                        },
                    ),
                    transform: Transform::from_xyz(center.x, center.y, 1.0),
                    ..default()
                },
                OverlayLabel,
            ));
        }
    }
}

fn hud_system(scenario: Res<Scenario>, mut query: Query<&mut Text, With<HudText>>) {
    let pause_hint = if scenario.stepper.is_paused() {
        "PAUSED - press A to resume."
    } else {
        "Press A to pause."
    };
    let value = format!(
        "{} Small Circles\n{} Big Circles\nPress Q to toggle {} visibility.\n{}",
        scenario.small_count(),
        scenario.big_count(),
        scenario.stepper.index().name(),
        pause_hint,
    );

    for mut text in &mut query {
        text.sections[0].value.clone_from(&value);
    }
}
