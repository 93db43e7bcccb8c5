//! Drives the explorer in a headless app: mount, animation, picking, resize and teardown.

use bevy::pbr::wireframe::Wireframe;
use bevy::prelude::*;
use crossbeam_channel::Receiver;

use layer_explorer::camera::{ExplorerCamera, Viewport};
use layer_explorer::explorer_plugin;
use layer_explorer::host::{
    selection_channel, ExplodeAmount, LayerSelected, MountTarget, PointerClicked, PointerMoved,
    SelectionListeners, ViewportResized,
};
use layer_explorer::layers::{CursorAffordance, HighlightState, LayerId, LayerStack};
use layer_explorer::lifecycle::{
    InputListeners, MountState, RenderLoop, TeardownLog, UnmountExplorer, TEARDOWN_ORDER,
};
use layer_explorer::scene::{ExplorerSurface, LayerLabel, LayerMesh, SharedSurface};

const CENTER: Vec2 = Vec2::new(400.0, 300.0);
const CORNER: Vec2 = Vec2::new(2.0, 2.0);

fn headless_app(target: MountTarget, explode: f32) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .init_resource::<Assets<Mesh>>()
        .init_resource::<Assets<StandardMaterial>>()
        .insert_resource(target)
        .insert_resource(ExplodeAmount::new(explode))
        .add_plugins(explorer_plugin);
    app
}

fn mounted_app(explode: f32) -> (App, Receiver<Option<LayerId>>) {
    let mut app = headless_app(MountTarget::new(800.0, 600.0), explode);
    let (listener, rx) = selection_channel();
    app.world_mut()
        .resource_mut::<SelectionListeners>()
        .push(listener);
    run(&mut app, 2);
    (app, rx)
}

fn run(app: &mut App, frames: usize) {
    for _ in 0..frames {
        app.update();
    }
}

fn count<C: Component>(app: &mut App) -> usize {
    let mut query = app.world_mut().query_filtered::<Entity, With<C>>();
    query.iter(app.world()).count()
}

fn click(app: &mut App, position: Vec2) {
    app.world_mut().send_event(PointerClicked { position });
    app.update();
}

fn move_pointer(app: &mut App, position: Vec2) {
    app.world_mut().send_event(PointerMoved { position });
    app.update();
}

fn selected_events(app: &App) -> Vec<Option<LayerId>> {
    app.world()
        .resource::<Events<LayerSelected>>()
        .iter_current_update_events()
        .map(|event| event.0)
        .collect()
}

#[test]
fn mount_builds_four_layers_and_labels() {
    let (mut app, _rx) = mounted_app(1.0);

    assert_eq!(*app.world().resource::<MountState>(), MountState::Mounted);
    assert!(app.world().resource::<RenderLoop>().is_running());
    assert!(app.world().resource::<InputListeners>().attached);
    assert_eq!(
        *app.world().resource::<Viewport>(),
        Viewport::new(800.0, 600.0).unwrap()
    );

    assert_eq!(count::<LayerMesh>(&mut app), 4);
    assert_eq!(count::<LayerLabel>(&mut app), 4);
    assert_eq!(count::<ExplorerCamera>(&mut app), 1);
    assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 1);
    assert_eq!(app.world().resource::<Assets<StandardMaterial>>().len(), 4);

    let mut wireframes = app
        .world_mut()
        .query_filtered::<&LayerMesh, With<Wireframe>>();
    let wire_layers: Vec<LayerId> = wireframes.iter(app.world()).map(|m| m.0).collect();
    assert_eq!(wire_layers, vec![LayerId::Mesh]);
}

#[test]
fn zero_sized_target_stays_pending_until_measured() {
    let mut app = headless_app(MountTarget::default(), 1.0);
    run(&mut app, 3);

    assert_eq!(*app.world().resource::<MountState>(), MountState::Pending);
    assert_eq!(count::<LayerMesh>(&mut app), 0);
    assert_eq!(app.world().resource::<RenderLoop>().frames(), 0);

    *app.world_mut().resource_mut::<MountTarget>() = MountTarget::new(640.0, 480.0);
    run(&mut app, 2);

    assert_eq!(*app.world().resource::<MountState>(), MountState::Mounted);
    assert_eq!(count::<LayerMesh>(&mut app), 4);
}

#[test]
fn explode_animates_layers_toward_targets() {
    let (mut app, _rx) = mounted_app(1.0);
    run(&mut app, 150);

    let stack = app.world().resource::<LayerStack>().clone();
    for layer in stack.layers() {
        assert!((layer.current_y - layer.stack_offset as f32).abs() < 0.01);
    }

    let mut meshes = app.world_mut().query::<(&LayerMesh, &Transform)>();
    for (layer_mesh, transform) in meshes.iter(app.world()) {
        let expected = stack.get(layer_mesh.0).current_y;
        assert!((transform.translation.y - expected).abs() < 1e-5);
    }

    app.world_mut().resource_mut::<ExplodeAmount>().set(0.0);
    run(&mut app, 150);
    for layer in app.world().resource::<LayerStack>().layers() {
        assert!(layer.current_y.abs() < 0.01);
    }
}

#[test]
fn clicking_empty_space_twice_emits_none_twice() {
    let (mut app, rx) = mounted_app(0.0);

    click(&mut app, CORNER);
    assert_eq!(selected_events(&app), vec![None]);
    click(&mut app, CORNER);
    assert_eq!(selected_events(&app), vec![None]);

    assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![None, None]);
    assert_eq!(
        app.world().resource::<LayerStack>().highlights(),
        [HighlightState::Normal; 4]
    );
}

#[test]
fn clicking_a_layer_selects_it_and_dims_the_rest() {
    let (mut app, rx) = mounted_app(0.0);

    // Collapsed layers coincide; the base layer wins the tie.
    click(&mut app, CENTER);
    assert_eq!(selected_events(&app), vec![Some(LayerId::Gfcr)]);
    assert_eq!(rx.try_recv().ok(), Some(Some(LayerId::Gfcr)));

    let stack = app.world().resource::<LayerStack>();
    assert_eq!(stack.selected(), Some(LayerId::Gfcr));
    assert_eq!(
        stack.highlights(),
        [
            HighlightState::Selected,
            HighlightState::Dimmed,
            HighlightState::Dimmed,
            HighlightState::Dimmed,
        ]
    );

    click(&mut app, CORNER);
    assert_eq!(rx.try_recv().ok(), Some(None));
    assert_eq!(app.world().resource::<LayerStack>().selected(), None);
}

#[test]
fn labels_follow_explode_amount() {
    let (mut app, _rx) = mounted_app(0.0);
    run(&mut app, 2);

    let mut labels = app.world_mut().query::<(&LayerLabel, &Visibility)>();
    assert!(labels
        .iter(app.world())
        .all(|(_, visibility)| *visibility == Visibility::Hidden));

    app.world_mut().resource_mut::<ExplodeAmount>().set(1.0);
    run(&mut app, 1);

    let mut labels = app.world_mut().query::<(&LayerLabel, &Visibility)>();
    assert!(labels
        .iter(app.world())
        .all(|(_, visibility)| *visibility != Visibility::Hidden));
}

#[test]
fn resize_updates_viewport_and_aspect() {
    let (mut app, _rx) = mounted_app(0.0);

    app.world_mut().send_event(ViewportResized {
        width: 400.0,
        height: 300.0,
    });
    app.update();

    let viewport = *app.world().resource::<Viewport>();
    assert_eq!(viewport, Viewport::new(400.0, 300.0).unwrap());
    assert_eq!(viewport.pixel_to_ndc(Vec2::new(200.0, 150.0)), Vec2::ZERO);

    let mut projections = app
        .world_mut()
        .query_filtered::<&Projection, With<ExplorerCamera>>();
    let Projection::Perspective(perspective) = projections.single(app.world()) else {
        panic!("explorer camera should use a perspective projection");
    };
    assert!((perspective.aspect_ratio - 4.0 / 3.0).abs() < 1e-6);
}

#[test]
fn clicks_after_resize_use_the_new_viewport() {
    let (mut app, _rx) = mounted_app(0.0);

    app.world_mut().send_event(ViewportResized {
        width: 400.0,
        height: 300.0,
    });
    app.update();

    // The old centre is now the bottom-right corner, off the surface.
    click(&mut app, CENTER);
    assert_eq!(selected_events(&app), vec![None]);

    click(&mut app, Vec2::new(200.0, 150.0));
    assert_eq!(selected_events(&app), vec![Some(LayerId::Gfcr)]);
}

#[test]
fn hover_then_select_then_move_off() {
    let (mut app, rx) = mounted_app(0.0);

    move_pointer(&mut app, CENTER);
    assert_eq!(
        *app.world().resource::<CursorAffordance>(),
        CursorAffordance::Pointer
    );
    assert_eq!(
        app.world().resource::<LayerStack>().highlights(),
        [
            HighlightState::Hovered,
            HighlightState::Normal,
            HighlightState::Normal,
            HighlightState::Normal,
        ]
    );
    assert!(rx.try_recv().is_err(), "hovering never reports a selection");

    click(&mut app, CENTER);
    assert_eq!(rx.try_recv().ok(), Some(Some(LayerId::Gfcr)));

    move_pointer(&mut app, CORNER);
    assert_eq!(
        *app.world().resource::<CursorAffordance>(),
        CursorAffordance::Default
    );
    let stack = app.world().resource::<LayerStack>();
    assert_eq!(stack.hovered(), None);
    assert_eq!(
        stack.highlights(),
        [
            HighlightState::Selected,
            HighlightState::Dimmed,
            HighlightState::Dimmed,
            HighlightState::Dimmed,
        ]
    );
}

#[test]
fn teardown_releases_everything_and_freezes_state() {
    let (mut app, rx) = mounted_app(0.0);
    click(&mut app, CENTER);
    assert_eq!(rx.try_recv().ok(), Some(Some(LayerId::Gfcr)));

    app.world_mut().send_event(UnmountExplorer);
    app.update();

    assert_eq!(*app.world().resource::<MountState>(), MountState::TornDown);
    assert_eq!(app.world().resource::<TeardownLog>().0, TEARDOWN_ORDER.to_vec());
    assert!(!app.world().resource::<InputListeners>().attached);
    assert!(!app.world().resource::<RenderLoop>().is_running());
    assert!(app.world().get_resource::<SharedSurface>().is_none());
    assert!(app.world().get_resource::<Viewport>().is_none());
    assert_eq!(
        app.world().resource::<AmbientLight>().brightness,
        AmbientLight::default().brightness
    );

    assert_eq!(count::<ExplorerSurface>(&mut app), 0);
    assert_eq!(count::<LayerMesh>(&mut app), 0);
    assert_eq!(count::<LayerLabel>(&mut app), 0);
    assert_eq!(app.world().resource::<Assets<Mesh>>().len(), 0);
    assert_eq!(app.world().resource::<Assets<StandardMaterial>>().len(), 0);

    let frames = app.world().resource::<RenderLoop>().frames();
    let before = app.world().resource::<LayerStack>().clone();

    app.world_mut().resource_mut::<ExplodeAmount>().set(2.0);
    click(&mut app, CORNER);
    app.world_mut().send_event(ViewportResized {
        width: 200.0,
        height: 100.0,
    });
    run(&mut app, 5);

    assert_eq!(app.world().resource::<RenderLoop>().frames(), frames);
    let after = app.world().resource::<LayerStack>();
    assert_eq!(after.selected(), before.selected());
    assert_eq!(after.highlights(), before.highlights());
    for (a, b) in after.layers().iter().zip(before.layers()) {
        assert_eq!(a.current_y, b.current_y);
    }
    assert!(rx.try_recv().is_err());
    assert!(app.world().get_resource::<Viewport>().is_none());
}
