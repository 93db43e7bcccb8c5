//! Host integration surface: the explode input, the selection output, and the
//! bridge from window input to the explorer's pointer/resize events.

use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use bevy::window::{CursorMoved, PrimaryWindow, WindowCloseRequested, WindowResized};
use crossbeam_channel::{Receiver, Sender};

use crate::camera::Viewport;
use crate::layers::LayerId;
use crate::lifecycle::UnmountExplorer;

/// Host-controlled explode amount, clamped to `[0, 2]` in steps of 0.01.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct ExplodeAmount(f32);

impl ExplodeAmount {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 2.0;
    pub const STEP: f32 = 0.01;

    pub fn new(value: f32) -> Self {
        if !value.is_finite() {
            return Self(Self::MIN);
        }
        let stepped = (value.clamp(Self::MIN, Self::MAX) / Self::STEP).round() * Self::STEP;
        Self(stepped.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(&self) -> f32 {
        self.0
    }

    pub fn set(&mut self, value: f32) {
        *self = Self::new(value);
    }
}

impl Default for ExplodeAmount {
    fn default() -> Self {
        Self(1.0)
    }
}

/// Emitted whenever a click changes (or re-affirms) the selection.
#[derive(Event, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerSelected(pub Option<LayerId>);

impl LayerSelected {
    /// Wire form of the selection: the layer name, or `""` for none.
    pub fn wire_name(&self) -> &'static str {
        self.0.map_or("", LayerId::as_str)
    }
}

/// Receives selection changes on behalf of the host.
pub trait SelectionListener: Send + Sync + 'static {
    fn layer_selected(&self, selection: Option<LayerId>);
}

impl<F> SelectionListener for F
where
    F: Fn(Option<LayerId>) + Send + Sync + 'static,
{
    fn layer_selected(&self, selection: Option<LayerId>) {
        self(selection)
    }
}

/// Forwards selections into a channel the host drains at its own pace.
pub struct ChannelListener(Sender<Option<LayerId>>);

impl SelectionListener for ChannelListener {
    fn layer_selected(&self, selection: Option<LayerId>) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.0.send(selection);
    }
}

/// Creates a listener and the receiver its selections arrive on.
pub fn selection_channel() -> (ChannelListener, Receiver<Option<LayerId>>) {
    let (tx, rx) = crossbeam_channel::unbounded();
    (ChannelListener(tx), rx)
}

/// Registered host listeners.
#[derive(Resource, Default)]
pub struct SelectionListeners(pub Vec<Box<dyn SelectionListener>>);

impl SelectionListeners {
    pub fn push(&mut self, listener: impl SelectionListener) {
        self.0.push(Box::new(listener));
    }

    pub fn notify(&self, selection: Option<LayerId>) {
        for listener in &self.0 {
            listener.layer_selected(selection);
        }
    }
}

/// Pointer moved to `position` (viewport pixels).
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct PointerMoved {
    pub position: Vec2,
}

/// Primary button pressed at `position` (viewport pixels).
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct PointerClicked {
    pub position: Vec2,
}

/// The mount container changed size.
#[derive(Event, Clone, Copy, Debug, PartialEq)]
pub struct ViewportResized {
    pub width: f32,
    pub height: f32,
}

/// Set by host UI when it owns the pointer this frame.
#[derive(Resource, Default, Debug)]
pub struct PointerCapture {
    pub captured: bool,
}

/// Measured size of the mount container, `None` until it is known.
#[derive(Resource, Default, Clone, Copy, Debug, PartialEq)]
pub struct MountTarget {
    pub size: Option<Vec2>,
}

impl MountTarget {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Some(Vec2::new(width, height)),
        }
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.size.and_then(|size| Viewport::new(size.x, size.y))
    }
}

/// Keeps [`MountTarget`] in sync with the primary window.
pub fn sync_mount_target_system(
    windows: Query<&Window, With<PrimaryWindow>>,
    mut target: ResMut<MountTarget>,
) {
    let Ok(window) = windows.get_single() else {
        return;
    };
    let size = Some(Vec2::new(window.width(), window.height()));
    if target.size != size {
        target.size = size;
    }
}

/// Translates window input into explorer events. This system is the
/// explorer's "listener": it only runs while listeners are attached.
#[allow(clippy::too_many_arguments)]
pub fn pointer_bridge_system(
    mouse: Res<ButtonInput<MouseButton>>,
    mut cursor: EventReader<CursorMoved>,
    mut resized: EventReader<WindowResized>,
    windows: Query<(Entity, &Window), With<PrimaryWindow>>,
    capture: Res<PointerCapture>,
    mut moved: EventWriter<PointerMoved>,
    mut clicked: EventWriter<PointerClicked>,
    mut viewport_resized: EventWriter<ViewportResized>,
) {
    let Ok((primary, window)) = windows.get_single() else {
        cursor.clear();
        resized.clear();
        return;
    };

    if let Some(last) = resized.read().filter(|e| e.window == primary).last() {
        viewport_resized.send(ViewportResized {
            width: last.width,
            height: last.height,
        });
    }

    let last_move = cursor
        .read()
        .filter(|e| e.window == primary)
        .last()
        .map(|e| e.position);

    if capture.captured {
        return;
    }

    if let Some(position) = last_move {
        moved.send(PointerMoved { position });
    }

    if mouse.just_pressed(MouseButton::Left) {
        if let Some(position) = window.cursor_position() {
            clicked.send(PointerClicked { position });
        }
    }
}

/// Tears the explorer down before its window goes away.
pub fn unmount_on_close_system(
    mut close: EventReader<WindowCloseRequested>,
    mut unmount: EventWriter<UnmountExplorer>,
) {
    if close.read().count() > 0 {
        unmount.send(UnmountExplorer);
    }
}

/// Registers the raw input events the bridge and orbit controls read, so the
/// explorer also runs in apps without the window/input plugins.
pub(crate) fn register_input_events(app: &mut App) {
    app.init_resource::<ButtonInput<MouseButton>>()
        .add_event::<MouseMotion>()
        .add_event::<MouseWheel>()
        .add_event::<CursorMoved>()
        .add_event::<WindowResized>()
        .add_event::<WindowCloseRequested>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explode_amount_is_clamped_and_stepped() {
        assert_eq!(ExplodeAmount::new(-1.0).get(), 0.0);
        assert_eq!(ExplodeAmount::new(5.0).get(), 2.0);
        assert_eq!(ExplodeAmount::new(f32::NAN).get(), 0.0);
        assert!((ExplodeAmount::new(0.123).get() - 0.12).abs() < 1e-6);
        assert!((ExplodeAmount::new(1.996).get() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn wire_name_is_empty_for_no_selection() {
        assert_eq!(LayerSelected(None).wire_name(), "");
        assert_eq!(LayerSelected(Some(LayerId::Mesh)).wire_name(), "mesh");
    }

    #[test]
    fn listeners_receive_every_notification() {
        let (listener, rx) = selection_channel();
        let mut listeners = SelectionListeners::default();
        listeners.push(listener);

        listeners.notify(Some(LayerId::Gfcr));
        listeners.notify(None);
        listeners.notify(None);

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received, vec![Some(LayerId::Gfcr), None, None]);
    }

    #[test]
    fn closure_listener_is_called() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut listeners = SelectionListeners::default();
        listeners.push(move |_: Option<LayerId>| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        listeners.notify(Some(LayerId::Finishing));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn mount_target_rejects_zero_size() {
        assert!(MountTarget::default().viewport().is_none());
        assert!(MountTarget::new(0.0, 300.0).viewport().is_none());
        assert_eq!(
            MountTarget::new(800.0, 600.0).viewport(),
            Viewport::new(800.0, 600.0)
        );
    }
}
