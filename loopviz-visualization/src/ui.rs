//! Object visibility panel
//!
//! A viewer shell shows one checkbox per tracked object. Checkbox state lives
//! under keys of the form `<object name>__visibility`; changed keys are turned
//! into [`VisibilityEvent`]s and applied to the scene.

use crate::registry::SceneRegistry;
use crate::renderer::Renderer;
use crate::viewer::ModelView;
use indexmap::IndexMap;
use loopviz_core::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Suffix of every visibility state key
pub const VISIBILITY_SUFFIX: &str = "__visibility";

/// State key holding the visibility of `name`
pub fn visibility_key(name: &str) -> String {
    format!("{}{}", name, VISIBILITY_SUFFIX)
}

/// Object name encoded in a visibility state key.
///
/// Only the trailing suffix is stripped, so names may contain `__`.
pub fn parse_visibility_key(key: &str) -> Option<&str> {
    key.strip_suffix(VISIBILITY_SUFFIX).filter(|name| !name.is_empty())
}

/// Request to show or hide one object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityEvent {
    pub object_name: String,
    pub visible: bool,
}

impl VisibilityEvent {
    pub fn new(object_name: impl Into<String>, visible: bool) -> Self {
        Self {
            object_name: object_name.into(),
            visible,
        }
    }

    /// Event for a changed state key, `None` when the key is not a visibility key
    pub fn from_state(key: &str, visible: bool) -> Option<Self> {
        parse_visibility_key(key).map(|name| Self::new(name, visible))
    }
}

/// Receiver of visibility events
pub trait VisibilityHandler {
    /// Apply one event; `Ok(false)` when no object has the event's name
    fn handle_visibility(&mut self, event: &VisibilityEvent) -> Result<bool>;

    fn request_render(&mut self);
}

impl<R: Renderer> VisibilityHandler for ModelView<R> {
    fn handle_visibility(&mut self, event: &VisibilityEvent) -> Result<bool> {
        self.set_visibility(&event.object_name, event.visible)
    }

    fn request_render(&mut self) {
        self.update();
    }
}

/// Apply a batch of events, then request one redraw.
///
/// Events for unknown objects are skipped. Returns how many were applied.
pub fn dispatch_visibility<H, I>(handler: &mut H, events: I) -> Result<usize>
where
    H: VisibilityHandler + ?Sized,
    I: IntoIterator<Item = VisibilityEvent>,
{
    let mut applied = 0;
    for event in events {
        if handler.handle_visibility(&event)? {
            applied += 1;
        } else {
            debug!("Ignoring visibility change for unknown object '{}'", event.object_name);
        }
    }
    handler.request_render();
    Ok(applied)
}

/// One checkbox of the object menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMenuEntry {
    pub name: String,
    pub state_key: String,
    pub visible: bool,
}

/// Checkbox-per-object menu mirroring a scene registry
#[derive(Debug, Clone, Default)]
pub struct ObjectMenu {
    entries: Vec<ObjectMenuEntry>,
}

impl ObjectMenu {
    /// A menu with every registered object checked
    pub fn from_registry(registry: &SceneRegistry) -> Self {
        let mut menu = Self::default();
        menu.sync(registry);
        menu
    }

    /// Follow additions and removals in `registry`, keeping the state of existing entries
    pub fn sync(&mut self, registry: &SceneRegistry) {
        let mut previous: IndexMap<String, bool> = self
            .entries
            .drain(..)
            .map(|entry| (entry.name, entry.visible))
            .collect();
        self.entries = registry
            .names()
            .map(|name| ObjectMenuEntry {
                name: name.to_string(),
                state_key: visibility_key(name),
                visible: previous.swap_remove(name).unwrap_or(true),
            })
            .collect();
    }

    pub fn entries(&self) -> &[ObjectMenuEntry] {
        &self.entries
    }

    /// Current UI state, keyed by visibility key
    pub fn state(&self) -> IndexMap<String, bool> {
        self.entries
            .iter()
            .map(|entry| (entry.state_key.clone(), entry.visible))
            .collect()
    }

    /// Record a state change; false when the menu has no such object
    pub fn set(&mut self, name: &str, visible: bool) -> bool {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => {
                entry.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Draw the checkboxes and return the changes made this frame
    pub fn ui(&mut self, ui: &mut egui::Ui) -> Vec<VisibilityEvent> {
        let mut events = Vec::new();
        for entry in &mut self.entries {
            if ui.checkbox(&mut entry.visible, entry.name.as_str()).changed() {
                events.push(VisibilityEvent::new(entry.name.clone(), entry.visible));
            }
        }
        events
    }

    /// Draw the menu as a side drawer
    pub fn show_drawer(&mut self, ctx: &egui::Context) -> Vec<VisibilityEvent> {
        egui::SidePanel::left("object_menu")
            .resizable(true)
            .show(ctx, |ui| {
                ui.heading("Objects");
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| self.ui(ui)).inner
            })
            .inner
    }
}

/// A model view plus the object menu that controls it
pub struct ViewerShell<R: Renderer> {
    view: ModelView<R>,
    menu: ObjectMenu,
}

impl<R: Renderer> ViewerShell<R> {
    pub fn new(view: ModelView<R>) -> Self {
        let menu = ObjectMenu::from_registry(view.objects());
        Self { view, menu }
    }

    pub fn view(&self) -> &ModelView<R> {
        &self.view
    }

    /// Mutable access to the view; call [`ViewerShell::refresh_menu`] after adding objects
    pub fn view_mut(&mut self) -> &mut ModelView<R> {
        &mut self.view
    }

    pub fn menu(&self) -> &ObjectMenu {
        &self.menu
    }

    pub fn refresh_menu(&mut self) {
        self.menu.sync(self.view.objects());
    }

    /// Apply changed UI state keys.
    ///
    /// Keys that are not visibility keys, or that name no tracked object, are
    /// ignored. A redraw is requested afterwards. Returns how many objects
    /// changed.
    pub fn toggle_visibility<I, K>(&mut self, changes: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, bool)>,
        K: AsRef<str>,
    {
        let events: Vec<VisibilityEvent> = changes
            .into_iter()
            .filter_map(|(key, visible)| VisibilityEvent::from_state(key.as_ref(), visible))
            .filter(|event| self.view.objects().contains(&event.object_name))
            .collect();
        for event in &events {
            self.menu.set(&event.object_name, event.visible);
        }
        dispatch_visibility(&mut self.view, events)
    }

    /// Draw the object drawer and apply whatever was toggled
    pub fn show_drawer(&mut self, ctx: &egui::Context) -> Result<usize> {
        let events = self.menu.show_drawer(ctx);
        if events.is_empty() {
            return Ok(0);
        }
        dispatch_visibility(&mut self.view, events)
    }
}
