use log::{error, info};

use super::panels::Panel;
use crate::types::PanelKind;
use crate::config::AppConfig;
use crate::control::DirectionFlags;
use crate::http::RobotClient;

pub const MAX_SLOTS: usize = 4;

/// One to four content slots, each holding at most one panel.
#[derive(Debug)]
pub struct Layout {
    slots: Vec<Option<Panel>>,
}

impl Layout {
    pub fn new(slot_count: usize) -> Self {
        let mut slots = Vec::with_capacity(MAX_SLOTS);
        slots.resize_with(slot_count.clamp(1, MAX_SLOTS), || None);
        Self { slots }
    }

    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slots_mut(&mut self) -> &mut [Option<Panel>] {
        &mut self.slots
    }

    pub fn kind_at(&self, slot: usize) -> Option<PanelKind> {
        self.slots.get(slot)?.as_ref().map(Panel::kind)
    }

    pub fn contains(&self, kind: PanelKind) -> bool {
        self.panels().any(|p| p.kind() == kind)
    }

    pub fn panels(&self) -> impl Iterator<Item = &Panel> {
        self.slots.iter().flatten()
    }

    pub fn panels_mut(&mut self) -> impl Iterator<Item = &mut Panel> {
        self.slots.iter_mut().flatten()
    }

    /// Resizes the layout. Panels in removed slots are returned for teardown.
    pub fn resize(&mut self, slot_count: usize) -> Vec<Panel> {
        let slot_count = slot_count.clamp(1, MAX_SLOTS);
        let removed: Vec<Panel> = if slot_count < self.slots.len() {
            self.slots.drain(slot_count..).flatten().collect()
        } else {
            Vec::new()
        };
        self.slots.resize_with(slot_count, || None);
        removed
    }

    /// Puts `panel` into `slot`, returning whatever was there.
    pub fn replace(&mut self, slot: usize, panel: Option<Panel>) -> Option<Panel> {
        let entry = self.slots.get_mut(slot)?;
        std::mem::replace(entry, panel)
    }

    /// Empties every slot, keeping the slot count.
    pub fn take_all(&mut self) -> Vec<Panel> {
        self.slots.iter_mut().filter_map(Option::take).collect()
    }
}

/// Requests collected while drawing, applied once the frame is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    SetSlotCount(usize),
    SetPanel { slot: usize, kind: Option<PanelKind> },
}

/// Everything the UI owns: layout, client and settings.
pub struct AppState {
    pub layout: Layout,
    pub client: RobotClient,
    pub config: AppConfig,
    /// Keyboard directions read this frame.
    pub keyboard: DirectionFlags,
    pub status_message: String,
    pub pending: Vec<UiAction>,
}

impl AppState {
    pub fn new(client: RobotClient, config: AppConfig) -> Self {
        Self {
            layout: Layout::new(config.panels.initial_slots),
            client,
            config,
            keyboard: DirectionFlags::NONE,
            status_message: String::new(),
            pending: Vec::new(),
        }
    }

    /// Opens the configured startup panels, one per slot.
    pub fn open_initial_panels(&mut self) {
        let kinds = self.config.panels.initial_panels.clone();
        for (slot, kind) in kinds.into_iter().enumerate() {
            self.set_panel(slot, Some(kind));
        }
    }

    /// Current slot count and panels in slot order. Empty slots are skipped.
    pub fn layout_snapshot(&self) -> (usize, Vec<PanelKind>) {
        (self.layout.slot_count(), self.layout.panels().map(Panel::kind).collect())
    }

    /// Whether `kind` may be placed into `slot` (replacing its current panel).
    pub fn can_place(&self, slot: usize, kind: PanelKind) -> bool {
        if !kind.single_instance() {
            return true;
        }
        if self.layout.kind_at(slot) == Some(kind) {
            return true;
        }
        !self.layout.contains(kind)
    }

    /// Opens `kind` in `slot`, closing whatever was there first.
    pub fn set_panel(&mut self, slot: usize, kind: Option<PanelKind>) {
        if slot >= self.layout.slot_count() || self.layout.kind_at(slot) == kind {
            return;
        }
        if let Some(kind) = kind {
            if !self.can_place(slot, kind) {
                self.status_message = format!("{} is already open", kind.label());
                return;
            }
        }

        if let Some(old) = self.layout.replace(slot, None) {
            old.close(&self.client, false);
        }

        if let Some(kind) = kind {
            match Panel::open(kind, &self.client, &self.config) {
                Ok(panel) => {
                    self.layout.replace(slot, Some(panel));
                    self.status_message = format!("{} added", kind.label());
                }
                Err(e) => {
                    error!("Failed to open {}: {}", kind.label(), e);
                    self.status_message = format!("Failed to open {}: {}", kind.label(), e);
                }
            }
        }
    }

    pub fn set_slot_count(&mut self, slot_count: usize) {
        if slot_count == self.layout.slot_count() {
            return;
        }
        info!("Layout changed to {} slots", slot_count);
        for panel in self.layout.resize(slot_count) {
            panel.close(&self.client, false);
        }
    }

    pub fn apply_pending(&mut self) {
        for action in std::mem::take(&mut self.pending) {
            match action {
                UiAction::SetSlotCount(n) => self.set_slot_count(n),
                UiAction::SetPanel { slot, kind } => self.set_panel(slot, kind),
            }
        }
    }

    /// Tears down every panel and waits for their workers.
    pub fn shutdown(&mut self) {
        for panel in self.layout.take_all() {
            panel.close(&self.client, true);
        }
    }
}
