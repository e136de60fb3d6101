//! Terminal stand-ins for the map, list and form surfaces.

use crate::app::FormSurface;
use crate::dlog;
use crate::reconcile::{MapWidget, WorkoutListView};
use crate::session::FormCommand;
use crate::types::{Coords, ListEntry, Popup, ViewOptions, WorkoutKind};

/// Tracks markers by handle and logs what a map would draw.
#[derive(Debug, Default)]
pub struct TextMap {
    next: u32,
    markers: Vec<(u32, Coords, String)>,
}

impl TextMap {
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

impl MapWidget for TextMap {
    type Marker = u32;

    fn load(&mut self, center: Coords, zoom: u8) {
        tracing::info!(%center, zoom, "map loaded");
    }

    fn add_marker(&mut self, at: Coords, popup: &Popup) -> u32 {
        self.next += 1;
        dlog!("marker_add handle={} at={at} popup={:?}", self.next, popup.content);
        self.markers.push((self.next, at, popup.content.clone()));
        self.next
    }

    fn remove_marker(&mut self, marker: &u32) {
        dlog!("marker_remove handle={marker}");
        self.markers.retain(|(h, _, _)| h != marker);
    }

    fn set_view(&mut self, at: Coords, zoom: u8, opts: ViewOptions) {
        tracing::info!(%at, zoom, animate = opts.animate, "map view moved");
    }
}

/// Keeps entries in display order.
#[derive(Debug, Default)]
pub struct TextList {
    entries: Vec<ListEntry>,
}

impl TextList {
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    fn slot(&mut self, id: &str) -> Option<&mut ListEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }
}

impl WorkoutListView for TextList {
    fn append_entry(&mut self, entry: &ListEntry) {
        self.entries.push(entry.clone());
    }

    fn update_entry(&mut self, entry: &ListEntry) -> bool {
        let Some(e) = self.slot(&entry.id) else {
            return false;
        };
        e.title.clone_from(&entry.title);
        e.stats.clone_from(&entry.stats);
        true
    }

    fn rerender_entry(&mut self, entry: &ListEntry, previous: WorkoutKind) -> bool {
        let Some(e) = self.slot(&entry.id) else {
            return false;
        };
        dlog!("entry_class_swap id={} from={previous} to={}", entry.id, entry.kind);
        *e = entry.clone();
        true
    }

    fn remove_entry(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }
}

/// Form commands are only logged; alerts go to the log as warnings.
#[derive(Debug, Default)]
pub struct TextForm;

impl FormSurface for TextForm {
    fn apply(&mut self, cmd: &FormCommand) {
        dlog!("form {cmd:?}");
    }

    fn alert(&mut self, message: &str) {
        tracing::warn!("{message}");
    }
}

/// `id  title  icon value unit ...`, one line per entry.
pub fn format_entry(e: &ListEntry) -> String {
    let stats: Vec<String> = e
        .stats
        .iter()
        .map(|s| format!("{} {} {}", s.icon, s.value, s.unit))
        .collect();
    format!("{}\t{}\t{}", e.id, e.title, stats.join("  "))
}
