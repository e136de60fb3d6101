use crate::dlog;
use crate::types::{Coords, ListEntry, Popup, ViewOptions, WorkoutKind};
use crate::workout::{EditOutcome, Workout};
use std::collections::HashMap;
use std::fmt::Debug;

/// The map widget as the core sees it.
///
/// Click events flow the other way: the host forwards them to
/// [`App::map_clicked`](crate::app::App::map_clicked).
pub trait MapWidget {
    type Marker: Clone + PartialEq + Debug;

    /// Create the map centred on `center`.
    fn load(&mut self, center: Coords, zoom: u8);

    fn add_marker(&mut self, at: Coords, popup: &Popup) -> Self::Marker;

    fn remove_marker(&mut self, marker: &Self::Marker);

    fn set_view(&mut self, at: Coords, zoom: u8, opts: ViewOptions);
}

/// The rendered workout list. Entries are addressed by workout id.
pub trait WorkoutListView {
    fn append_entry(&mut self, entry: &ListEntry);

    /// Refresh the text of an existing entry. Returns false if absent.
    fn update_entry(&mut self, entry: &ListEntry) -> bool;

    /// Re-render an entry's whole content, swapping its kind class from
    /// `previous`. Returns false if absent.
    fn rerender_entry(&mut self, entry: &ListEntry, previous: WorkoutKind) -> bool;

    /// Returns false if absent.
    fn remove_entry(&mut self, id: &str) -> bool;
}

/// Keeps list entries and map markers in lockstep with the store.
///
/// Markers are indexed by workout id; nothing is correlated by coordinates.
pub struct Reconciler<M: MapWidget, L: WorkoutListView> {
    map: M,
    list: L,
    map_ready: bool,
    markers: HashMap<String, M::Marker>,
    here: Option<M::Marker>,
}

impl<M: MapWidget, L: WorkoutListView> Reconciler<M, L> {
    pub fn new(map: M, list: L) -> Self {
        Self {
            map,
            list,
            map_ready: false,
            markers: HashMap::new(),
            here: None,
        }
    }

    pub const fn map(&self) -> &M {
        &self.map
    }

    pub const fn list(&self) -> &L {
        &self.list
    }

    pub const fn map_ready(&self) -> bool {
        self.map_ready
    }

    pub fn marker_for(&self, id: &str) -> Option<&M::Marker> {
        self.markers.get(id)
    }

    /// Resolve a marker interaction back to its workout.
    pub fn workout_for_marker(&self, marker: &M::Marker) -> Option<&str> {
        self.markers
            .iter()
            .find(|(_, m)| *m == marker)
            .map(|(id, _)| id.as_str())
    }

    /// Marker placed at the user's own position when the map loaded.
    pub const fn current_location_marker(&self) -> Option<&M::Marker> {
        self.here.as_ref()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Load the map at the user's position and add markers for workouts
    /// that were listed before the map existed.
    pub fn attach_map<'a>(
        &mut self,
        center: Coords,
        zoom: u8,
        workouts: impl IntoIterator<Item = &'a Workout>,
    ) {
        self.map.load(center, zoom);
        self.map_ready = true;
        self.here = Some(
            self.map
                .add_marker(center, &Popup::sticky("Current Location", None)),
        );

        for w in workouts {
            self.add_marker(w);
        }
        tracing::info!(markers = self.markers.len(), "map ready");
    }

    /// List entries for restored workouts; markers wait for the map.
    pub fn render_list<'a>(&mut self, workouts: impl IntoIterator<Item = &'a Workout>) {
        for w in workouts {
            self.list.append_entry(&w.list_entry());
        }
    }

    /// Marker first, then the list entry.
    pub fn on_create(&mut self, w: &Workout) {
        self.add_marker(w);
        self.list.append_entry(&w.list_entry());
    }

    /// Remove the entry and marker for `id`. Absent parts are a no-op.
    pub fn on_delete(&mut self, id: &str) {
        if !self.list.remove_entry(id) {
            dlog!("list_entry_absent id={id}");
        }
        match self.markers.remove(id) {
            Some(m) => self.map.remove_marker(&m),
            None => dlog!("marker_absent id={id}"),
        }
    }

    pub fn on_edit(&mut self, w: &Workout, outcome: EditOutcome) {
        let entry = w.list_entry();
        match outcome {
            EditOutcome::SameKind => {
                if !self.list.update_entry(&entry) {
                    tracing::warn!(id = %w.id(), "edited workout has no list entry");
                }
            }
            EditOutcome::KindChanged { previous } => {
                if let Some(m) = self.markers.remove(w.id()) {
                    self.map.remove_marker(&m);
                }
                self.add_marker(w);
                if !self.list.rerender_entry(&entry, previous) {
                    tracing::warn!(id = %w.id(), "edited workout has no list entry");
                }
            }
        }
    }

    /// Pan to a workout's marker.
    pub fn focus(&mut self, w: &Workout, zoom: u8, opts: ViewOptions) {
        if self.map_ready {
            self.map.set_view(w.coords(), zoom, opts);
        } else {
            dlog!("focus_without_map id={}", w.id());
        }
    }

    fn add_marker(&mut self, w: &Workout) {
        if !self.map_ready {
            dlog!("marker_deferred id={}", w.id());
            return;
        }
        let m = self.map.add_marker(w.coords(), &w.popup());
        if let Some(old) = self.markers.insert(w.id().to_string(), m) {
            // Never expected; keep the map consistent with the index anyway.
            self.map.remove_marker(&old);
        }
    }
}
