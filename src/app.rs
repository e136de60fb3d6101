//! Application context: one object owning the store, the views and the
//! form session, driven by discrete interaction events.

use crate::dlog;
use crate::error::{Error, Result, ValidationError};
use crate::reconcile::{MapWidget, Reconciler, WorkoutListView};
use crate::session::{FormCommand, Session, SessionState, Submission};
use crate::storage::Storage;
use crate::store::WorkoutStore;
use crate::types::{Coords, FormField, FormValues, ViewOptions, WorkoutKind};
use crate::workout::{Workout, WorkoutFields};
use serde::Deserialize;

pub const DEFAULT_ZOOM: u8 = 13;
pub const DEFAULT_SLOT: &str = "workouts";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub zoom: u8,
    pub pan_duration_secs: f64,
    pub slot: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            zoom: DEFAULT_ZOOM,
            pan_duration_secs: 1.0,
            slot: DEFAULT_SLOT.to_string(),
        }
    }
}

/// The form as the core sees it.
pub trait FormSurface {
    fn apply(&mut self, cmd: &FormCommand);

    /// Blocking user-facing message.
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapStatus {
    /// Waiting on the position request.
    Pending,
    Ready,
    /// Position request failed; no map for the rest of the session.
    Unavailable,
}

pub struct App<M, L, F, S>
where
    M: MapWidget,
    L: WorkoutListView,
    F: FormSurface,
    S: Storage,
{
    config: AppConfig,
    store: WorkoutStore,
    views: Reconciler<M, L>,
    session: Session,
    form: F,
    storage: S,
    map_status: MapStatus,
}

impl<M, L, F, S> App<M, L, F, S>
where
    M: MapWidget,
    L: WorkoutListView,
    F: FormSurface,
    S: Storage,
{
    /// Restore persisted workouts and list them. Markers follow once the
    /// position resolves.
    pub fn start(config: AppConfig, map: M, list: L, form: F, storage: S) -> Result<Self> {
        let store = match storage.load(&config.slot)? {
            None => WorkoutStore::new(),
            Some(json) => match WorkoutStore::restore_json(&json) {
                Ok(restored) => {
                    if !restored.rejected.is_empty() {
                        tracing::warn!(
                            rejected = restored.rejected.len(),
                            "some persisted workouts could not be restored"
                        );
                    }
                    restored.store
                }
                Err(e) => {
                    tracing::warn!(slot = %config.slot, err = %e, "persisted slot unreadable; starting empty");
                    WorkoutStore::new()
                }
            },
        };
        tracing::info!(workouts = store.len(), "restored");

        let mut views = Reconciler::new(map, list);
        views.render_list(store.iter());

        Ok(Self {
            config,
            store,
            views,
            session: Session::new(),
            form,
            storage,
            map_status: MapStatus::Pending,
        })
    }

    pub const fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub const fn views(&self) -> &Reconciler<M, L> {
        &self.views
    }

    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub const fn form(&self) -> &F {
        &self.form
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    pub const fn map_status(&self) -> MapStatus {
        self.map_status
    }

    /// Completion of the one-shot position request. Later calls are ignored.
    pub fn position_resolved(&mut self, position: Result<Coords>) {
        if self.map_status != MapStatus::Pending {
            dlog!("position_already_resolved status={:?}", self.map_status);
            return;
        }
        match position {
            Ok(center) => {
                self.views
                    .attach_map(center, self.config.zoom, self.store.iter());
                self.map_status = MapStatus::Ready;
            }
            Err(e) => {
                tracing::warn!(err = %e, "no position; continuing without a map");
                self.map_status = MapStatus::Unavailable;
                self.form.alert("Could not get your position");
            }
        }
    }

    pub fn map_clicked(&mut self, coords: Coords) {
        if self.map_status != MapStatus::Ready {
            dlog!("map_click_without_map coords={coords}");
            return;
        }
        self.session.map_click(coords);
        self.flush_form();
    }

    pub fn kind_toggled(&mut self, kind: WorkoutKind) {
        self.session.toggle_kind(kind);
        self.flush_form();
    }

    pub fn field_focused(&mut self, field: FormField) {
        self.session.focus(field);
    }

    /// Submit gesture. Only storage failures are returned as errors;
    /// validation problems are shown to the user and leave the form open.
    pub fn submit(&mut self, values: FormValues) -> Result<Submission> {
        let submission = self.session.submit(values);
        self.flush_form();

        match &submission {
            Submission::Create(w) => self.commit_create(w)?,
            Submission::Edit { id, fields } => {
                if let Some(e) = self.commit_edit(id, *fields)? {
                    return Ok(Submission::Rejected(e));
                }
            }
            Submission::Rejected(e) => self.form.alert(&e.to_string()),
            Submission::FocusAdvanced(_) | Submission::Ignored => {}
        }

        Ok(submission)
    }

    pub fn cancel(&mut self) {
        self.session.cancel();
        self.flush_form();
    }

    /// Open the form to edit workout `id`. Unknown ids are a logged no-op.
    pub fn edit_requested(&mut self, id: &str) {
        match self.store.find_by_id(id) {
            Ok(w) => {
                self.session.begin_edit(w);
                self.flush_form();
            }
            Err(e) => tracing::warn!(err = %e, "edit ignored"),
        }
    }

    /// Delete workout `id` with its entry and marker. Deleting twice is a no-op.
    pub fn delete_requested(&mut self, id: &str) -> Result<()> {
        if matches!(self.session.state(), SessionState::Editing { id: editing } if editing == id)
        {
            self.cancel();
        }

        self.views.on_delete(id);
        match self.store.remove(id) {
            Ok(_) => {
                tracing::info!(id = %id, "workout deleted");
                self.persist()
            }
            Err(Error::NotFound(_)) => {
                dlog!("delete_repeated id={id}");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Pan the map to the clicked list entry's workout.
    pub fn entry_clicked(&mut self, id: &str) {
        let Ok(w) = self.store.find_by_id(id) else {
            tracing::warn!(id = %id, "clicked entry has no workout");
            return;
        };
        let opts = ViewOptions {
            animate: true,
            pan_duration_secs: self.config.pan_duration_secs,
        };
        self.views.focus(w, self.config.zoom, opts);
    }

    /// Remove every workout and clear the slot.
    pub fn reset(&mut self) -> Result<()> {
        self.cancel();
        for w in self.store.clear() {
            self.views.on_delete(w.id());
        }
        self.storage.clear(&self.config.slot)?;
        tracing::info!("all workouts removed");
        Ok(())
    }

    fn commit_create(&mut self, w: &Workout) -> Result<()> {
        self.store.add(w.clone())?;
        self.views.on_create(w);
        tracing::info!(id = %w.id(), kind = %w.kind(), "workout logged");
        self.persist()
    }

    /// Returns the validation error if the edit could not be applied.
    fn commit_edit(&mut self, id: &str, fields: WorkoutFields) -> Result<Option<ValidationError>> {
        let Ok(current) = self.store.find_by_id(id) else {
            tracing::warn!(id = %id, "edited workout no longer exists");
            return Ok(None);
        };
        let mut updated = current.clone();
        let outcome = match updated.apply_edit(fields) {
            Ok(o) => o,
            Err(e) => {
                self.form.alert(&e.to_string());
                return Ok(Some(e));
            }
        };
        self.views.on_edit(&updated, outcome);
        self.store.replace(id, updated)?;
        tracing::info!(id = %id, ?outcome, "workout edited");
        self.persist()?;
        Ok(None)
    }

    fn persist(&mut self) -> Result<()> {
        let json = self.store.to_json()?;
        self.storage.save(&self.config.slot, &json)?;
        dlog!("persisted workouts={}", self.store.len());
        Ok(())
    }

    fn flush_form(&mut self) {
        for cmd in self.session.drain_commands() {
            self.form.apply(&cmd);
        }
    }
}
