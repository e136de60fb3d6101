//! Form session: whether the workout form is creating, editing, or closed.

use crate::dlog;
use crate::error::ValidationError;
use crate::types::{Coords, FormField, FormValues, WorkoutKind};
use crate::workout::{Workout, WorkoutFields};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    /// Form hidden.
    Idle,
    /// Map was clicked; the form will create a workout at `coords`.
    AwaitingLocation { coords: Coords },
    /// The form will overwrite workout `id`.
    Editing { id: String },
}

/// Instructions for the form surface.
#[derive(Debug, Clone, PartialEq)]
pub enum FormCommand {
    Show { focus: FormField },
    Hide,
    Clear,
    Focus(FormField),
    /// Show cadence for running, elevation for cycling.
    ShowIntensityFor(WorkoutKind),
    Fill(FormValues),
}

/// What a submit gesture amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// Not on the last field yet: focus moved on instead of submitting.
    FocusAdvanced(FormField),
    Create(Workout),
    Edit { id: String, fields: WorkoutFields },
    /// Form stays open.
    Rejected(ValidationError),
    /// Form was not open.
    Ignored,
}

#[derive(Debug)]
pub struct Session {
    state: SessionState,
    kind: WorkoutKind,
    pending_field: FormField,
    outbox: Vec<FormCommand>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub const fn new() -> Self {
        Self {
            state: SessionState::Idle,
            kind: WorkoutKind::Running,
            pending_field: FormField::Distance,
            outbox: Vec::new(),
        }
    }

    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    pub const fn kind(&self) -> WorkoutKind {
        self.kind
    }

    pub const fn pending_field(&self) -> FormField {
        self.pending_field
    }

    pub const fn is_open(&self) -> bool {
        !matches!(self.state, SessionState::Idle)
    }

    /// Commands produced since the last drain, in order.
    pub fn drain_commands(&mut self) -> Vec<FormCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Open the form for a new workout at `coords`. A second click before
    /// submitting moves the pending location. Ignored while editing.
    pub fn map_click(&mut self, coords: Coords) -> bool {
        match self.state {
            SessionState::Editing { ref id } => {
                dlog!("map_click_while_editing id={id}");
                false
            }
            SessionState::Idle | SessionState::AwaitingLocation { .. } => {
                self.state = SessionState::AwaitingLocation { coords };
                self.pending_field = FormField::Distance;
                self.outbox.push(FormCommand::Show {
                    focus: FormField::Distance,
                });
                true
            }
        }
    }

    /// Open the form pre-filled with `target`. Any pending creation is dropped.
    pub fn begin_edit(&mut self, target: &Workout) {
        if let SessionState::AwaitingLocation { coords } = self.state {
            dlog!("pending_create_discarded coords={coords}");
        }
        self.state = SessionState::Editing {
            id: target.id().to_string(),
        };
        self.kind = target.kind();
        self.pending_field = FormField::Distance;
        self.outbox.extend([
            FormCommand::Fill(target.form_values()),
            FormCommand::ShowIntensityFor(self.kind),
            FormCommand::Show {
                focus: FormField::Distance,
            },
        ]);
    }

    pub fn toggle_kind(&mut self, kind: WorkoutKind) {
        if self.kind != kind {
            self.kind = kind;
            self.outbox.push(FormCommand::ShowIntensityFor(kind));
        }
    }

    /// The user moved focus to `field` directly.
    pub fn focus(&mut self, field: FormField) {
        self.pending_field = field;
    }

    pub fn submit(&mut self, values: FormValues) -> Submission {
        if !self.is_open() {
            return Submission::Ignored;
        }

        if let Some(next) = self.pending_field.next() {
            self.pending_field = next;
            self.outbox.push(FormCommand::Focus(next));
            return Submission::FocusAdvanced(next);
        }

        self.kind = values.kind;
        let fields = WorkoutFields::from_form(&values);

        let submission = match &self.state {
            SessionState::AwaitingLocation { coords } => match Workout::new(*coords, fields) {
                Ok(w) => Submission::Create(w),
                Err(e) => Submission::Rejected(e),
            },
            SessionState::Editing { id } => match fields.check() {
                Ok(()) => Submission::Edit {
                    id: id.clone(),
                    fields,
                },
                Err(e) => Submission::Rejected(e),
            },
            SessionState::Idle => Submission::Ignored,
        };

        if matches!(
            submission,
            Submission::Create(_) | Submission::Edit { .. }
        ) {
            self.close();
        }
        submission
    }

    /// Close without mutating anything.
    pub fn cancel(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.state = SessionState::Idle;
        self.pending_field = FormField::Distance;
        self.outbox.extend([FormCommand::Clear, FormCommand::Hide]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HERE: Coords = Coords::new(10.0, 20.0);

    fn running(distance: f64, duration: f64, cadence: f64) -> FormValues {
        FormValues {
            kind: WorkoutKind::Running,
            distance,
            duration,
            cadence,
            elevation: f64::NAN,
        }
    }

    #[test]
    fn submit_advances_focus_before_validating() {
        let mut s = Session::new();
        assert!(s.map_click(HERE));
        assert_eq!(
            s.drain_commands(),
            vec![FormCommand::Show {
                focus: FormField::Distance
            }]
        );

        let partial = running(5.0, f64::NAN, f64::NAN);
        assert_eq!(
            s.submit(partial),
            Submission::FocusAdvanced(FormField::Duration)
        );
        assert_eq!(
            s.submit(partial),
            Submission::FocusAdvanced(FormField::Intensity)
        );

        match s.submit(running(5.0, 25.0, 178.0)) {
            Submission::Create(w) => {
                assert_eq!(w.coords(), HERE);
                assert_eq!(w.pace(), Some(5.0));
            }
            other => panic!("expected create, got {other:?}"),
        }
        assert_eq!(s.state(), &SessionState::Idle);
        assert_eq!(
            s.drain_commands(),
            vec![
                FormCommand::Focus(FormField::Duration),
                FormCommand::Focus(FormField::Intensity),
                FormCommand::Clear,
                FormCommand::Hide
            ]
        );
    }

    #[test]
    fn invalid_submit_keeps_form_open() {
        let mut s = Session::new();
        s.map_click(HERE);
        s.focus(FormField::Intensity);

        let got = s.submit(running(-5.0, 25.0, 178.0));
        assert!(matches!(got, Submission::Rejected(_)));
        assert_eq!(s.state(), &SessionState::AwaitingLocation { coords: HERE });
        assert_eq!(s.pending_field(), FormField::Intensity);
    }

    #[test]
    fn edit_prefills_and_returns_fields() {
        let target = Workout::running(HERE, 5.0, 25.0, 178.0).unwrap();
        let mut s = Session::new();
        s.begin_edit(&target);
        let cmds = s.drain_commands();
        assert!(matches!(
            cmds[0],
            FormCommand::Fill(v) if v.distance == 5.0 && v.cadence == 178.0
        ));
        assert_eq!(cmds[1], FormCommand::ShowIntensityFor(WorkoutKind::Running));
        assert!(!s.map_click(Coords::new(0.0, 0.0)));

        s.focus(FormField::Intensity);
        let values = FormValues {
            kind: WorkoutKind::Cycling,
            distance: 20.0,
            duration: 60.0,
            cadence: f64::NAN,
            elevation: 300.0,
        };
        assert_eq!(
            s.submit(values),
            Submission::Edit {
                id: target.id().to_string(),
                fields: WorkoutFields::Cycling {
                    distance: 20.0,
                    duration: 60.0,
                    elevation: 300.0
                }
            }
        );
        assert!(!s.is_open());
    }

    #[test]
    fn cancel_discards_pending_location() {
        let mut s = Session::new();
        s.map_click(HERE);
        s.cancel();
        assert_eq!(s.state(), &SessionState::Idle);
        assert_eq!(s.submit(running(5.0, 25.0, 178.0)), Submission::Ignored);
    }

    #[test]
    fn toggle_kind_switches_intensity_field() {
        let mut s = Session::new();
        s.toggle_kind(WorkoutKind::Cycling);
        s.toggle_kind(WorkoutKind::Cycling);
        assert_eq!(
            s.drain_commands(),
            vec![FormCommand::ShowIntensityFor(WorkoutKind::Cycling)]
        );
    }
}
