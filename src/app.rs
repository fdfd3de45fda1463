//! Application context tying the store to the map and form collaborators.
//!
//! One `App` per running UI. It owns the store, remembers where the map is
//! centred once a position is known, and holds the coordinate of the last
//! map click until a form submission consumes it.

use crate::dlog;
use crate::slot::Slot;
use crate::store::{StoreError, WorkoutStore};
use crate::types::Coords;
use crate::workout::Workout;
use thiserror::Error;
use uuid::Uuid;

pub const MAP_ZOOM_LEVEL: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub center: Coords,
    pub zoom: u8,
}

impl MapView {
    const fn at(center: Coords) -> Self {
        Self {
            center,
            zoom: MAP_ZOOM_LEVEL,
        }
    }
}

/// Failure outcomes of the one-shot position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    Unavailable,
    #[error("timed out")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub coords: Coords,
    pub label: String,
    pub class: String,
}

/// Values read from the workout form.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutForm {
    pub kind: String,
    pub distance: f64,
    pub duration: f64,
    /// Cadence for running, elevation gain for cycling.
    pub extra: f64,
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("pick a location on the map first")]
    NoLocation,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug)]
pub struct App<S> {
    store: WorkoutStore<S>,
    view: Option<MapView>,
    position_settled: bool,
    pending_click: Option<Coords>,
}

impl<S: Slot> App<S> {
    pub fn new(slot: S) -> Self {
        Self {
            store: WorkoutStore::open(slot),
            view: None,
            position_settled: false,
            pending_click: None,
        }
    }

    pub const fn store(&self) -> &WorkoutStore<S> {
        &self.store
    }

    pub fn into_store(self) -> WorkoutStore<S> {
        self.store
    }

    /// `None` until the map has been centred.
    pub const fn view(&self) -> Option<MapView> {
        self.view
    }

    /// Deliver the result of the position request. Only the first delivery
    /// counts.
    pub fn on_position(&mut self, outcome: Result<Coords, GeolocationError>) -> Option<MapView> {
        if self.position_settled {
            dlog!("ignoring repeated position delivery");
            return self.view;
        }
        self.position_settled = true;

        match outcome {
            Ok(center) => {
                let view = MapView::at(center);
                self.view = Some(view);
                tracing::info!(center = %center, zoom = view.zoom, "map loaded");
                Some(view)
            }
            Err(e) => {
                tracing::warn!(err = %e, "could not get your location");
                None
            }
        }
    }

    pub fn on_map_click(&mut self, coords: Coords) {
        dlog!("map click at {coords}");
        self.pending_click = Some(coords);
    }

    pub const fn pending_location(&self) -> Option<Coords> {
        self.pending_click
    }

    /// Turn the form plus the last clicked location into a stored workout.
    ///
    /// The clicked location is consumed only on success, so a rejected form
    /// can be corrected and resubmitted.
    pub fn submit(&mut self, form: &WorkoutForm) -> Result<&Workout, SubmitError> {
        let coords = self.pending_click.ok_or(SubmitError::NoLocation)?;
        let workout =
            self.store
                .add_workout(&form.kind, coords, form.distance, form.duration, form.extra)?;
        self.pending_click = None;
        Ok(workout)
    }

    /// One popup marker per workout, once the map exists.
    pub fn markers(&self) -> Vec<Marker> {
        if self.view.is_none() {
            return Vec::new();
        }
        self.store
            .workouts()
            .iter()
            .map(|w| Marker {
                coords: w.coords(),
                label: w.popup_label(),
                class: format!("{}-popup", w.kind()),
            })
            .collect()
    }

    /// Centre the map on a workout and count the interaction.
    pub fn locate(&mut self, id: Uuid) -> Result<Option<MapView>, StoreError> {
        let Some(center) = self.store.find_by_id(id).map(Workout::coords) else {
            return Ok(None);
        };
        self.store.record_interaction(id)?;

        let view = MapView::at(center);
        self.view = Some(view);
        Ok(Some(view))
    }

    pub fn reset(&mut self) -> Result<(), StoreError> {
        self.store.reset()?;
        self.pending_click = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::MemorySlot;

    fn run_form() -> WorkoutForm {
        WorkoutForm {
            kind: "running".to_string(),
            distance: 5.0,
            duration: 30.0,
            extra: 80.0,
        }
    }

    #[test]
    fn submit_needs_a_clicked_location() {
        let mut app = App::new(MemorySlot::new());
        assert!(matches!(
            app.submit(&run_form()),
            Err(SubmitError::NoLocation)
        ));
        assert!(app.store().is_empty());
    }

    #[test]
    fn submit_consumes_the_click_only_on_success() {
        let mut app = App::new(MemorySlot::new());
        let here = Coords::new(38.75, -9.125);
        app.on_map_click(here);

        let bad = WorkoutForm {
            distance: 0.0,
            ..run_form()
        };
        assert!(matches!(
            app.submit(&bad),
            Err(SubmitError::Store(StoreError::Validation(_)))
        ));
        assert_eq!(app.pending_location(), Some(here));

        let w = app.submit(&run_form()).unwrap();
        assert_eq!(w.coords(), here);
        assert_eq!(app.pending_location(), None);
        assert_eq!(app.store().len(), 1);
    }

    #[test]
    fn first_position_wins() {
        let mut app = App::new(MemorySlot::new());
        let home = Coords::new(40.5, -3.75);

        let view = app.on_position(Ok(home)).unwrap();
        assert_eq!(view.center, home);
        assert_eq!(view.zoom, MAP_ZOOM_LEVEL);

        let again = app.on_position(Ok(Coords::new(0.0, 0.0)));
        assert_eq!(again, Some(view));
        assert_eq!(app.view(), Some(view));
    }

    #[test]
    fn failed_position_leaves_map_unloaded() {
        let mut app = App::new(MemorySlot::new());
        assert_eq!(app.on_position(Err(GeolocationError::PermissionDenied)), None);
        assert_eq!(app.on_position(Ok(Coords::new(1.0, 1.0))), None);
        assert_eq!(app.view(), None);
    }

    #[test]
    fn markers_appear_once_map_is_loaded() {
        let mut app = App::new(MemorySlot::new());
        app.on_map_click(Coords::new(1.0, 2.0));
        app.submit(&run_form()).unwrap();
        assert!(app.markers().is_empty());

        app.on_position(Ok(Coords::new(1.0, 2.0)));
        let markers = app.markers();
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].class, "running-popup");
        assert_eq!(markers[0].coords, Coords::new(1.0, 2.0));
        assert!(markers[0].label.contains("Running on "));
    }

    #[test]
    fn locate_moves_view_and_counts_interaction() {
        let mut app = App::new(MemorySlot::new());
        let spot = Coords::new(45.5, 9.25);
        app.on_map_click(spot);
        let id = app.submit(&run_form()).unwrap().id();

        let view = app.locate(id).unwrap().unwrap();
        assert_eq!(view, MapView::at(spot));
        assert_eq!(app.view(), Some(view));
        assert_eq!(app.locate(Uuid::new_v4()).unwrap(), None);

        let reopened = WorkoutStore::open(app.into_store().into_slot());
        assert_eq!(reopened.find_by_id(id).unwrap().interaction_count(), 1);
    }

    #[test]
    fn independent_apps_do_not_share_state() {
        let mut a = App::new(MemorySlot::new());
        let b = App::new(MemorySlot::new());
        a.on_map_click(Coords::new(0.0, 0.0));
        a.submit(&run_form()).unwrap();
        assert_eq!(a.store().len(), 1);
        assert!(b.store().is_empty());
    }

    #[test]
    fn reset_clears_everything() {
        let mut app = App::new(MemorySlot::new());
        app.on_map_click(Coords::new(0.0, 0.0));
        app.submit(&run_form()).unwrap();
        app.on_map_click(Coords::new(3.0, 3.0));

        app.reset().unwrap();
        assert!(app.store().is_empty());
        assert_eq!(app.pending_location(), None);
    }
}
