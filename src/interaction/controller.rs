use tracing::{trace, warn};

use crate::core::{Observation, Point};
use crate::extensions::InteractionListener;
use crate::interaction::{
    ArcHitTester, BandHitTester, HitTarget, InteractionEvent, InteractionKind, InteractionState,
    NearestPointPicker, VoronoiPicker,
};

/// Hit-testing strategy of the current scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum HitTester {
    #[default]
    None,
    Bands(BandHitTester),
    Arcs(ArcHitTester),
    NearestPoint(NearestPointPicker),
    Voronoi(VoronoiPicker),
}

impl HitTester {
    #[must_use]
    pub fn resolve(&self, pointer: Point) -> Option<HitTarget> {
        match self {
            Self::None => None,
            Self::Bands(tester) => tester.hit(pointer),
            Self::Arcs(tester) => tester.hit(pointer),
            Self::NearestPoint(picker) => picker.pick(pointer.x).cloned(),
            Self::Voronoi(picker) => picker.pick(pointer).cloned(),
        }
    }
}

/// Single writer of the interaction state.
///
/// Hovering shows a tooltip, clicking pins an annotation that survives later
/// hovers until it is dismissed or replaced by another click.
#[derive(Default)]
pub struct InteractionController {
    hit_tester: HitTester,
    observations: Vec<Observation>,
    state: InteractionState,
    listeners: Vec<Box<dyn InteractionListener>>,
}

impl std::fmt::Debug for InteractionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionController")
            .field("hit_tester", &self.hit_tester)
            .field("observations", &self.observations.len())
            .field("state", &self.state)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl InteractionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in the hit tester and observations of a freshly computed scene.
    ///
    /// An active state pointing past the new observations is hidden.
    pub fn bind(&mut self, hit_tester: HitTester, observations: Vec<Observation>) {
        self.hit_tester = hit_tester;
        self.observations = observations;
        let stale = self
            .state
            .observation_index
            .is_some_and(|index| index >= self.observations.len());
        if stale {
            self.state = InteractionState::hidden();
        } else if let Some(index) = self.state.observation_index {
            self.state.observation = self.observations.get(index).cloned();
        }
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    #[must_use]
    pub fn hit_tester(&self) -> &HitTester {
        &self.hit_tester
    }

    pub fn add_listener(&mut self, listener: Box<dyn InteractionListener>) {
        self.listeners.push(listener);
    }

    /// Removes listeners with `id`; returns whether any was removed.
    pub fn remove_listener(&mut self, id: &str) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|listener| listener.id() != id);
        before != self.listeners.len()
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> &InteractionState {
        let pointer = Point::new(x, y);
        match self.hit_tester.resolve(pointer) {
            Some(target) => {
                if self.state.kind != InteractionKind::Annotation {
                    self.show(InteractionKind::Tooltip, &target, pointer);
                }
                self.dispatch(&InteractionEvent::Hover { target, pointer });
            }
            None => self.hide_tooltip(),
        }
        &self.state
    }

    pub fn pointer_leave(&mut self) -> &InteractionState {
        self.hide_tooltip();
        &self.state
    }

    pub fn click(&mut self, x: f64, y: f64) -> &InteractionState {
        let pointer = Point::new(x, y);
        match self.hit_tester.resolve(pointer) {
            Some(target) => {
                self.show(InteractionKind::Annotation, &target, pointer);
                self.dispatch(&InteractionEvent::Click { target, pointer });
            }
            None => self.dismiss(),
        }
        &self.state
    }

    /// Hides tooltip and annotation alike.
    pub fn dismiss(&mut self) {
        let was_visible = self.state.visible;
        self.state = InteractionState::hidden();
        if was_visible {
            self.dispatch(&InteractionEvent::Unhover);
        }
    }

    fn show(&mut self, kind: InteractionKind, target: &HitTarget, pointer: Point) {
        self.state = InteractionState {
            kind,
            visible: true,
            observation_index: Some(target.observation),
            observation: self.observations.get(target.observation).cloned(),
            segment: target.segment.clone(),
            pointer: Some(pointer),
            anchor: Some(target.anchor),
        };
        trace!(kind = ?kind, observation = target.observation, "interaction target resolved");
    }

    fn hide_tooltip(&mut self) {
        if self.state.kind == InteractionKind::Tooltip && self.state.visible {
            self.state = InteractionState::hidden();
            self.dispatch(&InteractionEvent::Unhover);
        }
    }

    fn dispatch(&mut self, event: &InteractionEvent) {
        for listener in &mut self.listeners {
            if let Err(err) = listener.on_event(event, &self.state) {
                warn!(listener = listener.id(), error = %err, "interaction listener failed");
            }
        }
    }
}
