//! Keyed enter/update/exit diffing with frame-driven transitions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::Viewport;
use crate::render::transition::{Tween, collapse_shape, collapses_to_nothing};
use crate::render::{Paint, Primitive, RenderFrame, Shape, TransitionOptions};

/// Lifecycle phase of one keyed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementPhase {
    Entering,
    Present,
    Exiting,
}

#[derive(Debug, Clone, PartialEq)]
struct KeyedElement {
    class_name: String,
    exclude_from_export: bool,
    phase: ElementPhase,
    /// Last emitted geometry; the start point of any retargeted transition.
    current: (Shape, Paint),
    target: (Shape, Paint),
    collapsed: (Shape, Paint),
    tween: Option<Tween>,
}

impl KeyedElement {
    fn primitive(&self, key: &str) -> Primitive {
        Primitive {
            key: key.to_owned(),
            class_name: self.class_name.clone(),
            shape: self.current.0.clone(),
            paint: self.current.1,
            exclude_from_export: self.exclude_from_export,
            collapsed: None,
        }
    }
}

/// Keys touched by one `apply` call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderDiff {
    pub entered: Vec<String>,
    pub updated: Vec<String>,
    pub exited: Vec<String>,
}

/// Diffs successive frames by primitive key and animates the differences.
///
/// The engine owns the key to last-geometry map. A key is dropped from it once
/// its exit completes, so a key that re-appears later enters afresh.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRenderEngine {
    viewport: Viewport,
    elements: IndexMap<String, KeyedElement>,
}

impl KeyedRenderEngine {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            elements: IndexMap::new(),
        }
    }

    /// Binds a new target frame.
    ///
    /// In-flight transitions are retargeted from their current geometry; there
    /// is no other way to cancel them.
    pub fn apply(&mut self, target: &RenderFrame, options: TransitionOptions) -> RenderDiff {
        self.viewport = target.viewport;
        let animate = options.animates();
        let mut diff = RenderDiff::default();
        let mut next: IndexMap<String, KeyedElement> = IndexMap::with_capacity(target.len());

        for primitive in &target.primitives {
            let target_state = (primitive.shape.clone(), primitive.paint);
            let collapsed = collapsed_state(primitive);
            let element = match self.elements.shift_remove(&primitive.key) {
                Some(previous) => {
                    diff.updated.push(primitive.key.clone());
                    let tween = animate.then(|| {
                        Tween::new(previous.current.clone(), target_state.clone(), options)
                    });
                    KeyedElement {
                        class_name: primitive.class_name.clone(),
                        exclude_from_export: primitive.exclude_from_export,
                        phase: ElementPhase::Present,
                        current: if animate {
                            previous.current
                        } else {
                            target_state.clone()
                        },
                        target: target_state,
                        collapsed,
                        tween,
                    }
                }
                None => {
                    diff.entered.push(primitive.key.clone());
                    let tween = animate
                        .then(|| Tween::new(collapsed.clone(), target_state.clone(), options));
                    KeyedElement {
                        class_name: primitive.class_name.clone(),
                        exclude_from_export: primitive.exclude_from_export,
                        phase: if animate {
                            ElementPhase::Entering
                        } else {
                            ElementPhase::Present
                        },
                        current: if animate {
                            collapsed.clone()
                        } else {
                            target_state.clone()
                        },
                        target: target_state,
                        collapsed,
                        tween,
                    }
                }
            };
            next.insert(primitive.key.clone(), element);
        }

        for (key, mut element) in self.elements.drain(..) {
            diff.exited.push(key.clone());
            if !animate {
                continue;
            }
            element.phase = ElementPhase::Exiting;
            element.tween = Some(Tween::new(
                element.current.clone(),
                element.collapsed.clone(),
                options,
            ));
            element.target = element.collapsed.clone();
            next.insert(key, element);
        }

        self.elements = next;
        trace!(
            entered = diff.entered.len(),
            updated = diff.updated.len(),
            exited = diff.exited.len(),
            animate,
            "applied keyed render frame"
        );
        diff
    }

    /// Advances every running transition by `dt_ms`; returns whether any is still running.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        let mut finished_exits = Vec::new();
        for (key, element) in &mut self.elements {
            let Some(tween) = element.tween.as_mut() else {
                continue;
            };
            tween.step(dt_ms);
            element.current = tween.current();
            if tween.is_finished() {
                element.current = element.target.clone();
                element.tween = None;
                match element.phase {
                    ElementPhase::Exiting => finished_exits.push(key.clone()),
                    ElementPhase::Entering | ElementPhase::Present => {
                        element.phase = ElementPhase::Present;
                    }
                }
            }
        }
        for key in &finished_exits {
            self.elements.shift_remove(key);
        }
        let running = self.is_animating();
        trace!(dt_ms, removed = finished_exits.len(), running, "transition tick");
        running
    }

    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.elements.values().any(|element| element.tween.is_some())
    }

    /// Scene as currently displayed, exiting elements included.
    #[must_use]
    pub fn frame(&self) -> RenderFrame {
        let mut frame = RenderFrame::new(self.viewport);
        frame.extend(
            self.elements
                .iter()
                .map(|(key, element)| element.primitive(key)),
        );
        frame
    }

    #[must_use]
    pub fn phase(&self, key: &str) -> Option<ElementPhase> {
        self.elements.get(key).map(|element| element.phase)
    }

    /// Geometry last emitted for `key`, if the key is still tracked.
    #[must_use]
    pub fn previous_geometry(&self, key: &str) -> Option<&Shape> {
        self.elements.get(key).map(|element| &element.current.0)
    }

    #[must_use]
    pub fn tracked_keys(&self) -> usize {
        self.elements.len()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }
}

fn collapsed_state(primitive: &Primitive) -> (Shape, Paint) {
    let shape = primitive
        .collapsed
        .clone()
        .unwrap_or_else(|| collapse_shape(&primitive.shape));
    let paint = if collapses_to_nothing(&shape) {
        primitive.paint
    } else {
        primitive.paint.with_opacity(0.0)
    };
    (shape, paint)
}
