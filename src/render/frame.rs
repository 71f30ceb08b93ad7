use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::Viewport;
use crate::error::{ChartError, ChartResult};
use crate::render::Primitive;

/// Backend-agnostic scene for one chart draw pass.
///
/// Primitives are kept in paint order; class names group them for styling and
/// test tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub primitives: Vec<Primitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            primitives: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_primitive(mut self, primitive: Primitive) -> Self {
        self.primitives.push(primitive);
        self
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn extend(&mut self, primitives: impl IntoIterator<Item = Primitive>) {
        self.primitives.extend(primitives);
    }

    pub fn validate(&self) -> ChartResult<()> {
        if !self.viewport.is_valid() {
            return Err(ChartError::InvalidViewport {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }
        for primitive in &self.primitives {
            primitive.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Primitive> {
        self.primitives.iter().find(|primitive| primitive.key == key)
    }

    pub fn by_class<'a>(&'a self, class_name: &'a str) -> impl Iterator<Item = &'a Primitive> {
        self.primitives
            .iter()
            .filter(move |primitive| primitive.class_name == class_name)
    }

    /// Primitives grouped by class name, groups in first-appearance order.
    #[must_use]
    pub fn groups(&self) -> IndexMap<&str, Vec<&Primitive>> {
        let mut groups: IndexMap<&str, Vec<&Primitive>> = IndexMap::new();
        for primitive in &self.primitives {
            groups
                .entry(primitive.class_name.as_str())
                .or_default()
                .push(primitive);
        }
        groups
    }

    /// Copy of the frame without primitives marked exclude-from-export.
    #[must_use]
    pub fn exportable(&self) -> Self {
        Self {
            viewport: self.viewport,
            primitives: self
                .primitives
                .iter()
                .filter(|primitive| !primitive.exclude_from_export)
                .cloned()
                .collect(),
        }
    }
}
