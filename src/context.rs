//! Per-compilation caches.

use std::cell::{OnceCell, RefCell};
use std::collections::HashMap;

use itertools::Itertools;
use tracing::trace;

use crate::shape::{enumerate_variants, Shape, Symmetry, VariantSet, OMINOES};

/// State shared by the builders of one compilation: the named polyomino catalog and a memo of variant enumerations.
///
/// Both tables are filled on first use and never change afterwards. Independent compilations should each own a
/// [`Context`]; nothing here is global.
#[derive(Default)]
pub struct Context {
    catalog: OnceCell<HashMap<&'static str, Shape>>,
    variants: RefCell<HashMap<(Shape, Symmetry), VariantSet>>,
}

impl Context {
    /// An empty context.
    pub fn new() -> Self {
        Self::default()
    }

    fn catalog(&self) -> &HashMap<&'static str, Shape> {
        self.catalog.get_or_init(|| {
            OMINOES
                .iter()
                .filter_map(|(name, offsets)| Shape::new(offsets.iter().copied()).ok().map(|shape| (*name, shape)))
                .collect()
        })
    }

    /// A named polyomino such as `"T4"` or `"F5"`.
    pub fn omino(&self, name: &str) -> Option<&Shape> {
        self.catalog().get(name)
    }

    /// Every named polyomino with `size` cells, ordered by name.
    pub fn ominoes(&self, size: usize) -> Vec<(&'static str, &Shape)> {
        self.catalog()
            .iter()
            .filter(|(_, shape)| shape.len() == size)
            .map(|(name, shape)| (*name, shape))
            .sorted_by_key(|(name, _)| *name)
            .collect_vec()
    }

    /// [`enumerate_variants`], computed once per shape and symmetry.
    pub fn variants(&self, shape: &Shape, symmetry: Symmetry) -> VariantSet {
        let key = (shape.clone(), symmetry);
        if let Some(cached) = self.variants.borrow().get(&key) {
            trace!(cells = shape.len(), "variant cache hit");
            return cached.clone();
        }

        let computed = enumerate_variants(shape, symmetry);
        self.variants.borrow_mut().insert(key, computed.clone());
        computed
    }

    /// Number of memoized variant enumerations.
    pub fn cached(&self) -> usize {
        self.variants.borrow().len()
    }
}
