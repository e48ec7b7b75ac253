use std::sync::Arc;

use arcstr::ArcStr;
use fnv::FnvHashMap;

use crate::{
    ast::{Document, Fragment},
    parser::Spanning,
};

/// Named fragment definitions of a document, indexed by name.
///
/// Built once per operation and read-only afterwards.
#[derive(Clone, Debug, Default)]
pub struct FragmentCollection {
    fragments: FnvHashMap<ArcStr, Arc<Spanning<Fragment>>>,
}

impl FragmentCollection {
    /// Indexes every fragment definition of the `document`.
    ///
    /// With duplicate names the last definition wins; a validated document
    /// has none.
    pub fn new(document: &Document) -> Self {
        Self {
            fragments: document
                .fragments()
                .map(|f| (f.item.name.clone(), Arc::clone(f)))
                .collect(),
        }
    }

    /// Looks up a fragment definition by name.
    pub fn get(&self, name: &str) -> Option<&Arc<Spanning<Fragment>>> {
        self.fragments.get(name)
    }

    /// Number of indexed fragments.
    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// Whether the document defines no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}
