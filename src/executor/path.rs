use std::fmt;

use arcstr::ArcStr;

use crate::util::ImmutableStack;

/// One step from a parent value to a child value in the response.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PathSegment {
    /// Response key of an object field.
    Field(ArcStr),
    /// Position in a list.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{name}"),
            Self::Index(idx) => write!(f, "{idx}"),
        }
    }
}

/// Location of a value in the response tree.
///
/// Paths are persistent: extending one leaves the original untouched and
/// shares its segments, so every resolver task can own its path cheaply.
#[derive(Clone, Default)]
pub struct Path(ImmutableStack<PathSegment>);

impl Path {
    /// The path of the operation's root object.
    pub fn root() -> Self {
        Self::default()
    }

    /// Extends the path with an object field.
    #[must_use]
    pub fn field(&self, response_name: &ArcStr) -> Self {
        Self(self.0.push(PathSegment::Field(response_name.clone())))
    }

    /// Extends the path with a list position.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        Self(self.0.push(PathSegment::Index(index)))
    }

    /// Number of segments, equal to the nesting depth in the response.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// The last segment, if any.
    pub fn last(&self) -> Option<&PathSegment> {
        self.0.peek()
    }

    /// Segments from the root down to this path's end.
    pub fn to_vec(&self) -> Vec<PathSegment> {
        let mut segments = self.0.iter().cloned().collect::<Vec<_>>();
        segments.reverse();
        segments
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, segment) in self.to_vec().iter().enumerate() {
            match segment {
                PathSegment::Index(i) => write!(f, "[{i}]")?,
                PathSegment::Field(name) if idx == 0 => write!(f, "{name}")?,
                PathSegment::Field(name) => write!(f, ".{name}")?,
            }
        }
        Ok(())
    }
}
