use std::fmt;

/// A reference to a line and column in an input source file
///
/// Both coordinates are one-based, as reported to clients in the
/// `locations` of an error.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SourcePosition {
    line: usize,
    col: usize,
}

impl SourcePosition {
    #[doc(hidden)]
    pub fn new(line: usize, col: usize) -> Self {
        assert!(line > 0 && col > 0, "source positions are one-based");
        Self { line, col }
    }

    #[doc(hidden)]
    pub fn new_origin() -> Self {
        Self { line: 1, col: 1 }
    }

    /// The line of the character in the input source
    pub fn line(&self) -> usize {
        self.line
    }

    /// The column of the character in the input source
    pub fn column(&self) -> usize {
        self.col
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Data structure used to wrap items with the position they start at.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Spanning<T> {
    /// Wrapped item.
    pub item: T,

    /// Start position of the wrapped item.
    pub start: SourcePosition,
}

impl<T> Spanning<T> {
    #[doc(hidden)]
    pub fn new(start: SourcePosition, item: T) -> Self {
        Self { item, start }
    }

    #[doc(hidden)]
    pub fn unlocated(item: T) -> Self {
        Self::new(SourcePosition::new_origin(), item)
    }

    /// Modify the contents of the spanned item.
    pub fn map<O, F: FnOnce(T) -> O>(self, f: F) -> Spanning<O> {
        Spanning::new(self.start, f(self.item))
    }
}

impl<T: fmt::Display> fmt::Display for Spanning<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. At {}", self.item, self.start)
    }
}
