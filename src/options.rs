//! Recompression settings and recursion depth tracking.

use std::num::NonZeroU64;

/// Default limit for nested containers.
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// Default number of zopfli iterations per deflate stream.
pub const DEFAULT_ITERATIONS: NonZeroU64 = NonZeroU64::new(15).unwrap();

/// Settings shared by every level of a recursive pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Relocate entries only: no recompression and no recursion.
    pub fast: bool,
    /// Deepest nesting level that is still shrunk and reported.
    pub max_depth: u32,
    /// Zopfli iteration count.
    pub iterations: NonZeroU64,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            fast: false,
            max_depth: DEFAULT_MAX_DEPTH,
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl Options {
    pub fn with_fast(mut self, fast: bool) -> Self {
        self.fast = fast;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_iterations(mut self, iterations: NonZeroU64) -> Self {
        self.iterations = iterations;
        self
    }

    /// Depth of a top-level file.
    pub fn root_depth(&self) -> Depth {
        Depth::root(self.max_depth)
    }
}

/// Position in the container nesting, passed by value into each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Depth {
    pub current: u32,
    pub max: u32,
}

impl Depth {
    pub fn root(max: u32) -> Self {
        Self { current: 1, max }
    }

    /// Depth of content found inside the current container.
    pub fn nested(self) -> Self {
        Self {
            current: self.current.saturating_add(1),
            max: self.max,
        }
    }

    /// Whether recursion and name reporting are still allowed here.
    pub fn within_limit(self) -> bool {
        self.current <= self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn depth_limit() {
        let root = Depth::root(2);
        assert!(root.within_limit());
        assert!(root.nested().within_limit());
        assert!(!root.nested().nested().within_limit());
        assert_eq!(root.nested().nested().current, 3);
    }

    #[test]
    fn zero_max_depth_disables_everything() {
        let options = Options::default().with_max_depth(0);
        assert!(!options.root_depth().within_limit());
    }

    #[test]
    fn defaults() {
        let options = Options::default();
        assert!(!options.fast);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(options.iterations, DEFAULT_ITERATIONS);
    }
}
