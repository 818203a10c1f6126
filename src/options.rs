//! Options for opening and saving archives.

/// Default limit on how deeply nested archives are expanded.
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Options controlling how archive bytes are turned into a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// Maximum nesting depth at which entries are still probed as archives.
    ///
    /// Archives found deeper than this stay opaque files. The root archive
    /// is depth 0.
    pub max_depth: usize,
    /// Whether entries are probed for nested archives at all.
    pub detect_nested: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            detect_nested: true,
        }
    }
}

impl OpenOptions {
    /// Creates open options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the nested-archive depth limit.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Enables or disables nested-archive detection.
    pub fn detect_nested(mut self, detect: bool) -> Self {
        self.detect_nested = detect;
        self
    }
}

/// Options controlling how a tree is turned back into bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOptions {
    /// Re-apply Yaz0 to archives that were compressed when opened.
    pub keep_compressed: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            keep_compressed: true,
        }
    }
}

impl SaveOptions {
    /// Creates save options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether compressed archives are recompressed on save.
    pub fn keep_compressed(mut self, keep: bool) -> Self {
        self.keep_compressed = keep;
        self
    }
}
