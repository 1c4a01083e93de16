//! Per-document configuration

/// Options fixed at document creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Share one heap entry between equal field names
    pub dedup_names: bool,
    /// Share one heap entry between equal encoded values
    pub dedup_values: bool,
    /// Copy untouched opaque spans verbatim when serializing, instead of
    /// decoding and re-encoding them
    pub verbatim_opaque: bool,
    /// Initial arena capacity, in elements
    pub arena_capacity: usize,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        DocumentOptions {
            dedup_names: true,
            dedup_values: false,
            verbatim_opaque: true,
            arena_capacity: 64,
        }
    }
}

impl DocumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dedup_names(mut self, on: bool) -> Self {
        self.dedup_names = on;
        self
    }

    pub fn with_dedup_values(mut self, on: bool) -> Self {
        self.dedup_values = on;
        self
    }

    pub fn with_verbatim_opaque(mut self, on: bool) -> Self {
        self.verbatim_opaque = on;
        self
    }

    pub fn with_arena_capacity(mut self, capacity: usize) -> Self {
        self.arena_capacity = capacity;
        self
    }
}
