//! Durable storage slot for the cart.

/// A single key-value location holding the serialized cart.
///
/// Implementations must not fail loudly: a slot that cannot be read returns
/// `None`, and a failed write is the implementation's concern to log.
pub trait CartSlot {
    /// Raw contents of the slot, if any.
    fn read(&self) -> Option<String>;

    /// Replace the slot contents.
    fn write(&mut self, raw: &str);
}

/// In-memory slot.
///
/// Used directly in tests, and by callers that load the raw value from
/// somewhere asynchronous (a session, a file) and write it back afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySlot {
    raw: Option<String>,
    dirty: bool,
}

impl MemorySlot {
    /// Create a slot pre-filled with a stored value.
    #[must_use]
    pub const fn with_raw(raw: Option<String>) -> Self {
        Self { raw, dirty: false }
    }

    /// Current raw value.
    #[must_use]
    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    /// Whether [`CartSlot::write`] was called since construction.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl CartSlot for MemorySlot {
    fn read(&self) -> Option<String> {
        self.raw.clone()
    }

    fn write(&mut self, raw: &str) {
        self.raw = Some(raw.to_owned());
        self.dirty = true;
    }
}
