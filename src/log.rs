use core::marker::PhantomData;

/// A named logging channel backed by [tracing].
///
/// Workers and logical processes report through a `Log` rather than calling
/// `tracing` macros directly, so the channel name travels with every event.
/// A handle is deliberately not [Send]: each thread creates and keeps its own,
/// the way each staff member opens its own channel on startup.
#[derive(Debug)]
pub struct Log {
    name: String,
    /// Ties the handle to the thread that created it.
    thread_bound: PhantomData<*const ()>,
}

impl Log {
    /// Create a channel named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            thread_bound: PhantomData,
        }
    }

    /// The channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Emit a message that should survive any reasonable log filter:
    /// startup/shutdown notices and statistics dumps.
    pub fn vital(&self, message: impl AsRef<str>) {
        tracing::info!(channel = %self.name, "{}", message.as_ref());
    }

    /// Emit an ordinary progress message.
    pub fn note(&self, message: impl AsRef<str>) {
        tracing::debug!(channel = %self.name, "{}", message.as_ref());
    }
}
