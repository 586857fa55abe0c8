use crate::{Id, Result};

/// A uniform, thread-safe generation capability.
///
/// Each strategy implements this once; the registry dispatches to it through
/// a closed set of variants.
pub trait IdGenerator: Send + Sync {
    /// The ID type produced by this generator.
    type Id: Id;

    /// Generates the next ID, blocking within the generator's wait budget if
    /// it must.
    ///
    /// # Errors
    ///
    /// Returns an error if entropy or the clock fails, if a timestamp no
    /// longer fits, or if the wait budget runs out. A failed call never
    /// yields a partially initialized or duplicate ID.
    fn try_next_id(&self) -> Result<Self::Id>;

    /// Generates the next ID in its canonical string form.
    ///
    /// # Errors
    ///
    /// See [`IdGenerator::try_next_id`].
    fn generate(&self) -> Result<String> {
        self.try_next_id().map(|id| id.to_string())
    }
}
