pub mod fixed;
pub mod random;

use kurteyt_core::ShortId;

pub use fixed::FixedGenerator;
pub use random::RandomAlnumGenerator;

/// Trait for generating short ids.
///
/// Implementations are pure generators that don't interact with storage.
/// Uniqueness is not their job: the store's conditional write rejects
/// a colliding id.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<ShortId>;
    /// Generates a value that can be converted into a short id.
    fn generate(&self) -> Self::Output;
}
