pub mod random;
pub mod seq;

pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use burnbox_core::PasteId;

/// Trait for generating paste ids.
///
/// Implementations are pure generators that don't interact with storage;
/// the lifecycle layer guards against the (unlikely) collision.
pub trait Generator: Send + Sync + 'static {
    type Output: Into<PasteId>;
    /// Generates a value that can be converted into a fresh paste id.
    fn generate(&self) -> Self::Output;
}
