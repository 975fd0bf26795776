use crate::Generator;
use burnbox_core::PasteId;
use rand::RngCore;
use typed_builder::TypedBuilder;

/// Generates unguessable ids from random bytes, base58 encoded.
///
/// Eight bytes (the default) give 64 bits of entropy and ids of about
/// eleven characters.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RandomGenerator {
    #[builder(default = 8)]
    id_bytes: usize,
}

impl RandomGenerator {
    pub fn new() -> Self {
        Self::builder().build()
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for RandomGenerator {
    type Output = PasteId;

    fn generate(&self) -> Self::Output {
        let mut bytes = vec![0_u8; self.id_bytes.max(1)];
        rand::thread_rng().fill_bytes(&mut bytes);
        PasteId::from_bytes(bytes)
    }
}
