use typed_builder::TypedBuilder;

/// Tunables for [`PasteService`](crate::PasteService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ServiceSettings {
    /// Largest accepted paste body, in bytes.
    #[builder(default = 1024 * 1024)]
    pub max_content_bytes: usize,
    /// How many fresh ids to try before giving up on a create.
    #[builder(default = 5)]
    pub id_attempts: usize,
    /// How many times a read retries after losing a compare-and-set race.
    #[builder(default = 8)]
    pub max_consume_retries: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}
