use crate::Generator;
use burnbox_core::{PasteError, PasteId};
use std::sync::atomic::{AtomicU64, Ordering};

/// Longest label that still leaves room for `-` and a full `u64` counter.
const MAX_LABEL_LEN: usize = 43;

/// Readable, predictable ids (`label-1`, `label-2`, ...) for tests and local runs.
///
/// Anyone can guess the next id, so this must not back a public deployment.
#[derive(Debug)]
pub struct SeqGenerator {
    label: String,
    issued: AtomicU64,
}

impl SeqGenerator {
    /// Fails when `label` could not start a valid paste id.
    pub fn new(label: &str) -> Result<Self, PasteError> {
        PasteId::parse(label)?;
        if label.len() > MAX_LABEL_LEN {
            return Err(PasteError::validation(
                "id",
                format!("generator label is longer than {MAX_LABEL_LEN} characters"),
            ));
        }
        Ok(Self {
            label: label.to_owned(),
            issued: AtomicU64::new(0),
        })
    }

    /// How many ids have been handed out so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl Generator for SeqGenerator {
    type Output = PasteId;

    fn generate(&self) -> PasteId {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        PasteId::new_unchecked(format!("{}-{n}", self.label))
    }
}
