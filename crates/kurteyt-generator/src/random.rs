use crate::Generator;
use kurteyt_core::short_id::GENERATED_LENGTH;
use kurteyt_core::ShortId;
use rand::distributions::Alphanumeric;
use rand::Rng;
use typed_builder::TypedBuilder;

/// Draws ids uniformly from `[A-Za-z0-9]`.
///
/// With the default length of 8 there are 62^8 (about 2.18e14) possible ids.
/// This is not a cryptographic identifier space, it only needs to make
/// enumeration impractical.
#[derive(Debug, Clone, TypedBuilder)]
pub struct RandomAlnumGenerator {
    #[builder(default = GENERATED_LENGTH)]
    length: usize,
}

impl RandomAlnumGenerator {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for RandomAlnumGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for RandomAlnumGenerator {
    type Output = ShortId;

    fn generate(&self) -> ShortId {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(self.length)
            .map(char::from)
            .collect();
        ShortId::new_unchecked(id)
    }
}
