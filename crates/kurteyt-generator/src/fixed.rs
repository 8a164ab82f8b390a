use crate::Generator;
use kurteyt_core::ShortId;

/// Always hands out the same id. Used to force collisions.
#[derive(Debug, Clone)]
pub struct FixedGenerator {
    id: ShortId,
}

impl FixedGenerator {
    pub fn new(id: ShortId) -> Self {
        Self { id }
    }
}

impl Generator for FixedGenerator {
    type Output = ShortId;

    fn generate(&self) -> ShortId {
        self.id.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_the_same_id() {
        let generator = FixedGenerator::new(ShortId::new_unchecked("abc12345"));
        assert_eq!(generator.generate(), generator.generate());
    }
}
