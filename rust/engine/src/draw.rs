use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Size of the callable domain, numbers `1..=75`.
pub const DOMAIN_SIZE: usize = 75;

/// An exhaustive, non-repeating draw over the full number domain.
///
/// The entire call order is fixed up front by a single Fisher-Yates shuffle;
/// `next_call` just walks it. A sequence therefore never repeats a number and
/// yields exactly [`DOMAIN_SIZE`] calls before exhausting.
#[derive(Debug, Clone)]
pub struct DrawSequence {
    order: Vec<u8>,
    position: usize,
}

impl DrawSequence {
    /// Creates a sequence with OS-provided entropy.
    pub fn new() -> Self {
        let mut rng = ChaCha20Rng::from_os_rng();
        Self::with_rng(&mut rng)
    }

    /// Creates a sequence from a fixed seed. Two sequences built from the
    /// same seed produce identical call orders.
    pub fn new_with_seed(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        Self::with_rng(&mut rng)
    }

    fn with_rng(rng: &mut ChaCha20Rng) -> Self {
        let mut order: Vec<u8> = (1..=DOMAIN_SIZE as u8).collect();
        order.shuffle(rng);
        Self { order, position: 0 }
    }

    /// Draws the next number, or `None` once the domain is exhausted.
    pub fn next_call(&mut self) -> Option<u8> {
        let number = self.order.get(self.position).copied()?;
        self.position += 1;
        Some(number)
    }

    /// Numbers left to draw.
    pub fn remaining(&self) -> usize {
        self.order.len() - self.position
    }

    pub fn is_exhausted(&self) -> bool {
        self.position >= self.order.len()
    }
}

impl Default for DrawSequence {
    fn default() -> Self {
        Self::new()
    }
}
