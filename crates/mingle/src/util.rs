/// Small deterministic generator (xorshift64*), so shuffles are reproducible across platforms.
#[derive(Debug, Clone)]
struct XorShift64Star {
    state: u64,
}

impl XorShift64Star {
    fn new(seed: u64) -> Self {
        Self { state: seed.max(1) }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D_u64)
    }

    /// Uniform in `0..bound`; `bound` must be non-zero.
    fn next_below(&mut self, bound: usize) -> usize {
        (self.next_u64() % bound as u64) as usize
    }
}

/// Fisher-Yates shuffle of `items`, seeded. The same seed always yields the same order.
pub fn shuffle<T>(mut items: Vec<T>, seed: u64) -> Vec<T> {
    let mut rng = XorShift64Star::new(seed);
    for i in (1..items.len()).rev() {
        let j = rng.next_below(i + 1);
        items.swap(i, j);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_is_a_seeded_permutation() {
        let items: Vec<u32> = (0..50).collect();
        let a = shuffle(items.clone(), 7);
        let b = shuffle(items.clone(), 7);
        assert_eq!(a, b);
        assert_ne!(a, items);

        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, items);
    }

    #[test]
    fn shuffle_handles_tiny_inputs() {
        assert!(shuffle(Vec::<u8>::new(), 1).is_empty());
        assert_eq!(shuffle(vec![9], 1), vec![9]);
    }
}
