//! Xorshift keystream feeding the block cipher.

/// Number of 32-bit words in one cipher block.
pub const BLOCK_WORDS: usize = 16;

/// Number of bytes in one cipher block.
pub const BLOCK_BYTES: usize = BLOCK_WORDS * 4;

/// One cipher block of little-endian words.
pub type Block = [u32; BLOCK_WORDS];

/// Word-oriented xorshift generator.
///
/// The state is advanced once per word with `x ^= x >> 12; x ^= x << 25;
/// x ^= x >> 27`. A zero seed never leaves zero; the build-time tool never
/// picks it.
///
/// # Example
///
/// ```rust
/// use dotshield::runtime::constants::Keystream;
///
/// let mut a = Keystream::new(0x1234_5678);
/// let mut b = Keystream::new(0x1234_5678);
/// assert_eq!(a.next_block(), b.next_block());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keystream {
    state: u32,
}

impl Keystream {
    /// Creates a keystream from the secret seed
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Keystream { state: seed }
    }

    /// Advances the generator and returns the new state
    pub fn next_word(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x
    }

    /// Produces the next full block of keystream words
    pub fn next_block(&mut self) -> Block {
        let mut block = [0u32; BLOCK_WORDS];
        for word in &mut block {
            *word = self.next_word();
        }
        block
    }
}

impl Iterator for Keystream {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        Some(self.next_word())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recurrence() {
        let seed = 0xCAFE_BABE_u32;
        let mut expected = seed;
        expected ^= expected >> 12;
        expected ^= expected << 25;
        expected ^= expected >> 27;

        let mut stream = Keystream::new(seed);
        assert_eq!(stream.next_word(), expected);
    }

    #[test]
    fn test_block_matches_words() {
        let words: Vec<u32> = Keystream::new(42).take(BLOCK_WORDS * 2).collect();

        let mut stream = Keystream::new(42);
        assert_eq!(stream.next_block()[..], words[..BLOCK_WORDS]);
        assert_eq!(stream.next_block()[..], words[BLOCK_WORDS..]);
    }

    #[test]
    fn test_zero_seed_is_degenerate() {
        let mut stream = Keystream::new(0);
        assert_eq!(stream.next_block(), [0u32; BLOCK_WORDS]);
    }

    #[test]
    fn test_seeds_diverge() {
        assert_ne!(Keystream::new(1).next_block(), Keystream::new(2).next_block());
    }
}
