//! Chained block cipher over 16-word blocks.
//!
//! Each block is combined with the current keystream block through a
//! [`BlockMixer`], after which the keystream block absorbs the plaintext:
//!
//! ```text
//! decrypt:  p = mixer.decrypt(c, k);  k ^= p
//! encrypt:  c = mixer.encrypt(p, k);  k ^= p
//! ```
//!
//! The feedback makes decryption strictly sequential: a damaged block
//! poisons the key of every block after it.

use crate::{
    runtime::constants::keystream::{Block, Keystream, BLOCK_BYTES, BLOCK_WORDS},
    Result,
};

/// The mixing network combining one block with one key block.
///
/// Implementations must be invertible: `decrypt(encrypt(p, k), k) == p` for
/// every block and key. Real builds generate a secret network per assembly
/// and implement this trait for it.
pub trait BlockMixer {
    /// Turns a ciphertext block into plaintext in place
    fn decrypt(&self, block: &mut Block, key: &Block);

    /// Turns a plaintext block into ciphertext in place
    fn encrypt(&self, block: &mut Block, key: &Block);
}

/// Plain word-wise XOR with the key block.
///
/// With XOR mixing the feedback collapses to `k[n+1] = c[n]`, so damage only
/// spreads one block. Use [`ArxMixer`] where that matters.
#[derive(Debug, Clone, Copy, Default)]
pub struct XorMixer;

impl BlockMixer for XorMixer {
    fn decrypt(&self, block: &mut Block, key: &Block) {
        for (word, k) in block.iter_mut().zip(key) {
            *word ^= k;
        }
    }

    fn encrypt(&self, block: &mut Block, key: &Block) {
        self.decrypt(block, key);
    }
}

/// Rotation applied to each word by [`ArxMixer`].
const ARX_ROTATIONS: [u32; BLOCK_WORDS] = [7, 13, 3, 29, 17, 11, 5, 23, 19, 2, 31, 9, 27, 15, 21, 6];

/// Add-rotate-xor mixer with a forward diffusion pass.
///
/// ```text
/// w[i] = rotl(w[i] + k[i], r[i]) ^ k[(i + 5) % 16]
/// w[i] ^= w[i - 1]                 for i in 1..16
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ArxMixer;

impl BlockMixer for ArxMixer {
    fn decrypt(&self, block: &mut Block, key: &Block) {
        for i in (1..BLOCK_WORDS).rev() {
            block[i] ^= block[i - 1];
        }
        for (i, word) in block.iter_mut().enumerate() {
            *word = (*word ^ key[(i + 5) % BLOCK_WORDS])
                .rotate_right(ARX_ROTATIONS[i])
                .wrapping_sub(key[i]);
        }
    }

    fn encrypt(&self, block: &mut Block, key: &Block) {
        for (i, word) in block.iter_mut().enumerate() {
            *word = word
                .wrapping_add(key[i])
                .rotate_left(ARX_ROTATIONS[i])
                ^ key[(i + 5) % BLOCK_WORDS];
        }
        for i in 1..BLOCK_WORDS {
            block[i] ^= block[i - 1];
        }
    }
}

/// Keystream-seeded cipher with plaintext feedback.
///
/// One instance processes one payload front to back; feeding the same
/// instance a second payload continues the chain.
pub struct ChainedBlockCipher<'m> {
    mixer: &'m dyn BlockMixer,
    key: Block,
}

impl<'m> ChainedBlockCipher<'m> {
    /// Creates a cipher whose first key block is the first keystream block
    /// of `seed`
    #[must_use]
    pub fn new(mixer: &'m dyn BlockMixer, seed: u32) -> Self {
        ChainedBlockCipher {
            mixer,
            key: Keystream::new(seed).next_block(),
        }
    }

    /// The key block the next block will be processed with
    #[must_use]
    pub fn key(&self) -> &Block {
        &self.key
    }

    /// Decrypts one block in place and advances the key
    pub fn decrypt_block(&mut self, block: &mut Block) {
        self.mixer.decrypt(block, &self.key);
        for (k, word) in self.key.iter_mut().zip(block.iter()) {
            *k ^= word;
        }
    }

    /// Encrypts one block in place and advances the key
    pub fn encrypt_block(&mut self, block: &mut Block) {
        let plain = *block;
        self.mixer.encrypt(block, &self.key);
        for (k, word) in self.key.iter_mut().zip(plain.iter()) {
            *k ^= word;
        }
    }

    /// Decrypts `ciphertext` into little-endian plaintext bytes
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the word count is not a multiple
    /// of the block size.
    pub fn decrypt(&mut self, ciphertext: &[u32]) -> Result<Vec<u8>> {
        if ciphertext.len() % BLOCK_WORDS != 0 {
            return Err(malformed_error!(
                "Ciphertext of {} words is not a multiple of {} words",
                ciphertext.len(),
                BLOCK_WORDS
            ));
        }

        let mut plaintext = Vec::with_capacity(ciphertext.len() * 4);
        for chunk in ciphertext.chunks_exact(BLOCK_WORDS) {
            let mut block: Block = [0; BLOCK_WORDS];
            block.copy_from_slice(chunk);
            self.decrypt_block(&mut block);
            for word in block {
                plaintext.extend_from_slice(&word.to_le_bytes());
            }
        }

        Ok(plaintext)
    }

    /// Encrypts `plaintext` bytes, zero padded to whole blocks
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Vec<u32> {
        let block_count = plaintext.len().div_ceil(BLOCK_BYTES);
        let mut ciphertext = Vec::with_capacity(block_count * BLOCK_WORDS);

        for chunk in plaintext.chunks(BLOCK_BYTES) {
            let mut bytes = [0u8; BLOCK_BYTES];
            bytes[..chunk.len()].copy_from_slice(chunk);

            let mut block: Block = [0; BLOCK_WORDS];
            for (word, raw) in block.iter_mut().zip(bytes.chunks_exact(4)) {
                *word = u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]);
            }

            self.encrypt_block(&mut block);
            ciphertext.extend_from_slice(&block);
        }

        ciphertext
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block(base: u32) -> Block {
        let mut block = [0u32; BLOCK_WORDS];
        for (i, word) in block.iter_mut().enumerate() {
            *word = base.wrapping_mul(0x9E37_79B9).wrapping_add(i as u32);
        }
        block
    }

    #[test]
    fn test_mixers_invert() {
        let key = Keystream::new(0xABCD).next_block();
        let mixers: [&dyn BlockMixer; 2] = [&XorMixer, &ArxMixer];

        for mixer in mixers {
            let plain = sample_block(7);
            let mut block = plain;
            mixer.encrypt(&mut block, &key);
            assert_ne!(block, plain);
            mixer.decrypt(&mut block, &key);
            assert_eq!(block, plain);
        }
    }

    #[test]
    fn test_roundtrip_multiple_blocks() {
        let plaintext: Vec<u8> = (0..200u32).map(|i| (i * 31 % 251) as u8).collect();

        let ciphertext = ChainedBlockCipher::new(&ArxMixer, 99).encrypt(&plaintext);
        assert_eq!(ciphertext.len(), 4 * BLOCK_WORDS);

        let decrypted = ChainedBlockCipher::new(&ArxMixer, 99)
            .decrypt(&ciphertext)
            .unwrap();
        assert_eq!(&decrypted[..plaintext.len()], &plaintext[..]);
        assert!(decrypted[plaintext.len()..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_wrong_seed_garbles() {
        let plaintext = [0x55u8; BLOCK_BYTES];
        let ciphertext = ChainedBlockCipher::new(&ArxMixer, 1).encrypt(&plaintext);
        let decrypted = ChainedBlockCipher::new(&ArxMixer, 2)
            .decrypt(&ciphertext)
            .unwrap();
        assert_ne!(decrypted, plaintext);
    }

    #[test]
    fn test_partial_block_rejected() {
        let result = ChainedBlockCipher::new(&XorMixer, 1).decrypt(&[0u32; BLOCK_WORDS + 3]);
        assert!(matches!(result, Err(crate::Error::Malformed { .. })));
    }

    #[test]
    fn test_empty_ciphertext() {
        let decrypted = ChainedBlockCipher::new(&XorMixer, 1).decrypt(&[]).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_key_absorbs_plaintext() {
        let mut cipher = ChainedBlockCipher::new(&XorMixer, 5);
        let initial = *cipher.key();

        let plain = sample_block(3);
        let mut block = plain;
        cipher.encrypt_block(&mut block);

        for i in 0..BLOCK_WORDS {
            assert_eq!(cipher.key()[i], initial[i] ^ plain[i]);
        }
    }
}
