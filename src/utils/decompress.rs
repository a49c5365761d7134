//! Payload codecs for the embedded constant pool.
//!
//! The constant pool is compressed before it is encrypted, and the injected
//! runtime reverses both steps once at start-up. The codec is chosen at build
//! time and recorded in [`crate::config::ConstantsConfig`].
//!
//! # LZMA Format
//!
//! The runtime LZMA decoder expects a compact header instead of the classic
//! 13-byte `.lzma` header:
//! - 5 bytes: LZMA decoder properties
//! - 4 bytes: Uncompressed size (little-endian i32, negative for unknown)
//! - Rest: Compressed data stream
//!
//! # Deflate Format
//!
//! Raw Deflate streams as produced by `System.IO.Compression.DeflateStream`.
//!
//! Decoders tolerate trailing bytes after the end of the stream; the
//! encrypted payload is padded to a whole number of cipher blocks.

use std::io::{Cursor, Read, Write};

use flate2::{read::DeflateDecoder, write::DeflateEncoder};

/// Result type for codec operations.
pub type DecompressResult<T> = std::result::Result<T, DecompressError>;

/// Error type for codec operations.
#[derive(Debug)]
pub enum DecompressError {
    /// Invalid LZMA header or properties.
    InvalidLzmaHeader,
    /// LZMA compression or decompression failed.
    LzmaError(String),
    /// Deflate compression or decompression failed.
    DeflateError(String),
    /// Input buffer too small.
    BufferTooSmall,
}

impl std::fmt::Display for DecompressError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLzmaHeader => write!(f, "Invalid LZMA header"),
            Self::LzmaError(msg) => write!(f, "LZMA error: {msg}"),
            Self::DeflateError(msg) => write!(f, "Deflate error: {msg}"),
            Self::BufferTooSmall => write!(f, "Input buffer too small"),
        }
    }
}

impl std::error::Error for DecompressError {}

/// Size of the compact LZMA header: properties plus a 32-bit size.
const LZMA_HEADER_SIZE: usize = 9;

/// Largest valid LZMA properties byte (`9 * 5 * 5 - 1`).
const LZMA_MAX_PROPS: u8 = 224;

/// Codec applied to the constant pool before encryption.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, strum::Display, strum::EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum Compression {
    /// LZMA with the compact 9-byte header
    #[default]
    Lzma,
    /// Raw Deflate
    Deflate,
    /// Stored as-is
    None,
}

/// Reverses a payload codec.
///
/// Implemented by [`Compression`]; custom runtimes can plug their own codec
/// into [`crate::runtime::constants::ConstantStore::decode_with`].
pub trait Decompressor {
    /// Decompresses `data`, ignoring bytes after the end of the stream
    ///
    /// # Errors
    /// Returns [`DecompressError`] if `data` is not a valid stream.
    fn decompress(&self, data: &[u8]) -> DecompressResult<Vec<u8>>;
}

impl Decompressor for Compression {
    fn decompress(&self, data: &[u8]) -> DecompressResult<Vec<u8>> {
        match self {
            Compression::Lzma => decompress_lzma(data),
            Compression::Deflate => decompress_deflate(data),
            Compression::None => Ok(data.to_vec()),
        }
    }
}

impl Compression {
    /// Compresses `data` into the format [`Decompressor::decompress`] accepts
    ///
    /// # Errors
    /// Returns [`DecompressError`] if the encoder fails.
    pub fn compress(&self, data: &[u8]) -> DecompressResult<Vec<u8>> {
        match self {
            Compression::Lzma => compress_lzma(data),
            Compression::Deflate => compress_deflate(data),
            Compression::None => Ok(data.to_vec()),
        }
    }
}

/// Checks the compact LZMA header for plausibility.
///
/// # Arguments
///
/// * `data` - The potentially compressed data.
///
/// # Returns
///
/// `true` if the header carries valid properties and a sane dictionary size.
#[must_use]
pub fn is_lzma_header(data: &[u8]) -> bool {
    if data.len() < LZMA_HEADER_SIZE + 4 {
        return false;
    }

    // lc/lp/pb packed into one byte
    if data[0] > LZMA_MAX_PROPS {
        return false;
    }

    let dict_size = u32::from_le_bytes([data[1], data[2], data[3], data[4]]);
    if !(1024..=64 * 1024 * 1024).contains(&dict_size) {
        return false;
    }

    let uncompressed_size = i32::from_le_bytes([data[5], data[6], data[7], data[8]]);
    uncompressed_size != 0
}

/// Decompresses LZMA data with the compact header.
///
/// # Format
///
/// ```text
/// [0..5]  : LZMA properties (5 bytes)
/// [5..9]  : Uncompressed size (4 bytes, little-endian i32)
/// [9..]   : LZMA compressed stream
/// ```
///
/// # Errors
/// Returns [`DecompressError::BufferTooSmall`] for truncated headers,
/// [`DecompressError::InvalidLzmaHeader`] for an invalid properties byte and
/// [`DecompressError::LzmaError`] if the stream is corrupt.
pub fn decompress_lzma(data: &[u8]) -> DecompressResult<Vec<u8>> {
    if data.len() < LZMA_HEADER_SIZE {
        return Err(DecompressError::BufferTooSmall);
    }
    if data[0] > LZMA_MAX_PROPS {
        return Err(DecompressError::InvalidLzmaHeader);
    }

    let props = &data[0..5];
    let uncompressed_size = i32::from_le_bytes([data[5], data[6], data[7], data[8]]);
    let compressed = &data[LZMA_HEADER_SIZE..];

    // lzma-rs wants the classic header with a 64-bit size
    let mut lzma_stream = Vec::with_capacity(13 + compressed.len());
    lzma_stream.extend_from_slice(props);
    let size_u64 = u64::try_from(uncompressed_size).unwrap_or(u64::MAX);
    lzma_stream.extend_from_slice(&size_u64.to_le_bytes());
    lzma_stream.extend_from_slice(compressed);

    let mut cursor = Cursor::new(&lzma_stream);
    let mut decompressed = Vec::new();
    lzma_rs::lzma_decompress(&mut cursor, &mut decompressed)
        .map_err(|e| DecompressError::LzmaError(e.to_string()))?;

    Ok(decompressed)
}

/// Compresses `data` into LZMA with the compact header.
///
/// The header carries the real uncompressed size, so the decoder stops after
/// that many bytes and ignores the cipher block padding behind the stream.
///
/// # Errors
/// Returns [`DecompressError::LzmaError`] if the encoder fails or `data` is
/// larger than the header can describe.
pub fn compress_lzma(data: &[u8]) -> DecompressResult<Vec<u8>> {
    let size = i32::try_from(data.len())
        .map_err(|_| DecompressError::LzmaError(format!("input of {} bytes", data.len())))?;

    let mut classic = Vec::new();
    lzma_rs::lzma_compress(&mut Cursor::new(data), &mut classic)
        .map_err(|e| DecompressError::LzmaError(e.to_string()))?;
    if classic.len() < 13 {
        return Err(DecompressError::BufferTooSmall);
    }

    let mut compact = Vec::with_capacity(classic.len() - 4);
    compact.extend_from_slice(&classic[0..5]);
    compact.extend_from_slice(&size.to_le_bytes());
    compact.extend_from_slice(&classic[13..]);
    Ok(compact)
}

/// Decompresses raw Deflate data using flate2.
///
/// # Errors
/// Returns [`DecompressError::DeflateError`] if the stream is corrupt.
pub fn decompress_deflate(data: &[u8]) -> DecompressResult<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut decompressed = Vec::new();

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| DecompressError::DeflateError(e.to_string()))?;

    Ok(decompressed)
}

/// Compresses `data` into raw Deflate using flate2.
///
/// # Errors
/// Returns [`DecompressError::DeflateError`] if the encoder fails.
pub fn compress_deflate(data: &[u8]) -> DecompressResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::best());
    encoder
        .write_all(data)
        .map_err(|e| DecompressError::DeflateError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| DecompressError::DeflateError(e.to_string()))
}
