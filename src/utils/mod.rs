//! Shared helpers: payload codecs and integer arithmetic.

mod decompress;
mod math;

pub use decompress::{
    compress_deflate, compress_lzma, decompress_deflate, decompress_lzma, is_lzma_header,
    Compression, DecompressError, DecompressResult, Decompressor,
};
pub use math::{mod_inverse_u32, to_u32};
