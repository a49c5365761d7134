#![no_main]

use libfuzzer_sys::fuzz_target;
use dotshield::config::ConstantsConfig;
use dotshield::runtime::constants::{ArxMixer, ConstantId, ConstantStore, EncryptedPayload};
use dotshield::utils::Compression;

fuzz_target!(|data: &[u8]| {
    if data.len() < 8 {
        return;
    }

    let id = ConstantId(u32::from_le_bytes([data[0], data[1], data[2], data[3]]));
    let seed = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    let blob = &data[8..];

    // Raw pool lookups
    let store = ConstantStore::from_plaintext(blob.to_vec(), &ConstantsConfig::default());
    let _ = store.get_string(id);
    let _ = store.get::<u64>(id);
    let _ = store.get::<Vec<i32>>(id);

    // Full decode of an arbitrary payload
    if let Ok(payload) = EncryptedPayload::from_le_bytes(seed, blob) {
        let config = ConstantsConfig::new().with_compression(Compression::Deflate);
        if let Ok(store) = ConstantStore::decode(&payload, &ArxMixer, &config) {
            let _ = store.get::<Vec<u8>>(id);
        }
    }
});
