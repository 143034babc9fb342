#![no_main]

use conformance_harvest::schema::CatalogArchive;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(archive) = CatalogArchive::from_json_slice(data) else {
        return;
    };
    // Record decoding may reject bad labels or hex, but must not panic.
    let _ = archive.decode_cases();

    let bytes = archive.to_json_vec().expect("loaded archive re-serializes");
    let reloaded = CatalogArchive::from_json_slice(&bytes).expect("round trip parses");
    assert_eq!(reloaded, archive);
});
