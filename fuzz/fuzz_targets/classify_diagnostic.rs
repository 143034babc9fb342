#![no_main]

use conformance_harvest::classify::classify_diagnostic;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let split = if data.is_empty() {
        0
    } else {
        data[0] as usize % data.len()
    };
    let (name_bytes, diagnostic_bytes) = data.split_at(split);
    let name = String::from_utf8_lossy(name_bytes);
    let diagnostic = String::from_utf8_lossy(diagnostic_bytes);

    let first = classify_diagnostic(&name, &diagnostic);
    if let Some(tag) = first {
        assert!(tag.is_failure(), "classification stays in the failure tags");
    }
    // Classification is a pure function of its two inputs.
    assert_eq!(classify_diagnostic(&name, &diagnostic), first);
});
