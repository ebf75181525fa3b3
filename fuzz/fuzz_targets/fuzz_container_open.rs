#![no_main]

use libfuzzer_sys::fuzz_target;

use chromatrace::container::{BaseCallSet, Container, DecodeConfig};
use chromatrace::validator::validate_container_bytes;

fuzz_target!(|data: &[u8]| {
    // Opening may fail on a bad signature or header, but must never panic
    if let Ok(container) = Container::open(data.to_vec()) {
        let config = DecodeConfig::default().with_fifth_channel(true);
        let _ = container.decode(&config);
        let _ = container.base_calls(BaseCallSet::Edited);
        if let Some(abif) = container.as_abif() {
            for entry in abif.entries().take(256) {
                let _ = abif.entry_data(&entry);
            }
            let _ = abif.sample_name();
        }
        if let Some(scf) = container.as_scf() {
            let _ = scf.comments();
        }
        container.release();
    }

    let _ = validate_container_bytes("fuzz", data.to_vec(), Some(data.len() as u64));
});
