#![no_main]

use libfuzzer_sys::fuzz_target;

use trickle_accrual::LedgerSnapshot;

// Decoding and verifying arbitrary bytes as a snapshot must never panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = LedgerSnapshot::from_bytes(data) {
        let _ = snapshot.verify();
        let _ = snapshot.to_bytes();
    }
});
