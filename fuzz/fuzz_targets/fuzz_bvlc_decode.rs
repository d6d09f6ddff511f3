#![no_main]

use bacnode_datalink::bip::bvlc::decode_frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok((_, npdu)) = decode_frame(data) {
        assert!(npdu.len() <= data.len());
    }
});
