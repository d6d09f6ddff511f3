#![no_main]

use bacnode_core::encoding::reader::Reader;
use bacnode_core::services::value_codec::decode_application_value;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut r = Reader::new(data);
    while !r.is_empty() {
        if decode_application_value(&mut r).is_err() {
            break;
        }
    }
});
