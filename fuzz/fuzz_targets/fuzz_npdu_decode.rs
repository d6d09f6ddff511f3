#![no_main]

use bacnode_core::encoding::reader::Reader;
use bacnode_core::npdu::Npdu;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut r = Reader::new(data);
    if let Ok(npdu) = Npdu::decode(&mut r) {
        let _ = npdu.is_network_message();
        let _ = Npdu::reply_to(&npdu);
    }
});
