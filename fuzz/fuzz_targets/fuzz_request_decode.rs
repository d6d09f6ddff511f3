#![no_main]

use bacnode_core::apdu::{ApduType, ConfirmedRequestHeader, UnconfirmedRequestHeader};
use bacnode_core::encoding::reader::Reader;
use bacnode_core::services::device_management::{
    DeviceCommunicationControlRequest, ReinitializeDeviceRequest,
    SERVICE_DEVICE_COMMUNICATION_CONTROL, SERVICE_REINITIALIZE_DEVICE,
};
use bacnode_core::services::read_property::{ReadPropertyRequest, SERVICE_READ_PROPERTY};
use bacnode_core::services::read_property_multiple::{
    ReadPropertyMultipleRequest, SERVICE_READ_PROPERTY_MULTIPLE,
};
use bacnode_core::services::subscribe_cov::{SubscribeCovRequest, SERVICE_SUBSCRIBE_COV};
use bacnode_core::services::subscribe_cov_property::{
    SubscribeCovPropertyRequest, SERVICE_SUBSCRIBE_COV_PROPERTY,
};
use bacnode_core::services::text_message::{
    TextMessage, SERVICE_CONFIRMED_TEXT_MESSAGE, SERVICE_UNCONFIRMED_TEXT_MESSAGE,
};
use bacnode_core::services::who_is::{WhoIsRequest, SERVICE_WHO_IS};
use bacnode_core::services::write_property::{WritePropertyRequest, SERVICE_WRITE_PROPERTY};
use bacnode_core::services::write_property_multiple::{
    WritePropertyMultipleRequest, SERVICE_WRITE_PROPERTY_MULTIPLE,
};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut r = Reader::new(data);
    match ApduType::of_apdu(data) {
        Some(ApduType::ConfirmedRequest) => {
            let Ok(header) = ConfirmedRequestHeader::decode(&mut r) else {
                return;
            };
            match header.service_choice {
                SERVICE_READ_PROPERTY => {
                    let _ = ReadPropertyRequest::decode_after_header(&mut r);
                }
                SERVICE_READ_PROPERTY_MULTIPLE => {
                    let _ = ReadPropertyMultipleRequest::decode_after_header(&mut r);
                }
                SERVICE_WRITE_PROPERTY => {
                    let _ = WritePropertyRequest::decode_after_header(&mut r);
                }
                SERVICE_WRITE_PROPERTY_MULTIPLE => {
                    let _ = WritePropertyMultipleRequest::decode_after_header(&mut r);
                }
                SERVICE_SUBSCRIBE_COV => {
                    let _ = SubscribeCovRequest::decode_after_header(&mut r);
                }
                SERVICE_SUBSCRIBE_COV_PROPERTY => {
                    let _ = SubscribeCovPropertyRequest::decode_after_header(&mut r);
                }
                SERVICE_CONFIRMED_TEXT_MESSAGE => {
                    let _ = TextMessage::decode_after_header(&mut r);
                }
                SERVICE_DEVICE_COMMUNICATION_CONTROL => {
                    let _ = DeviceCommunicationControlRequest::decode_after_header(&mut r);
                }
                SERVICE_REINITIALIZE_DEVICE => {
                    let _ = ReinitializeDeviceRequest::decode_after_header(&mut r);
                }
                _ => {}
            }
        }
        Some(ApduType::UnconfirmedRequest) => {
            if let Ok(header) = UnconfirmedRequestHeader::decode(&mut r) {
                match header.service_choice {
                    SERVICE_WHO_IS => {
                        let _ = WhoIsRequest::decode_after_header(&mut r);
                    }
                    SERVICE_UNCONFIRMED_TEXT_MESSAGE => {
                        let _ = TextMessage::decode_after_header(&mut r);
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
});
