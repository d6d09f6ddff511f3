use bacnode_core::apdu::{ApduType, ConfirmedRequestHeader, SimpleAck};
use bacnode_core::encoding::{reader::Reader, writer::Writer};
use bacnode_core::npdu::Npdu;
use bacnode_core::services::i_am::IAmRequest;
use bacnode_core::services::read_property::{ReadPropertyAck, ReadPropertyRequest};
use bacnode_core::services::who_is::WhoIsRequest;
use bacnode_core::services::write_property::{WritePropertyRequest, SERVICE_WRITE_PROPERTY};
use bacnode_core::types::{ObjectId, ObjectType, PropertyId, PropertyValue, Segmentation};

#[test]
fn who_is_global_frame_matches_fixture() {
    let mut w = Writer::new();
    Npdu::new(0).encode(&mut w).unwrap();
    WhoIsRequest::global().encode(&mut w).unwrap();

    assert_eq!(w.as_written(), &[0x01, 0x00, 0x10, 0x08]);
}

#[test]
fn i_am_frame_matches_fixture() {
    let mut w = Writer::new();
    Npdu::new(0).encode(&mut w).unwrap();
    IAmRequest {
        device_id: ObjectId::new(ObjectType::Device, 389001),
        max_apdu: 1476,
        segmentation: Segmentation::NoSegmentation,
        vendor_id: 0,
    }
    .encode(&mut w)
    .unwrap();

    assert_eq!(
        w.as_written(),
        &[
            0x01, 0x00, 0x10, 0x00, 0xC4, 0x02, 0x05, 0xEF, 0x89, 0x22, 0x05, 0xC4, 0x91, 0x03,
            0x21, 0x00
        ]
    );
}

#[test]
fn read_property_request_is_decoded_from_fixture() {
    let frame = [
        0x01, 0x04, 0x00, 0x05, 0x01, 0x0C, 0x0C, 0x02, 0x05, 0xEF, 0x89, 0x19, 0x4D,
    ];
    let mut r = Reader::new(&frame);
    let npdu = Npdu::decode(&mut r).unwrap();
    assert!(npdu.expecting_reply());
    assert_eq!(ApduType::of_apdu(r.rest()), Some(ApduType::ConfirmedRequest));

    let header = ConfirmedRequestHeader::decode(&mut r).unwrap();
    assert_eq!(header.invoke_id, 1);
    let req = ReadPropertyRequest::decode_after_header(&mut r).unwrap();
    assert_eq!(req.object_id, ObjectId::new(ObjectType::Device, 389001));
    assert_eq!(req.property_id, PropertyId::ObjectName);
    assert_eq!(req.array_index, None);
}

#[test]
fn read_property_ack_frame_matches_fixture() {
    let mut w = Writer::new();
    Npdu::new(0).encode(&mut w).unwrap();
    ReadPropertyAck {
        object_id: ObjectId::new(ObjectType::Device, 389001),
        property_id: PropertyId::ObjectName,
        array_index: None,
        value: PropertyValue::CharacterString("Rainbow".into()),
    }
    .encode(&mut w, 1)
    .unwrap();

    assert_eq!(
        w.as_written(),
        &[
            0x01, 0x00, 0x30, 0x01, 0x0C, 0x0C, 0x02, 0x05, 0xEF, 0x89, 0x19, 0x4D, 0x3E, 0x75,
            0x08, 0x00, b'R', b'a', b'i', b'n', b'b', b'o', b'w', 0x3F
        ]
    );
}

#[test]
fn write_property_request_and_simple_ack() {
    let frame = [
        0x00, 0x05, 0x07, 0x0F, 0x0C, 0x00, 0x80, 0x00, 0x02, 0x19, 0x55, 0x3E, 0x44, 0x42, 0x28,
        0x00, 0x00, 0x3F, 0x49, 0x08,
    ];
    let mut r = Reader::new(&frame);
    let header = ConfirmedRequestHeader::decode(&mut r).unwrap();
    assert_eq!(header.service_choice, SERVICE_WRITE_PROPERTY);
    let req = WritePropertyRequest::decode_after_header(&mut r).unwrap();
    assert_eq!(req.value, PropertyValue::Real(42.0));
    assert_eq!(req.priority, Some(8));

    let mut w = Writer::new();
    SimpleAck {
        invoke_id: header.invoke_id,
        service_choice: header.service_choice,
    }
    .encode(&mut w)
    .unwrap();
    assert_eq!(w.as_written(), &[0x20, 0x07, 0x0F]);
}

#[cfg(feature = "serde")]
#[test]
fn property_values_serialize_for_configuration() {
    let value = PropertyValue::Array(vec![
        PropertyValue::CharacterString("Off".into()),
        PropertyValue::CharacterString("On".into()),
    ]);
    let json = serde_json::to_string(&value).unwrap();
    let back: PropertyValue = serde_json::from_str(&json).unwrap();
    assert_eq!(back, value);
}
