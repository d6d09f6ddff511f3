use std::collections::VecDeque;
use std::net::Ipv4Addr;
use std::time::Duration;

use bacnode_core::encoding::writer::Writer;
use bacnode_core::npdu::Npdu;
use bacnode_core::services::read_property::{ReadPropertyAck, ReadPropertyRequest};
use bacnode_core::services::subscribe_cov::SubscribeCovRequest;
use bacnode_core::services::who_is::WhoIsRequest;
use bacnode_core::types::{HostNPort, ObjectId, ObjectType, PropertyId, PropertyValue};
use bacnode_datalink::{ConnectionString, Transport, TransportError};
use bacnode_server::{BasicEngine, Driver, ServerConfig};
use tokio::time::Instant;

#[derive(Debug, Default)]
struct RecordingTransport {
    inbound: VecDeque<Vec<u8>>,
    sent: Vec<(Vec<u8>, bool)>,
}

impl Transport for RecordingTransport {
    fn receive(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<(usize, ConnectionString)>, TransportError> {
        let Some(frame) = self.inbound.pop_front() else {
            return Ok(None);
        };
        buf[..frame.len()].copy_from_slice(&frame);
        Ok(Some((frame.len(), workstation())))
    }

    async fn send(
        &mut self,
        payload: &[u8],
        _destination: ConnectionString,
        broadcast: bool,
    ) -> Result<usize, TransportError> {
        self.sent.push((payload.to_vec(), broadcast));
        Ok(payload.len())
    }
}

fn workstation() -> ConnectionString {
    ConnectionString::new(Ipv4Addr::new(192, 168, 1, 77), 47808)
}

fn frame(encode: impl FnOnce(&mut Writer)) -> Vec<u8> {
    let mut w = Writer::new();
    Npdu::local(true).encode(&mut w).unwrap();
    encode(&mut w);
    w.into_bytes()
}

fn sample_driver(inbound: Vec<Vec<u8>>) -> Driver<RecordingTransport, BasicEngine> {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = ServerConfig::default();
    let transport = RecordingTransport {
        inbound: inbound.into(),
        sent: Vec::new(),
    };
    Driver::new(
        config.build_device().unwrap(),
        transport,
        BasicEngine::new(),
        config.driver_config(),
    )
}

fn is_cov_notification(payload: &[u8]) -> bool {
    payload.len() > 3 && payload[2] == 0x10 && payload[3] == 0x02
}

#[tokio::test]
async fn who_is_reaches_sample_device() {
    let who_is = frame(|w| WhoIsRequest::global().encode(w).unwrap());
    let mut driver = sample_driver(vec![who_is]);
    assert_eq!(driver.tick(Instant::now()).await, None);

    let sent = &driver.transport().sent;
    assert_eq!(sent.len(), 1);
    let (i_am, broadcast) = &sent[0];
    assert!(broadcast);
    // Global broadcast NPDU, then I-Am carrying device,389001.
    assert_eq!(&i_am[..6], &[0x01, 0x20, 0xFF, 0xFF, 0x00, 0xFF]);
    assert_eq!(&i_am[6..13], &[0x10, 0x00, 0xC4, 0x02, 0x05, 0xEF, 0x89]);
}

#[tokio::test]
async fn network_port_reports_bbmd() {
    let object_id = ObjectId::new(ObjectType::NetworkPort, 50);
    let rp = frame(|w| {
        ReadPropertyRequest {
            object_id,
            property_id: PropertyId::FdBbmdAddress,
            array_index: None,
        }
        .encode(w, 2)
        .unwrap()
    });
    let mut driver = sample_driver(vec![rp]);
    driver.tick(Instant::now()).await;

    let mut expected = Writer::new();
    Npdu::new(0).encode(&mut expected).unwrap();
    ReadPropertyAck {
        object_id,
        property_id: PropertyId::FdBbmdAddress,
        array_index: None,
        value: PropertyValue::HostNPort(HostNPort::ip(Ipv4Addr::new(192, 168, 1, 4), 47808)),
    }
    .encode(&mut expected, 2)
    .unwrap();
    assert_eq!(driver.transport().sent, vec![(expected.into_bytes(), false)]);
}

#[tokio::test]
async fn scheduled_increments_drive_cov_notifications() {
    let subscribe = frame(|w| {
        SubscribeCovRequest {
            subscriber_process_id: 1,
            monitored_object_id: ObjectId::new(ObjectType::AnalogInput, 0),
            issue_confirmed_notifications: Some(false),
            lifetime_seconds: Some(600),
        }
        .encode(w, 5)
        .unwrap()
    });
    let mut driver = sample_driver(vec![subscribe]);
    let start = Instant::now();
    driver.tick(start).await;

    let sent = &driver.transport().sent;
    assert_eq!(sent.len(), 2);
    assert_eq!(&sent[0].0[2..], &[0x20, 0x05, 0x05]);
    assert!(is_cov_notification(&sent[1].0));

    // AI0 climbs 0.1 per second against a COV increment of 1.0.
    for second in 1..=12 {
        driver.tick(start + Duration::from_secs(second)).await;
    }
    let notifications = driver
        .transport()
        .sent
        .iter()
        .skip(2)
        .filter(|(payload, _)| is_cov_notification(payload))
        .count();
    assert_eq!(notifications, 1);

    let value = driver
        .device()
        .get_property(389001, ObjectType::AnalogInput, 0, PropertyId::PresentValue, None)
        .unwrap()
        .as_f64()
        .unwrap();
    assert!((value - 100.8).abs() < 1e-3);
}
