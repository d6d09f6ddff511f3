//! Engine for the services a small BACnet/IP server device answers:
//! Who-Is, ReadProperty, ReadPropertyMultiple, WriteProperty,
//! WritePropertyMultiple, SubscribeCOV, SubscribeCOVProperty, the two text
//! message services, DeviceCommunicationControl and ReinitializeDevice.
//!
//! I-Am goes out as a global broadcast (DNET 65535). Replies and COV
//! notifications to a client behind a router carry its SNET/SADR as DNET/DADR.

use std::time::Duration;

use bacnode_core::apdu::{
    AbortPdu, ApduType, ConfirmedRequestHeader, ErrorPdu, RejectPdu, SimpleAck,
    UnconfirmedRequestHeader,
};
use bacnode_core::encoding::{reader::Reader, writer::Writer};
use bacnode_core::npdu::{Npdu, NpduAddress};
use bacnode_core::services::cov_notification::CovNotification;
use bacnode_core::services::device_management::{
    DeviceCommunicationControlRequest, ReinitializeDeviceRequest,
    SERVICE_DEVICE_COMMUNICATION_CONTROL, SERVICE_REINITIALIZE_DEVICE,
};
use bacnode_core::services::i_am::IAmRequest;
use bacnode_core::services::read_property::{
    ReadPropertyAck, ReadPropertyRequest, SERVICE_READ_PROPERTY,
};
use bacnode_core::services::read_property_multiple::{
    ReadAccessResult, ReadPropertyMultipleAck, ReadPropertyMultipleRequest, ReadResult,
    SERVICE_READ_PROPERTY_MULTIPLE,
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
use bacnode_core::types::{
    AbortReason, CommunicationState, ErrorClass, ErrorCode, ObjectId, PropertyId,
    PropertyValue, RejectReason, Segmentation,
};
use bacnode_core::{DecodeError, EncodeError};
use bacnode_datalink::ConnectionString;
use log::{debug, info, warn};
use tokio::time::Instant;

use super::cov::{should_notify, CovTable, Subscription};
use super::{Outbox, ProtocolEngine};
use crate::device::{Device, ValueUpdate};
use crate::error::{AccessError, ReinitError};

/// Default priority for a WriteProperty without one.
const DEFAULT_PRIORITY: u8 = 16;

/// How a confirmed request failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    Error(ErrorClass, ErrorCode),
    Reject(RejectReason),
    Abort(AbortReason),
}

impl Failure {
    fn encode(self, header: &ConfirmedRequestHeader, w: &mut Writer) -> Result<(), EncodeError> {
        match self {
            Self::Error(error_class, error_code) => ErrorPdu {
                invoke_id: header.invoke_id,
                service_choice: header.service_choice,
                error_class,
                error_code,
            }
            .encode(w),
            Self::Reject(reason) => RejectPdu {
                invoke_id: header.invoke_id,
                reason,
            }
            .encode(w),
            Self::Abort(reason) => AbortPdu {
                invoke_id: header.invoke_id,
                reason,
            }
            .encode(w),
        }
    }
}

impl From<DecodeError> for Failure {
    fn from(err: DecodeError) -> Self {
        Self::Reject(err.reject_reason())
    }
}

impl From<AccessError> for Failure {
    fn from(err: AccessError) -> Self {
        let (class, code) = err.error_class_code();
        Self::Error(class, code)
    }
}

impl From<ReinitError> for Failure {
    fn from(err: ReinitError) -> Self {
        let (class, code) = err.error_class_code();
        Self::Error(class, code)
    }
}

impl From<EncodeError> for Failure {
    fn from(err: EncodeError) -> Self {
        match err {
            EncodeError::FrameTooLarge => Self::Abort(AbortReason::SegmentationNotSupported),
            _ => Self::Abort(AbortReason::Other),
        }
    }
}

/// A request handler's view of one confirmed request.
struct Request<'a> {
    header: ConfirmedRequestHeader,
    source: ConnectionString,
    /// SNET/SADR when the request came through a router.
    route: Option<NpduAddress>,
    now: Instant,
    /// Frames to send to the requester after the reply.
    deferred: &'a mut Vec<Vec<u8>>,
}

/// Parameters shared by SubscribeCOV and SubscribeCOVProperty.
struct CovRequest {
    process_id: u32,
    object_id: ObjectId,
    cancel: bool,
    confirmed: Option<bool>,
    lifetime_seconds: Option<u32>,
    property: PropertyId,
    increment: Option<f64>,
}

#[derive(Debug, Default)]
pub struct BasicEngine {
    cov: CovTable,
}

impl BasicEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriptions(&self) -> &CovTable {
        &self.cov
    }

    fn confirmed(
        &mut self,
        device: &mut Device,
        npdu: &Npdu,
        apdu: &[u8],
        source: ConnectionString,
        now: Instant,
        outbox: &mut Outbox,
    ) {
        let mut r = Reader::new(apdu);
        let header = match ConfirmedRequestHeader::decode(&mut r) {
            Ok(header) => header,
            Err(err) => {
                debug!("malformed confirmed request from {source}: {err}");
                return;
            }
        };
        if device.communication_state() == CommunicationState::Disable
            && !matches!(
                header.service_choice,
                SERVICE_DEVICE_COMMUNICATION_CONTROL | SERVICE_REINITIALIZE_DEVICE
            )
        {
            debug!(
                "communication disabled, dropping service 0x{:02x} from {source}",
                header.service_choice
            );
            return;
        }

        let mut w = Writer::new();
        if let Err(err) = Npdu::reply_to(npdu).encode(&mut w) {
            warn!("cannot encode reply header for {source}: {err}");
            return;
        }
        let body_start = w.len();
        let mut deferred = Vec::new();
        let result = if header.segmented {
            Err(Failure::Abort(AbortReason::SegmentationNotSupported))
        } else {
            let mut request = Request {
                header,
                source,
                route: npdu.source.clone(),
                now,
                deferred: &mut deferred,
            };
            self.dispatch(device, &mut request, &mut r, &mut w)
        };
        if let Err(failure) = result {
            debug!(
                "service 0x{:02x} invoke {} from {source} failed: {failure:?}",
                header.service_choice, header.invoke_id
            );
            w.truncate(body_start);
            deferred.clear();
            if let Err(err) = failure.encode(&header, &mut w) {
                warn!("cannot encode failure reply for {source}: {err}");
                return;
            }
        }
        outbox.push_unicast(w.into_bytes(), source);
        for payload in deferred {
            outbox.push_unicast(payload, source);
        }
    }

    fn dispatch(
        &mut self,
        device: &mut Device,
        request: &mut Request<'_>,
        r: &mut Reader<'_>,
        w: &mut Writer,
    ) -> Result<(), Failure> {
        let invoke_id = request.header.invoke_id;
        match request.header.service_choice {
            SERVICE_READ_PROPERTY => read_property(device, invoke_id, r, w),
            SERVICE_READ_PROPERTY_MULTIPLE => read_property_multiple(device, invoke_id, r, w),
            SERVICE_WRITE_PROPERTY => write_property(device, invoke_id, r, w),
            SERVICE_WRITE_PROPERTY_MULTIPLE => write_property_multiple(device, invoke_id, r, w),
            SERVICE_SUBSCRIBE_COV => {
                let req = SubscribeCovRequest::decode_after_header(r)?;
                self.register_cov(
                    device,
                    request,
                    w,
                    CovRequest {
                        process_id: req.subscriber_process_id,
                        object_id: req.monitored_object_id,
                        cancel: req.is_cancellation(),
                        confirmed: req.issue_confirmed_notifications,
                        lifetime_seconds: req.lifetime_seconds,
                        property: PropertyId::PresentValue,
                        increment: None,
                    },
                )
            }
            SERVICE_SUBSCRIBE_COV_PROPERTY => {
                let req = SubscribeCovPropertyRequest::decode_after_header(r)?;
                if req.monitored_property.array_index.is_some() {
                    return Err(Failure::Error(ErrorClass::Property, ErrorCode::NotCovProperty));
                }
                self.register_cov(
                    device,
                    request,
                    w,
                    CovRequest {
                        process_id: req.subscriber_process_id,
                        object_id: req.monitored_object_id,
                        cancel: req.is_cancellation(),
                        confirmed: req.issue_confirmed_notifications,
                        lifetime_seconds: req.lifetime_seconds,
                        property: req.monitored_property.property_id,
                        increment: req.cov_increment.map(f64::from),
                    },
                )
            }
            SERVICE_CONFIRMED_TEXT_MESSAGE => {
                let message = TextMessage::decode_after_header(r)?;
                log_text_message(&message, request.source);
                ack(w, invoke_id, SERVICE_CONFIRMED_TEXT_MESSAGE)
            }
            SERVICE_DEVICE_COMMUNICATION_CONTROL => {
                communication_control(device, invoke_id, request.now, r, w)
            }
            SERVICE_REINITIALIZE_DEVICE => reinitialize(device, invoke_id, r, w),
            other => {
                debug!("unrecognized confirmed service 0x{other:02x}");
                Err(Failure::Reject(RejectReason::UnrecognizedService))
            }
        }
    }

    fn unconfirmed(
        &mut self,
        device: &Device,
        apdu: &[u8],
        source: ConnectionString,
        outbox: &mut Outbox,
    ) {
        if device.communication_state() == CommunicationState::Disable {
            return;
        }
        let mut r = Reader::new(apdu);
        let header = match UnconfirmedRequestHeader::decode(&mut r) {
            Ok(header) => header,
            Err(err) => {
                debug!("malformed unconfirmed request from {source}: {err}");
                return;
            }
        };
        match header.service_choice {
            SERVICE_WHO_IS => match WhoIsRequest::decode_after_header(&mut r) {
                Ok(who_is) if who_is.matches(device.instance()) => {
                    debug!("who-is from {source}, answering");
                    queue_i_am(device, outbox);
                }
                Ok(_) => {}
                Err(err) => debug!("malformed who-is from {source}: {err}"),
            },
            SERVICE_UNCONFIRMED_TEXT_MESSAGE => match TextMessage::decode_after_header(&mut r) {
                Ok(message) => log_text_message(&message, source),
                Err(err) => debug!("malformed text message from {source}: {err}"),
            },
            other => debug!("ignoring unconfirmed service 0x{other:02x} from {source}"),
        }
    }

    fn register_cov(
        &mut self,
        device: &Device,
        request: &mut Request<'_>,
        w: &mut Writer,
        cov: CovRequest,
    ) -> Result<(), Failure> {
        let service_choice = request.header.service_choice;
        let object_id = resolve(device, cov.object_id)?;
        let object = device
            .store()
            .object(object_id)
            .ok_or(AccessError::NotFound)?;

        if cov.cancel {
            let removed =
                self.cov
                    .cancel(request.source, cov.process_id, object_id, cov.property);
            debug!(
                "cov cancel {} {object_id} {:?} from {}: removed={removed}",
                cov.process_id, cov.property, request.source
            );
            return ack(w, request.header.invoke_id, service_choice);
        }
        if cov.confirmed == Some(true) {
            return Err(Failure::Error(
                ErrorClass::Services,
                ErrorCode::OptionalFunctionalityNotSupported,
            ));
        }
        let subscribable = object
            .slot(cov.property)
            .is_some_and(|slot| slot.enabled && slot.subscribable);
        if !subscribable {
            return Err(Failure::Error(ErrorClass::Property, ErrorCode::NotCovProperty));
        }

        let expires_at = cov
            .lifetime_seconds
            .filter(|&seconds| seconds > 0)
            .map(|seconds| request.now + Duration::from_secs(u64::from(seconds)));
        let mut subscription = Subscription {
            subscriber: request.source,
            route: request.route.clone(),
            process_id: cov.process_id,
            object_id,
            property: cov.property,
            increment: cov.increment,
            expires_at,
            last_value: None,
        };
        if device.communication_state() == CommunicationState::Enable {
            if let Ok(current) = read(device, object_id, cov.property) {
                request
                    .deferred
                    .push(encode_notification(device, &subscription, current.clone(), request.now)?);
                subscription.last_value = Some(current);
            }
        }
        info!(
            "cov subscription {} on {object_id} {:?} from {} (lifetime {:?})",
            subscription.process_id, subscription.property, subscription.subscriber, cov.lifetime_seconds
        );
        self.cov.subscribe(subscription);
        ack(w, request.header.invoke_id, service_choice)
    }
}

impl ProtocolEngine for BasicEngine {
    fn process(
        &mut self,
        device: &mut Device,
        frame: &[u8],
        source: ConnectionString,
        now: Instant,
        outbox: &mut Outbox,
    ) {
        let mut r = Reader::new(frame);
        let npdu = match Npdu::decode(&mut r) {
            Ok(npdu) => npdu,
            Err(err) => {
                debug!("malformed npdu from {source}: {err}");
                return;
            }
        };
        if npdu.is_network_message() || !npdu.is_for_local_device() {
            debug!("ignoring network-layer or routed-away npdu from {source}");
            return;
        }
        let apdu = r.rest();
        match ApduType::of_apdu(apdu) {
            Some(ApduType::ConfirmedRequest) => {
                self.confirmed(device, &npdu, apdu, source, now, outbox)
            }
            Some(ApduType::UnconfirmedRequest) => self.unconfirmed(device, apdu, source, outbox),
            other => debug!("ignoring apdu {other:?} from {source}"),
        }
    }

    fn tick(&mut self, _device: &mut Device, now: Instant, _outbox: &mut Outbox) {
        self.cov.expire(now);
    }

    fn value_updated(
        &mut self,
        device: &Device,
        update: ValueUpdate,
        now: Instant,
        outbox: &mut Outbox,
    ) {
        if device.communication_state() != CommunicationState::Enable {
            return;
        }
        let Ok(current) = read(device, update.object_id, update.property) else {
            return;
        };
        let object_increment = if update.property == PropertyId::PresentValue {
            read(device, update.object_id, PropertyId::CovIncrement)
                .ok()
                .and_then(|value| value.as_f64())
        } else {
            None
        };
        for subscription in self.cov.watching_mut(update.object_id, update.property) {
            let increment = subscription.increment.or(object_increment);
            if !should_notify(subscription.last_value.as_ref(), &current, increment) {
                continue;
            }
            match encode_notification(device, subscription, current.clone(), now) {
                Ok(payload) => {
                    debug!(
                        "cov notification {} {:?} to {}",
                        update.object_id, update.property, subscription.subscriber
                    );
                    outbox.push_unicast(payload, subscription.subscriber);
                    subscription.last_value = Some(current.clone());
                }
                Err(err) => warn!("cannot encode cov notification: {err}"),
            }
        }
    }

    fn send_i_am(&mut self, device: &Device, outbox: &mut Outbox) {
        if device.communication_state() != CommunicationState::Enable {
            debug!("initiation disabled, not sending I-Am");
            return;
        }
        queue_i_am(device, outbox);
    }
}

fn queue_i_am(device: &Device, outbox: &mut Outbox) {
    let mut w = Writer::new();
    let encoded = Npdu::global_broadcast().encode(&mut w).and_then(|()| {
        IAmRequest {
            device_id: device.device_id(),
            max_apdu: device.max_apdu(),
            segmentation: Segmentation::NoSegmentation,
            vendor_id: device.vendor_id(),
        }
        .encode(&mut w)
    });
    match encoded {
        Ok(()) => outbox.push_broadcast(w.into_bytes()),
        Err(err) => warn!("cannot encode I-Am: {err}"),
    }
}

fn resolve(device: &Device, id: ObjectId) -> Result<ObjectId, AccessError> {
    device.resolve(device.instance(), id.object_type(), id.instance())
}

fn read(device: &Device, id: ObjectId, property: PropertyId) -> Result<PropertyValue, AccessError> {
    read_element(device, id, property, None)
}

fn read_element(
    device: &Device,
    id: ObjectId,
    property: PropertyId,
    array_index: Option<u32>,
) -> Result<PropertyValue, AccessError> {
    device.get_property(
        device.instance(),
        id.object_type(),
        id.instance(),
        property,
        array_index,
    )
}

fn ack(w: &mut Writer, invoke_id: u8, service_choice: u8) -> Result<(), Failure> {
    SimpleAck {
        invoke_id,
        service_choice,
    }
    .encode(w)?;
    Ok(())
}

fn read_property(
    device: &Device,
    invoke_id: u8,
    r: &mut Reader<'_>,
    w: &mut Writer,
) -> Result<(), Failure> {
    let req = ReadPropertyRequest::decode_after_header(r)?;
    let object_id = resolve(device, req.object_id)?;
    let value = read_element(device, object_id, req.property_id, req.array_index)?;
    ReadPropertyAck {
        object_id,
        property_id: req.property_id,
        array_index: req.array_index,
        value,
    }
    .encode(w, invoke_id)?;
    Ok(())
}

fn read_property_multiple(
    device: &Device,
    invoke_id: u8,
    r: &mut Reader<'_>,
    w: &mut Writer,
) -> Result<(), Failure> {
    let req = ReadPropertyMultipleRequest::decode_after_header(r)?;
    let mut results = Vec::with_capacity(req.specs.len());
    for spec in req.specs {
        let object_id = resolve(device, spec.object_id).unwrap_or(spec.object_id);
        let mut object_results = Vec::new();
        for reference in spec.properties {
            match reference.property_id {
                selector @ (PropertyId::All | PropertyId::Required | PropertyId::Optional) => {
                    match device.selected_properties(object_id, selector) {
                        Ok(properties) => {
                            object_results.extend(properties.into_iter().map(|property_id| {
                                ReadResult {
                                    property_id,
                                    array_index: None,
                                    value: read(device, object_id, property_id)
                                        .map_err(AccessError::error_class_code),
                                }
                            }))
                        }
                        Err(err) => object_results.push(ReadResult {
                            property_id: selector,
                            array_index: None,
                            value: Err(err.error_class_code()),
                        }),
                    }
                }
                property_id => object_results.push(ReadResult {
                    property_id,
                    array_index: reference.array_index,
                    value: read_element(device, object_id, property_id, reference.array_index)
                        .map_err(AccessError::error_class_code),
                }),
            }
        }
        results.push(ReadAccessResult {
            object_id,
            results: object_results,
        });
    }
    ReadPropertyMultipleAck { results }.encode(w, invoke_id)?;
    Ok(())
}

fn write_property(
    device: &mut Device,
    invoke_id: u8,
    r: &mut Reader<'_>,
    w: &mut Writer,
) -> Result<(), Failure> {
    let req = WritePropertyRequest::decode_after_header(r)?;
    let object_id = resolve(device, req.object_id)?;
    device.set_property(
        device.instance(),
        object_id.object_type(),
        object_id.instance(),
        req.property_id,
        req.value,
        req.array_index,
        req.priority.unwrap_or(DEFAULT_PRIORITY),
    )?;
    ack(w, invoke_id, SERVICE_WRITE_PROPERTY)
}

/// Applies each write in order. Writes before a failure stay applied; the
/// error names the first one that failed.
fn write_property_multiple(
    device: &mut Device,
    invoke_id: u8,
    r: &mut Reader<'_>,
    w: &mut Writer,
) -> Result<(), Failure> {
    let req = WritePropertyMultipleRequest::decode_after_header(r)?;
    for spec in req.specs {
        let object_id = resolve(device, spec.object_id)?;
        for write in spec.properties {
            let property_id = write.property_id;
            device
                .set_property(
                    device.instance(),
                    object_id.object_type(),
                    object_id.instance(),
                    property_id,
                    write.value,
                    write.array_index,
                    write.priority.unwrap_or(DEFAULT_PRIORITY),
                )
                .map_err(|err| {
                    debug!("write-property-multiple stopped at {object_id} {property_id:?}: {err}");
                    err
                })?;
        }
    }
    ack(w, invoke_id, SERVICE_WRITE_PROPERTY_MULTIPLE)
}

fn log_text_message(message: &TextMessage, source: ConnectionString) {
    let priority = if message.urgent { "urgent" } else { "normal" };
    info!(
        "{priority} text message from {} ({source}): {}",
        message.source_device, message.message
    );
}

fn communication_control(
    device: &mut Device,
    invoke_id: u8,
    now: Instant,
    r: &mut Reader<'_>,
    w: &mut Writer,
) -> Result<(), Failure> {
    let req = DeviceCommunicationControlRequest::decode_after_header(r)?;
    let duration = req
        .duration_minutes
        .map(|minutes| Duration::from_secs(u64::from(minutes) * 60));
    device.set_communication_control(req.enable_disable, req.password.as_deref(), duration, now)?;
    ack(w, invoke_id, SERVICE_DEVICE_COMMUNICATION_CONTROL)
}

fn reinitialize(
    device: &mut Device,
    invoke_id: u8,
    r: &mut Reader<'_>,
    w: &mut Writer,
) -> Result<(), Failure> {
    let req = ReinitializeDeviceRequest::decode_after_header(r)?;
    let outcome = device.reinitialize_device(req.state, req.password.as_deref())?;
    info!("reinitialize {:?}: {outcome:?}", req.state);
    ack(w, invoke_id, SERVICE_REINITIALIZE_DEVICE)
}

fn encode_notification(
    device: &Device,
    subscription: &Subscription,
    value: PropertyValue,
    now: Instant,
) -> Result<Vec<u8>, EncodeError> {
    let mut values = vec![(subscription.property, value)];
    if subscription.property != PropertyId::StatusFlags {
        if let Ok(flags) = read(device, subscription.object_id, PropertyId::StatusFlags) {
            values.push((PropertyId::StatusFlags, flags));
        }
    }
    let mut w = Writer::new();
    Npdu::routed(subscription.route.clone()).encode(&mut w)?;
    CovNotification {
        subscriber_process_id: subscription.process_id,
        initiating_device_id: device.device_id(),
        monitored_object_id: subscription.object_id,
        time_remaining_seconds: subscription.time_remaining(now),
        values,
    }
    .encode_unconfirmed(&mut w)?;
    Ok(w.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::BasicEngine;
    use crate::device::{Device, DeviceInfo, ValueUpdate};
    use crate::engine::{Outbox, ProtocolEngine};
    use crate::network_port::NetworkPortConfig;
    use bacnode_core::apdu::{
        AbortPdu, ConfirmedRequestHeader, ErrorPdu, RejectPdu, SimpleAck,
    };
    use bacnode_core::encoding::writer::Writer;
    use bacnode_core::npdu::{Npdu, NpduAddress};
    use bacnode_core::services::cov_notification::CovNotification;
    use bacnode_core::services::device_management::{
        DeviceCommunicationControlRequest, ReinitializeDeviceRequest,
        SERVICE_DEVICE_COMMUNICATION_CONTROL, SERVICE_REINITIALIZE_DEVICE,
    };
    use bacnode_core::services::i_am::IAmRequest;
    use bacnode_core::services::read_property::{
        ReadPropertyAck, ReadPropertyRequest, SERVICE_READ_PROPERTY,
    };
    use bacnode_core::services::read_property_multiple::{
        PropertyReference, ReadAccessSpec, ReadPropertyMultipleRequest,
        SERVICE_READ_PROPERTY_MULTIPLE,
    };
    use bacnode_core::services::subscribe_cov::{SubscribeCovRequest, SERVICE_SUBSCRIBE_COV};
    use bacnode_core::services::subscribe_cov_property::{
        SubscribeCovPropertyRequest, SERVICE_SUBSCRIBE_COV_PROPERTY,
    };
    use bacnode_core::services::text_message::{
        MessageClass, TextMessage, SERVICE_CONFIRMED_TEXT_MESSAGE,
    };
    use bacnode_core::services::who_is::WhoIsRequest;
    use bacnode_core::services::write_property::{WritePropertyRequest, SERVICE_WRITE_PROPERTY};
    use bacnode_core::services::write_property_multiple::{
        PropertyWriteSpec, WriteAccessSpec, WritePropertyMultipleRequest,
        SERVICE_WRITE_PROPERTY_MULTIPLE,
    };
    use bacnode_core::types::object_id::WILDCARD_INSTANCE;
    use bacnode_core::types::{
        AbortReason, BitString, CommunicationState, ErrorClass, ErrorCode, ObjectId, ObjectType,
        PropertyId, PropertyValue, ReinitializeState, RejectReason, Segmentation,
    };
    use bacnode_datalink::ConnectionString;
    use std::net::Ipv4Addr;
    use tokio::time::Instant;

    const DEVICE: u32 = 389001;

    fn client() -> ConnectionString {
        ConnectionString::new(Ipv4Addr::new(192, 168, 1, 20), 47808)
    }

    fn ai0() -> ObjectId {
        ObjectId::new(ObjectType::AnalogInput, 0)
    }

    fn device() -> Device {
        let mut device = Device::new(&DeviceInfo::default(), "12345").unwrap();
        device
            .install_network_port(&NetworkPortConfig::default())
            .unwrap();
        device.add_object(DEVICE, ObjectType::AnalogInput, 0).unwrap();
        device
            .set_property_enabled(DEVICE, ObjectType::AnalogInput, 0, PropertyId::CovIncrement, true)
            .unwrap();
        device
            .set_initial_value(
                DEVICE,
                ObjectType::AnalogInput,
                0,
                PropertyId::PresentValue,
                PropertyValue::Real(99.6),
            )
            .unwrap();
        device
            .set_initial_value(
                DEVICE,
                ObjectType::AnalogInput,
                0,
                PropertyId::CovIncrement,
                PropertyValue::Real(1.0),
            )
            .unwrap();
        device
            .set_property_subscribable(DEVICE, ObjectType::AnalogInput, 0, PropertyId::PresentValue, true)
            .unwrap();
        device.add_object(DEVICE, ObjectType::AnalogValue, 2).unwrap();
        device
            .set_property_writable(DEVICE, ObjectType::AnalogValue, 2, PropertyId::PresentValue, true)
            .unwrap();
        device
    }

    fn frame(expecting_reply: bool, body: impl FnOnce(&mut Writer)) -> Vec<u8> {
        let mut w = Writer::new();
        Npdu::local(expecting_reply).encode(&mut w).unwrap();
        body(&mut w);
        w.into_bytes()
    }

    /// SNET/SADR of a client on network 5 behind a router.
    fn remote() -> NpduAddress {
        NpduAddress {
            network: 5,
            mac: vec![0x07],
        }
    }

    fn routed_frame(expecting_reply: bool, body: impl FnOnce(&mut Writer)) -> Vec<u8> {
        let mut w = Writer::new();
        Npdu {
            source: Some(remote()),
            ..Npdu::local(expecting_reply)
        }
        .encode(&mut w)
        .unwrap();
        body(&mut w);
        w.into_bytes()
    }

    fn reply(body: impl FnOnce(&mut Writer)) -> Vec<u8> {
        let mut w = Writer::new();
        Npdu::new(0).encode(&mut w).unwrap();
        body(&mut w);
        w.into_bytes()
    }

    fn run(engine: &mut BasicEngine, device: &mut Device, request: &[u8]) -> Outbox {
        let mut outbox = Outbox::new();
        engine.process(device, request, client(), Instant::now(), &mut outbox);
        outbox
    }

    fn payloads(outbox: &mut Outbox) -> Vec<Vec<u8>> {
        outbox.drain().map(|m| m.payload).collect()
    }

    fn i_am() -> Vec<u8> {
        let mut w = Writer::new();
        Npdu::global_broadcast().encode(&mut w).unwrap();
        IAmRequest {
            device_id: ObjectId::new(ObjectType::Device, DEVICE),
            max_apdu: 1476,
            segmentation: Segmentation::NoSegmentation,
            vendor_id: 0,
        }
        .encode(&mut w)
        .unwrap();
        w.into_bytes()
    }

    fn read_request(invoke_id: u8, object_id: ObjectId, property_id: PropertyId) -> Vec<u8> {
        frame(true, |w| {
            ReadPropertyRequest {
                object_id,
                property_id,
                array_index: None,
            }
            .encode(w, invoke_id)
            .unwrap()
        })
    }

    fn dcc_request(state: CommunicationState) -> Vec<u8> {
        frame(true, |w| {
            DeviceCommunicationControlRequest {
                duration_minutes: None,
                enable_disable: state,
                password: Some("12345".into()),
            }
            .encode(w, 4)
            .unwrap()
        })
    }

    #[test]
    fn who_is_in_range_gets_broadcast_i_am() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let who_is = |low, high| {
            frame(false, |w| {
                WhoIsRequest {
                    low_limit: Some(low),
                    high_limit: Some(high),
                }
                .encode(w)
                .unwrap()
            })
        };

        let mut outbox = run(&mut engine, &mut device, &who_is(389000, 389002));
        let messages: Vec<_> = outbox.drain().collect();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].broadcast);
        assert_eq!(messages[0].payload, i_am());

        assert!(run(&mut engine, &mut device, &who_is(1, 10)).is_empty());
    }

    #[test]
    fn read_property_acks_present_value() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let mut outbox = run(
            &mut engine,
            &mut device,
            &read_request(1, ai0(), PropertyId::PresentValue),
        );
        let expected = reply(|w| {
            ReadPropertyAck {
                object_id: ai0(),
                property_id: PropertyId::PresentValue,
                array_index: None,
                value: PropertyValue::Real(99.6),
            }
            .encode(w, 1)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![expected]);
    }

    #[test]
    fn read_property_on_wildcard_device_reports_real_instance() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let mut outbox = run(
            &mut engine,
            &mut device,
            &read_request(
                2,
                ObjectId::new(ObjectType::Device, WILDCARD_INSTANCE),
                PropertyId::ObjectName,
            ),
        );
        let expected = reply(|w| {
            ReadPropertyAck {
                object_id: ObjectId::new(ObjectType::Device, DEVICE),
                property_id: PropertyId::ObjectName,
                array_index: None,
                value: PropertyValue::CharacterString("Device Rainbow".into()),
            }
            .encode(w, 2)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![expected]);
    }

    #[test]
    fn read_errors_map_to_error_pdus() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let cases = [
            (
                ai0(),
                PropertyId::Description,
                ErrorClass::Property,
                ErrorCode::UnknownProperty,
            ),
            (
                ObjectId::new(ObjectType::AnalogInput, 99),
                PropertyId::PresentValue,
                ErrorClass::Object,
                ErrorCode::UnknownObject,
            ),
        ];
        for (object_id, property_id, error_class, error_code) in cases {
            let mut outbox = run(
                &mut engine,
                &mut device,
                &read_request(3, object_id, property_id),
            );
            let expected = reply(|w| {
                ErrorPdu {
                    invoke_id: 3,
                    service_choice: SERVICE_READ_PROPERTY,
                    error_class,
                    error_code,
                }
                .encode(w)
                .unwrap()
            });
            assert_eq!(payloads(&mut outbox), vec![expected]);
        }
    }

    #[test]
    fn write_property_acks_and_stores() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let write = |object_id, value| {
            frame(true, |w| {
                WritePropertyRequest {
                    object_id,
                    property_id: PropertyId::PresentValue,
                    array_index: None,
                    value,
                    priority: Some(8),
                }
                .encode(w, 9)
                .unwrap()
            })
        };

        let mut outbox = run(
            &mut engine,
            &mut device,
            &write(ObjectId::new(ObjectType::AnalogValue, 2), PropertyValue::Real(42.0)),
        );
        let acked = reply(|w| {
            SimpleAck {
                invoke_id: 9,
                service_choice: SERVICE_WRITE_PROPERTY,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![acked]);
        assert_eq!(
            device.get_property(DEVICE, ObjectType::AnalogValue, 2, PropertyId::PresentValue, None),
            Ok(PropertyValue::Real(42.0))
        );

        let mut outbox = run(&mut engine, &mut device, &write(ai0(), PropertyValue::Real(1.0)));
        let denied = reply(|w| {
            ErrorPdu {
                invoke_id: 9,
                service_choice: SERVICE_WRITE_PROPERTY,
                error_class: ErrorClass::Property,
                error_code: ErrorCode::WriteAccessDenied,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![denied]);
    }

    #[test]
    fn unknown_and_segmented_requests() {
        let mut engine = BasicEngine::new();
        let mut device = device();

        let unknown = frame(true, |w| ConfirmedRequestHeader::new(5, 0x1F).encode(w).unwrap());
        let mut outbox = run(&mut engine, &mut device, &unknown);
        let rejected = reply(|w| {
            RejectPdu {
                invoke_id: 5,
                reason: RejectReason::UnrecognizedService,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![rejected]);

        let segmented = frame(true, |w| {
            ConfirmedRequestHeader {
                segmented: true,
                more_follows: true,
                sequence_number: Some(0),
                proposed_window_size: Some(1),
                ..ConfirmedRequestHeader::new(6, SERVICE_READ_PROPERTY)
            }
            .encode(w)
            .unwrap()
        });
        let mut outbox = run(&mut engine, &mut device, &segmented);
        let aborted = reply(|w| {
            AbortPdu {
                invoke_id: 6,
                reason: AbortReason::SegmentationNotSupported,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![aborted]);
    }

    #[test]
    fn truncated_request_is_rejected() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let truncated = frame(true, |w| {
            ConfirmedRequestHeader::new(7, SERVICE_READ_PROPERTY)
                .encode(w)
                .unwrap()
        });
        let mut outbox = run(&mut engine, &mut device, &truncated);
        let sent = payloads(&mut outbox);
        assert_eq!(sent.len(), 1);
        assert_eq!(&sent[0][2..4], &[0x60, 7]);
    }

    #[test]
    fn network_messages_are_ignored() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        assert!(run(&mut engine, &mut device, &[0x01, 0x80, 0x00]).is_empty());
        assert!(run(&mut engine, &mut device, &[0x01]).is_empty());
    }

    #[test]
    fn read_property_multiple_reports_inline_errors() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let request = frame(true, |w| {
            ReadPropertyMultipleRequest {
                specs: vec![
                    ReadAccessSpec {
                        object_id: ai0(),
                        properties: vec![
                            PropertyReference {
                                property_id: PropertyId::All,
                                array_index: None,
                            },
                            PropertyReference {
                                property_id: PropertyId::Description,
                                array_index: None,
                            },
                        ],
                    },
                    ReadAccessSpec {
                        object_id: ObjectId::new(ObjectType::BinaryInput, 77),
                        properties: vec![PropertyReference {
                            property_id: PropertyId::PresentValue,
                            array_index: None,
                        }],
                    },
                ],
            }
            .encode(w, 11)
            .unwrap()
        });
        let mut outbox = run(&mut engine, &mut device, &request);
        let sent = payloads(&mut outbox);
        assert_eq!(sent.len(), 1);
        assert_eq!(&sent[0][2..5], &[0x30, 11, SERVICE_READ_PROPERTY_MULTIPLE]);
    }

    #[test]
    fn cov_subscription_notifies_on_increment() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let subscribe = frame(true, |w| {
            SubscribeCovRequest {
                subscriber_process_id: 17,
                monitored_object_id: ai0(),
                issue_confirmed_notifications: Some(false),
                lifetime_seconds: Some(0),
            }
            .encode(w, 12)
            .unwrap()
        });
        let mut outbox = run(&mut engine, &mut device, &subscribe);
        let sent = payloads(&mut outbox);
        let acked = reply(|w| {
            SimpleAck {
                invoke_id: 12,
                service_choice: SERVICE_SUBSCRIBE_COV,
            }
            .encode(w)
            .unwrap()
        });
        let initial = |value| {
            frame(false, |w| {
                CovNotification {
                    subscriber_process_id: 17,
                    initiating_device_id: ObjectId::new(ObjectType::Device, DEVICE),
                    monitored_object_id: ai0(),
                    time_remaining_seconds: 0,
                    values: vec![
                        (PropertyId::PresentValue, PropertyValue::Real(value)),
                        (
                            PropertyId::StatusFlags,
                            PropertyValue::BitString(BitString::from_bits(&[false; 4])),
                        ),
                    ],
                }
                .encode_unconfirmed(w)
                .unwrap()
            })
        };
        assert_eq!(sent, vec![acked, initial(99.6)]);
        assert_eq!(engine.subscriptions().len(), 1);

        let update = ValueUpdate {
            object_id: ai0(),
            property: PropertyId::PresentValue,
        };
        let mut step = |value: f32| {
            device
                .set_initial_value(
                    DEVICE,
                    ObjectType::AnalogInput,
                    0,
                    PropertyId::PresentValue,
                    PropertyValue::Real(value),
                )
                .unwrap();
            let mut outbox = Outbox::new();
            engine.value_updated(&device, update, Instant::now(), &mut outbox);
            outbox.drain().collect::<Vec<_>>()
        };
        assert!(step(100.1).is_empty());
        let notified = step(100.7);
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].destination, client());
        assert_eq!(notified[0].payload, initial(100.7));
    }

    #[test]
    fn cov_on_unsubscribable_property_is_refused() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let subscribe = frame(true, |w| {
            SubscribeCovRequest {
                subscriber_process_id: 1,
                monitored_object_id: ObjectId::new(ObjectType::AnalogValue, 2),
                issue_confirmed_notifications: Some(false),
                lifetime_seconds: Some(60),
            }
            .encode(w, 13)
            .unwrap()
        });
        let mut outbox = run(&mut engine, &mut device, &subscribe);
        let refused = reply(|w| {
            ErrorPdu {
                invoke_id: 13,
                service_choice: SERVICE_SUBSCRIBE_COV,
                error_class: ErrorClass::Property,
                error_code: ErrorCode::NotCovProperty,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![refused]);
        assert!(engine.subscriptions().is_empty());
    }

    #[test]
    fn disabled_device_answers_only_control_services() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let ack_dcc = reply(|w| {
            SimpleAck {
                invoke_id: 4,
                service_choice: SERVICE_DEVICE_COMMUNICATION_CONTROL,
            }
            .encode(w)
            .unwrap()
        });

        let mut outbox = run(&mut engine, &mut device, &dcc_request(CommunicationState::Disable));
        assert_eq!(payloads(&mut outbox), vec![ack_dcc.clone()]);
        assert_eq!(device.communication_state(), CommunicationState::Disable);

        assert!(run(&mut engine, &mut device, &read_request(1, ai0(), PropertyId::PresentValue)).is_empty());
        let who_is = frame(false, |w| WhoIsRequest::global().encode(w).unwrap());
        assert!(run(&mut engine, &mut device, &who_is).is_empty());

        let mut outbox = run(&mut engine, &mut device, &dcc_request(CommunicationState::Enable));
        assert_eq!(payloads(&mut outbox), vec![ack_dcc]);
        assert_eq!(run(&mut engine, &mut device, &who_is).len(), 1);
    }

    #[test]
    fn disable_initiation_suppresses_i_am_but_answers_who_is() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        run(&mut engine, &mut device, &dcc_request(CommunicationState::DisableInitiation));

        let mut outbox = Outbox::new();
        engine.send_i_am(&device, &mut outbox);
        assert!(outbox.is_empty());

        let who_is = frame(false, |w| WhoIsRequest::global().encode(w).unwrap());
        let mut outbox = run(&mut engine, &mut device, &who_is);
        assert_eq!(payloads(&mut outbox), vec![i_am()]);
    }

    #[test]
    fn reinitialize_with_wrong_password_fails() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let reinit = |password: &str| {
            frame(true, |w| {
                ReinitializeDeviceRequest {
                    state: ReinitializeState::Warmstart,
                    password: Some(password.into()),
                }
                .encode(w, 21)
                .unwrap()
            })
        };

        let mut outbox = run(&mut engine, &mut device, &reinit("54321"));
        let failed = reply(|w| {
            ErrorPdu {
                invoke_id: 21,
                service_choice: SERVICE_REINITIALIZE_DEVICE,
                error_class: ErrorClass::Security,
                error_code: ErrorCode::PasswordFailure,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![failed]);
        assert!(!device.restart_pending());

        let mut outbox = run(&mut engine, &mut device, &reinit("12345"));
        let acked = reply(|w| {
            SimpleAck {
                invoke_id: 21,
                service_choice: SERVICE_REINITIALIZE_DEVICE,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![acked]);
        assert!(device.restart_pending());
    }

    #[test]
    fn startup_i_am_is_broadcast() {
        let mut engine = BasicEngine::new();
        let device = device();
        let mut outbox = Outbox::new();
        engine.send_i_am(&device, &mut outbox);
        let messages: Vec<_> = outbox.drain().collect();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].broadcast);
        assert_eq!(messages[0].payload, i_am());
    }

    #[test]
    fn routed_who_is_gets_global_i_am() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let who_is = routed_frame(false, |w| WhoIsRequest::global().encode(w).unwrap());
        let mut outbox = run(&mut engine, &mut device, &who_is);
        let messages: Vec<_> = outbox.drain().collect();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].broadcast);
        // DNET 65535, empty DADR, hop count 255.
        assert_eq!(&messages[0].payload[..6], &[0x01, 0x20, 0xFF, 0xFF, 0x00, 0xFF]);
        assert_eq!(messages[0].payload, i_am());
    }

    #[test]
    fn routed_cov_subscriber_is_notified_through_its_router() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let subscribe = routed_frame(true, |w| {
            SubscribeCovRequest {
                subscriber_process_id: 17,
                monitored_object_id: ai0(),
                issue_confirmed_notifications: Some(false),
                lifetime_seconds: Some(0),
            }
            .encode(w, 14)
            .unwrap()
        });
        let sent = payloads(&mut run(&mut engine, &mut device, &subscribe));
        // DNET 5, DADR 07, hop count 255.
        let header = [0x01, 0x20, 0x00, 0x05, 0x01, 0x07, 0xFF];
        assert_eq!(sent.len(), 2);
        assert_eq!(&sent[0][..7], &header);
        assert_eq!(&sent[0][7..], &[0x20, 14, SERVICE_SUBSCRIBE_COV]);
        assert_eq!(&sent[1][..7], &header);
        assert_eq!(&sent[1][7..9], &[0x10, 0x02]);
        assert_eq!(
            engine.subscriptions().iter().next().and_then(|s| s.route.clone()),
            Some(remote())
        );

        device
            .set_initial_value(
                DEVICE,
                ObjectType::AnalogInput,
                0,
                PropertyId::PresentValue,
                PropertyValue::Real(101.0),
            )
            .unwrap();
        let mut outbox = Outbox::new();
        let update = ValueUpdate {
            object_id: ai0(),
            property: PropertyId::PresentValue,
        };
        engine.value_updated(&device, update, Instant::now(), &mut outbox);
        let notified: Vec<_> = outbox.drain().collect();
        assert_eq!(notified.len(), 1);
        assert!(!notified[0].broadcast);
        assert_eq!(notified[0].destination, client());
        assert_eq!(&notified[0].payload[..7], &header);
    }

    #[test]
    fn write_property_multiple_stops_at_first_failure() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let av2 = ObjectId::new(ObjectType::AnalogValue, 2);
        let present_value = |value: f32| PropertyWriteSpec {
            property_id: PropertyId::PresentValue,
            array_index: None,
            value: PropertyValue::Real(value),
            priority: None,
        };
        let write = |properties: Vec<PropertyWriteSpec>| {
            frame(true, |w| {
                WritePropertyMultipleRequest {
                    specs: vec![WriteAccessSpec {
                        object_id: av2,
                        properties,
                    }],
                }
                .encode(w, 15)
                .unwrap()
            })
        };
        let stored = |device: &Device| {
            device.get_property(DEVICE, ObjectType::AnalogValue, 2, PropertyId::PresentValue, None)
        };

        let mut outbox = run(&mut engine, &mut device, &write(vec![present_value(12.5)]));
        let acked = reply(|w| {
            SimpleAck {
                invoke_id: 15,
                service_choice: SERVICE_WRITE_PROPERTY_MULTIPLE,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![acked]);
        assert_eq!(stored(&device), Ok(PropertyValue::Real(12.5)));

        let rename = PropertyWriteSpec {
            property_id: PropertyId::ObjectName,
            array_index: None,
            value: PropertyValue::CharacterString("renamed".into()),
            priority: None,
        };
        let mut outbox = run(
            &mut engine,
            &mut device,
            &write(vec![present_value(20.0), rename, present_value(30.0)]),
        );
        let denied = reply(|w| {
            ErrorPdu {
                invoke_id: 15,
                service_choice: SERVICE_WRITE_PROPERTY_MULTIPLE,
                error_class: ErrorClass::Property,
                error_code: ErrorCode::WriteAccessDenied,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![denied]);
        assert_eq!(stored(&device), Ok(PropertyValue::Real(20.0)));
    }

    #[test]
    fn cov_property_subscription_uses_its_own_increment() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let subscribe = |invoke_id, property_id| {
            frame(true, |w| {
                SubscribeCovPropertyRequest {
                    subscriber_process_id: 18,
                    monitored_object_id: ai0(),
                    issue_confirmed_notifications: Some(false),
                    lifetime_seconds: Some(120),
                    monitored_property: PropertyReference {
                        property_id,
                        array_index: None,
                    },
                    cov_increment: Some(0.2),
                }
                .encode(w, invoke_id)
                .unwrap()
            })
        };

        let sent = payloads(&mut run(
            &mut engine,
            &mut device,
            &subscribe(16, PropertyId::PresentValue),
        ));
        let acked = reply(|w| {
            SimpleAck {
                invoke_id: 16,
                service_choice: SERVICE_SUBSCRIBE_COV_PROPERTY,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], acked);
        assert_eq!(&sent[1][2..4], &[0x10, 0x02]);

        // A 0.3 step is below the object's CovIncrement of 1.0.
        device
            .set_initial_value(
                DEVICE,
                ObjectType::AnalogInput,
                0,
                PropertyId::PresentValue,
                PropertyValue::Real(99.9),
            )
            .unwrap();
        let mut outbox = Outbox::new();
        let update = ValueUpdate {
            object_id: ai0(),
            property: PropertyId::PresentValue,
        };
        engine.value_updated(&device, update, Instant::now(), &mut outbox);
        assert_eq!(outbox.len(), 1);

        let mut outbox = run(&mut engine, &mut device, &subscribe(17, PropertyId::Units));
        let refused = reply(|w| {
            ErrorPdu {
                invoke_id: 17,
                service_choice: SERVICE_SUBSCRIBE_COV_PROPERTY,
                error_class: ErrorClass::Property,
                error_code: ErrorCode::NotCovProperty,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![refused]);
        assert_eq!(engine.subscriptions().len(), 1);
    }

    #[test]
    fn text_messages_are_accepted() {
        let mut engine = BasicEngine::new();
        let mut device = device();
        let message = TextMessage {
            source_device: ObjectId::new(ObjectType::Device, 8),
            class: Some(MessageClass::Numeric(3)),
            urgent: false,
            message: "shift change".into(),
        };

        let confirmed = frame(true, |w| message.encode_confirmed(w, 19).unwrap());
        let mut outbox = run(&mut engine, &mut device, &confirmed);
        let acked = reply(|w| {
            SimpleAck {
                invoke_id: 19,
                service_choice: SERVICE_CONFIRMED_TEXT_MESSAGE,
            }
            .encode(w)
            .unwrap()
        });
        assert_eq!(payloads(&mut outbox), vec![acked]);

        let unconfirmed = frame(false, |w| message.encode_unconfirmed(w).unwrap());
        assert!(run(&mut engine, &mut device, &unconfirmed).is_empty());
    }
}
