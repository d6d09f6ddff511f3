use crate::bip::bvlc::{
    decode_frame, encode_frame, BvlcFunction, RESULT_DISTRIBUTE_BROADCAST_NAK,
    RESULT_REGISTER_FOREIGN_DEVICE_NAK, RESULT_SUCCESSFUL_COMPLETION,
};
use crate::{directed_broadcast, ConnectionString, Transport, TransportError};
use bacnode_core::EncodeError;
use log::{debug, info, warn};
use std::io;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use tokio::net::UdpSocket;
use tokio::time::{Duration, Instant};

const MAX_BIP_FRAME_LEN: usize = 1600;

/// BBMD registration parameters of a foreign device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignDevice {
    pub bbmd: SocketAddrV4,
    pub ttl_seconds: u16,
}

/// Active BACnet/IP configuration of the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BipSettings {
    pub local_ip: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    /// UDP port of the BACnet/IP network; broadcasts are sent to it.
    pub port: u16,
    pub foreign: Option<ForeignDevice>,
}

impl BipSettings {
    pub fn broadcast_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(directed_broadcast(self.local_ip, self.subnet_mask), self.port)
    }
}

impl Default for BipSettings {
    fn default() -> Self {
        Self {
            local_ip: Ipv4Addr::UNSPECIFIED,
            subnet_mask: Ipv4Addr::UNSPECIFIED,
            port: 47808,
            foreign: None,
        }
    }
}

/// Foreign-device registration state as last reported by the BBMD.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Unregistered,
    Pending,
    Registered,
    Rejected(u16),
}

/// BACnet/IP transport over a non-blocking tokio UDP socket.
#[derive(Debug)]
pub struct BipTransport {
    socket: UdpSocket,
    settings: BipSettings,
    registration: Registration,
    registered_at: Option<Instant>,
}

fn frame_error(err: EncodeError) -> TransportError {
    match err {
        EncodeError::FrameTooLarge => TransportError::FrameTooLarge,
        _ => TransportError::InvalidFrame,
    }
}

impl BipTransport {
    pub async fn bind(bind_addr: SocketAddr, settings: BipSettings) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.set_broadcast(true)?;
        info!(
            "bacnet/ip transport bound to {} (broadcast {})",
            socket.local_addr()?,
            settings.broadcast_addr()
        );
        Ok(Self {
            socket,
            settings,
            registration: Registration::Unregistered,
            registered_at: None,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.socket.local_addr().map_err(TransportError::Io)
    }

    pub fn settings(&self) -> &BipSettings {
        &self.settings
    }

    pub fn registration(&self) -> Registration {
        self.registration
    }

    /// Waits until a datagram is queued on the socket.
    pub async fn readable(&self) -> Result<(), TransportError> {
        self.socket.readable().await.map_err(TransportError::Io)
    }

    /// Sends Register-Foreign-Device to the configured BBMD without waiting
    /// for the result; the answer is picked up by [`Transport::receive`].
    pub async fn register_foreign_device(&mut self, now: Instant) -> Result<(), TransportError> {
        let foreign = self.settings.foreign.ok_or(TransportError::BbmdNotConfigured)?;
        let frame = encode_frame(
            BvlcFunction::RegisterForeignDevice,
            &[&foreign.ttl_seconds.to_be_bytes()],
            MAX_BIP_FRAME_LEN,
        )
        .map_err(frame_error)?;
        self.socket.send_to(&frame, foreign.bbmd).await?;
        debug!(
            "registering as foreign device with {} (ttl {}s)",
            foreign.bbmd, foreign.ttl_seconds
        );
        if self.registration != Registration::Registered {
            self.registration = Registration::Pending;
        }
        self.registered_at = Some(now);
        Ok(())
    }

    fn registration_due(&self, foreign: ForeignDevice, now: Instant) -> bool {
        match self.registered_at {
            None => true,
            Some(at) => {
                let refresh = (u64::from(foreign.ttl_seconds) * 3 / 4).max(1);
                now.saturating_duration_since(at) >= Duration::from_secs(refresh)
            }
        }
    }

    fn handle_result(&mut self, body: &[u8], src: ConnectionString) -> Result<(), TransportError> {
        let code = body
            .get(..2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or(TransportError::InvalidFrame)?;
        let Some(foreign) = self.settings.foreign else {
            debug!("ignoring BVLC-Result 0x{code:04x} from {src}");
            return Ok(());
        };
        if src.to_socket_addr() != foreign.bbmd {
            debug!("ignoring BVLC-Result 0x{code:04x} from non-BBMD {src}");
            return Ok(());
        }
        match code {
            RESULT_SUCCESSFUL_COMPLETION => {
                if self.registration != Registration::Registered {
                    info!("registered as foreign device with {}", foreign.bbmd);
                }
                self.registration = Registration::Registered;
            }
            RESULT_REGISTER_FOREIGN_DEVICE_NAK => {
                warn!("BBMD {} rejected foreign device registration", foreign.bbmd);
                self.registration = Registration::Rejected(code);
            }
            RESULT_DISTRIBUTE_BROADCAST_NAK => {
                warn!("BBMD {} refused to distribute a broadcast", foreign.bbmd);
            }
            other => warn!("BBMD {} returned BVLC-Result 0x{other:04x}", foreign.bbmd),
        }
        Ok(())
    }

    /// Strips the BVLC layer. Returns the NPDU and originating peer, or `None`
    /// for frames consumed by the link layer itself.
    fn unwrap_frame<'a>(
        &mut self,
        datagram: &'a [u8],
        src: ConnectionString,
    ) -> Result<Option<(&'a [u8], ConnectionString)>, TransportError> {
        let (header, body) = decode_frame(datagram).map_err(|_| TransportError::InvalidFrame)?;
        match header.function {
            BvlcFunction::OriginalUnicastNpdu
            | BvlcFunction::OriginalBroadcastNpdu
            | BvlcFunction::DistributeBroadcastToNetwork => Ok(Some((body, src))),
            BvlcFunction::ForwardedNpdu => {
                if body.len() < ConnectionString::LEN {
                    return Err(TransportError::InvalidFrame);
                }
                let (origin, npdu) = body.split_at(ConnectionString::LEN);
                Ok(Some((npdu, ConnectionString::try_from(origin)?)))
            }
            BvlcFunction::Result => {
                self.handle_result(body, src)?;
                Ok(None)
            }
            BvlcFunction::Unknown(v) => Err(TransportError::UnsupportedBvlcFunction(v)),
            other => {
                debug!("ignoring BBMD management frame {other:?} from {src}");
                Ok(None)
            }
        }
    }

    async fn rebind(&mut self, port: u16) -> Result<(), TransportError> {
        let ip = match self.socket.local_addr()?.ip() {
            IpAddr::V4(v4) => v4,
            IpAddr::V6(_) => Ipv4Addr::UNSPECIFIED,
        };
        let socket = UdpSocket::bind(SocketAddr::from((ip, port))).await?;
        socket.set_broadcast(true)?;
        info!("bacnet/ip transport rebound to {}", socket.local_addr()?);
        self.socket = socket;
        Ok(())
    }
}

impl Transport for BipTransport {
    fn receive(
        &mut self,
        buf: &mut [u8],
    ) -> Result<Option<(usize, ConnectionString)>, TransportError> {
        let mut frame = [0u8; MAX_BIP_FRAME_LEN];
        loop {
            let (n, src) = match self.socket.try_recv_from(&mut frame) {
                Ok(received) => received,
                Err(err) if err.kind() == io::ErrorKind::WouldBlock => return Ok(None),
                Err(err) => return Err(err.into()),
            };
            let Some(src) = ConnectionString::from_socket_addr(src) else {
                continue;
            };
            match self.unwrap_frame(&frame[..n], src) {
                Ok(Some((npdu, peer))) => {
                    let out = buf
                        .get_mut(..npdu.len())
                        .ok_or(TransportError::FrameTooLarge)?;
                    out.copy_from_slice(npdu);
                    return Ok(Some((npdu.len(), peer)));
                }
                Ok(None) => continue,
                Err(err) => debug!("dropping datagram from {src}: {err}"),
            }
        }
    }

    async fn send(
        &mut self,
        payload: &[u8],
        destination: ConnectionString,
        broadcast: bool,
    ) -> Result<usize, TransportError> {
        let (function, target) = match (broadcast, self.settings.foreign) {
            (true, Some(foreign)) => (BvlcFunction::DistributeBroadcastToNetwork, foreign.bbmd),
            (true, None) => (
                BvlcFunction::OriginalBroadcastNpdu,
                self.settings.broadcast_addr(),
            ),
            (false, _) => (
                BvlcFunction::OriginalUnicastNpdu,
                destination.to_socket_addr(),
            ),
        };
        let frame = encode_frame(function, &[payload], MAX_BIP_FRAME_LEN).map_err(frame_error)?;
        self.socket.send_to(&frame, target).await?;
        debug!("sent {} bytes ({function:?}) to {target}", payload.len());
        Ok(payload.len())
    }

    async fn reconfigure(&mut self, settings: &BipSettings) -> Result<(), TransportError> {
        if settings.port != self.settings.port {
            self.rebind(settings.port).await?;
        }
        if settings.foreign != self.settings.foreign {
            self.registration = Registration::Unregistered;
            self.registered_at = None;
        }
        info!(
            "bacnet/ip settings applied: {}/{} port {} foreign {:?}",
            settings.local_ip, settings.subnet_mask, settings.port, settings.foreign
        );
        self.settings = *settings;
        Ok(())
    }

    async fn maintain(&mut self, now: Instant) -> Result<(), TransportError> {
        match self.settings.foreign {
            Some(foreign) if self.registration_due(foreign, now) => {
                self.register_foreign_device(now).await
            }
            _ => Ok(()),
        }
    }
}
