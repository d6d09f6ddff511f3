//! BACnet/IP device server core.
//!
//! A [`Device`] owns the object store, per-property flags and the device
//! lifecycle. A [`ProtocolEngine`] turns inbound NPDUs into calls on the
//! device and queues replies, and the [`Driver`] ties an engine to a
//! [`Transport`](bacnode_datalink::Transport) with a fixed tick.
//!
//! ```no_run
//! use bacnode_datalink::BipTransport;
//! use bacnode_server::{BasicEngine, Driver, ServerConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ServerConfig::default();
//! let device = config.build_device()?;
//! let transport = BipTransport::bind(
//!     "0.0.0.0:47808".parse()?,
//!     config.network_port.to_bip_settings(),
//! )
//! .await?;
//! let mut driver = Driver::new(device, transport, BasicEngine::new(), config.driver_config());
//! let exit = driver
//!     .run(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await;
//! println!("{exit:?}");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod device;
mod dispatch;
pub mod driver;
pub mod engine;
pub mod error;
pub mod lifecycle;
pub mod network_port;
pub mod object;
pub mod store;
pub mod table;

pub use config::{InitialValue, ObjectConfig, ServerConfig};
pub use device::{Device, DeviceInfo, ValueUpdate};
pub use driver::{Driver, DriverConfig, DriverExit, ScheduledIncrement};
pub use engine::{BasicEngine, OutboundMessage, Outbox, ProtocolEngine};
pub use error::{AccessError, ReinitError, ServerError, StoreError};
pub use lifecycle::{LifecycleState, ReinitOutcome};
pub use network_port::NetworkPortConfig;
pub use store::ObjectStore;
