//! Startup configuration: the device identity, the IPv4 network port, the
//! objects to host and their initial values, and the value schedule the
//! driver applies.
//!
//! [`ServerConfig::default`] describes the sample device: one object of each
//! hosted type with a handful of optional properties enabled, writable or
//! subscribable.

use std::time::Duration;

use bacnode_core::types::{ObjectId, ObjectType, PropertyId, PropertyValue};
use log::debug;

use crate::device::{Device, DeviceInfo};
use crate::driver::{DriverConfig, ScheduledIncrement};
use crate::error::ServerError;
use crate::network_port::NetworkPortConfig;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InitialValue {
    pub property: PropertyId,
    pub value: PropertyValue,
}

impl InitialValue {
    pub fn new(property: PropertyId, value: PropertyValue) -> Self {
        Self { property, value }
    }
}

/// One hosted object. An entry naming the configured NetworkPort instance
/// only adjusts property flags; the port itself comes from
/// [`ServerConfig::network_port`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectConfig {
    pub object_type: ObjectType,
    pub instance: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub values: Vec<InitialValue>,
    /// Optional properties to enable.
    #[cfg_attr(feature = "serde", serde(default))]
    pub enabled: Vec<PropertyId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub writable: Vec<PropertyId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub subscribable: Vec<PropertyId>,
}

impl ObjectConfig {
    pub fn new(object_type: ObjectType, instance: u32) -> Self {
        Self {
            object_type,
            instance,
            name: None,
            values: Vec::new(),
            enabled: Vec::new(),
            writable: Vec::new(),
            subscribable: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn value(mut self, property: PropertyId, value: PropertyValue) -> Self {
        self.values.push(InitialValue::new(property, value));
        self
    }

    pub fn enable(mut self, property: PropertyId) -> Self {
        self.enabled.push(property);
        self
    }

    pub fn writable(mut self, property: PropertyId) -> Self {
        self.writable.push(property);
        self
    }

    pub fn subscribable(mut self, property: PropertyId) -> Self {
        self.subscribable.push(property);
        self
    }

    pub fn id(&self) -> ObjectId {
        ObjectId::new(self.object_type, self.instance)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct ServerConfig {
    pub device: DeviceInfo,
    /// Password checked by ReinitializeDevice and DeviceCommunicationControl.
    pub password: String,
    pub network_port: NetworkPortConfig,
    pub objects: Vec<ObjectConfig>,
    pub schedule: Vec<ScheduledIncrement>,
    pub tick_millis: u64,
    pub update_interval_millis: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            device: DeviceInfo::default(),
            password: "12345".into(),
            network_port: NetworkPortConfig::default(),
            objects: sample_objects(),
            schedule: vec![ScheduledIncrement {
                object_type: ObjectType::AnalogInput,
                instance: 0,
                property: PropertyId::PresentValue,
                step: 0.1,
            }],
            tick_millis: 100,
            update_interval_millis: 1000,
        }
    }
}

impl ServerConfig {
    /// Creates the device, installs the network port and every configured
    /// object. Flags are applied in order: enabled, then name and values,
    /// then writable, then subscribable.
    pub fn build_device(&self) -> Result<Device, ServerError> {
        let mut device = Device::new(&self.device, &self.password)?;
        device.install_network_port(&self.network_port)?;
        let instance = device.instance();
        let port_id = ObjectId::new(ObjectType::NetworkPort, self.network_port.instance);

        for object in &self.objects {
            let id = object.id();
            if id != port_id {
                device.add_object(instance, object.object_type, object.instance)?;
            }
            for property in &object.enabled {
                device.set_property_enabled(
                    instance,
                    object.object_type,
                    object.instance,
                    *property,
                    true,
                )?;
            }
            let name = object
                .name
                .as_ref()
                .map(|name| InitialValue::new(PropertyId::ObjectName, text(name)));
            for initial in name.iter().chain(&object.values) {
                device
                    .set_initial_value(
                        instance,
                        object.object_type,
                        object.instance,
                        initial.property,
                        initial.value.clone(),
                    )
                    .map_err(|source| ServerError::Configure {
                        object: id,
                        property: initial.property,
                        source,
                    })?;
            }
            for property in &object.writable {
                device.set_property_writable(
                    instance,
                    object.object_type,
                    object.instance,
                    *property,
                    true,
                )?;
            }
            for property in &object.subscribable {
                device.set_property_subscribable(
                    instance,
                    object.object_type,
                    object.instance,
                    *property,
                    true,
                )?;
            }
            debug!("configured {id}");
        }
        Ok(device)
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            tick: Duration::from_millis(self.tick_millis.max(1)),
            update_interval: Duration::from_millis(self.update_interval_millis.max(1)),
            schedule: self.schedule.clone(),
        }
    }
}

fn text(value: &str) -> PropertyValue {
    PropertyValue::CharacterString(value.to_owned())
}

fn texts(items: &[&str]) -> PropertyValue {
    PropertyValue::Array(items.iter().copied().map(text).collect())
}

fn sample_objects() -> Vec<ObjectConfig> {
    vec![
        ObjectConfig::new(ObjectType::AnalogInput, 0)
            .named("AnalogInput Bronze")
            .enable(PropertyId::CovIncrement)
            .enable(PropertyId::Reliability)
            .value(PropertyId::PresentValue, PropertyValue::Real(99.6))
            .value(PropertyId::Units, PropertyValue::Enumerated(62))
            .value(PropertyId::Reliability, PropertyValue::Enumerated(1))
            .value(PropertyId::CovIncrement, PropertyValue::Real(1.0))
            .writable(PropertyId::CovIncrement)
            .subscribable(PropertyId::PresentValue),
        ObjectConfig::new(ObjectType::AnalogOutput, 1)
            .named("AnalogOutput Chartreuse")
            .value(PropertyId::PresentValue, PropertyValue::Real(1.0)),
        ObjectConfig::new(ObjectType::AnalogValue, 2)
            .named("AnalogValue Diamond")
            .enable(PropertyId::CovIncrement)
            .value(PropertyId::PresentValue, PropertyValue::Real(1.0))
            .value(PropertyId::CovIncrement, PropertyValue::Real(1.0))
            .writable(PropertyId::PresentValue)
            .writable(PropertyId::CovIncrement)
            .subscribable(PropertyId::PresentValue),
        ObjectConfig::new(ObjectType::BinaryInput, 3)
            .named("BinaryInput Emerald")
            .enable(PropertyId::Reliability)
            .enable(PropertyId::ActiveText)
            .enable(PropertyId::InactiveText)
            .value(PropertyId::PresentValue, PropertyValue::Enumerated(1))
            .value(PropertyId::Reliability, PropertyValue::Enumerated(1))
            .value(PropertyId::ActiveText, text("InAlarm"))
            .value(PropertyId::InactiveText, text("Normal"))
            .subscribable(PropertyId::PresentValue),
        ObjectConfig::new(ObjectType::BinaryOutput, 4)
            .named("BinaryOutput Fuchsia")
            .value(PropertyId::PresentValue, PropertyValue::Enumerated(1)),
        ObjectConfig::new(ObjectType::BinaryValue, 5)
            .named("BinaryValue Gold")
            .enable(PropertyId::ActiveText)
            .enable(PropertyId::InactiveText)
            .value(PropertyId::PresentValue, PropertyValue::Enumerated(1))
            .value(PropertyId::ActiveText, text("On"))
            .value(PropertyId::InactiveText, text("Off"))
            .writable(PropertyId::PresentValue)
            .subscribable(PropertyId::PresentValue),
        ObjectConfig::new(ObjectType::MultiStateInput, 13)
            .named("MultiStateInput Hot Pink")
            .enable(PropertyId::StateText)
            .value(PropertyId::PresentValue, PropertyValue::Unsigned(3))
            .value(PropertyId::StateText, texts(&["Off", "On", "Blinking"]))
            .subscribable(PropertyId::PresentValue),
        ObjectConfig::new(ObjectType::MultiStateOutput, 14)
            .named("MultiStateOutput Indigo")
            .enable(PropertyId::StateText)
            .value(PropertyId::PresentValue, PropertyValue::Unsigned(1))
            .value(PropertyId::StateText, texts(&["Off", "On", "Restart", "Error"])),
        ObjectConfig::new(ObjectType::MultiStateValue, 19)
            .named("MultiStateValue Kiwi")
            .enable(PropertyId::StateText)
            .value(PropertyId::PresentValue, PropertyValue::Unsigned(1))
            .value(PropertyId::StateText, texts(&["Off", "On", "Blinking"]))
            .writable(PropertyId::PresentValue)
            .subscribable(PropertyId::PresentValue),
        ObjectConfig::new(ObjectType::CharacterStringValue, 40)
            .named("CharacterstringValue Nickel")
            .value(PropertyId::PresentValue, text("Hello World")),
        ObjectConfig::new(ObjectType::IntegerValue, 45)
            .named("IntegerValue Purple")
            .value(PropertyId::PresentValue, PropertyValue::Signed(1)),
        ObjectConfig::new(ObjectType::LargeAnalogValue, 46)
            .named("LargeAnalogValue Quartz")
            .value(PropertyId::PresentValue, PropertyValue::Double(1.0)),
        ObjectConfig::new(ObjectType::PositiveIntegerValue, 48)
            .named("PositiveIntegerValue Silver")
            .value(PropertyId::PresentValue, PropertyValue::Unsigned(1)),
        ObjectConfig::new(ObjectType::NetworkPort, 50)
            .enable(PropertyId::FdBbmdAddress)
            .enable(PropertyId::FdSubscriptionLifetime)
            .writable(PropertyId::FdBbmdAddress)
            .writable(PropertyId::FdSubscriptionLifetime),
    ]
}

#[cfg(test)]
mod tests {
    use super::{text, ObjectConfig, ServerConfig};
    use crate::error::{AccessError, ServerError, StoreError};
    use bacnode_core::types::{ObjectId, ObjectType, PropertyId, PropertyValue};
    use std::time::Duration;

    const DEVICE: u32 = 389001;

    #[test]
    fn sample_device_hosts_every_object() {
        let device = ServerConfig::default().build_device().unwrap();
        // Device, NetworkPort and thirteen value objects.
        assert_eq!(device.store().len(), 15);
        assert_eq!(
            device
                .get_property(DEVICE, ObjectType::AnalogInput, 0, PropertyId::ObjectName, None)
                .unwrap(),
            PropertyValue::CharacterString("AnalogInput Bronze".into())
        );
        assert_eq!(
            device
                .get_property(DEVICE, ObjectType::MultiStateInput, 13, PropertyId::NumberOfStates, None)
                .unwrap(),
            PropertyValue::Unsigned(3)
        );
        assert_eq!(
            device
                .get_property(DEVICE, ObjectType::NetworkPort, 50, PropertyId::ObjectName, None)
                .unwrap(),
            PropertyValue::CharacterString("NetworkPort Vermillion".into())
        );
    }

    #[test]
    fn sample_flags_are_applied() {
        let mut device = ServerConfig::default().build_device().unwrap();
        device
            .set_property(
                DEVICE,
                ObjectType::AnalogValue,
                2,
                PropertyId::PresentValue,
                PropertyValue::Real(42.0),
                None,
                16,
            )
            .unwrap();
        assert_eq!(device.take_value_updates().len(), 1);

        assert_eq!(
            device.set_property(
                DEVICE,
                ObjectType::AnalogOutput,
                1,
                PropertyId::PresentValue,
                PropertyValue::Real(3.0),
                None,
                16,
            ),
            Err(AccessError::NotWritable)
        );
        assert_eq!(
            device.get_property(DEVICE, ObjectType::AnalogOutput, 1, PropertyId::CovIncrement, None),
            Err(AccessError::Unsupported)
        );
    }

    #[test]
    fn bad_initial_value_names_the_property() {
        let config = ServerConfig {
            objects: vec![ObjectConfig::new(ObjectType::AnalogValue, 7)
                .value(PropertyId::PresentValue, text("warm"))],
            ..ServerConfig::default()
        };
        match config.build_device() {
            Err(ServerError::Configure {
                object, property, ..
            }) => {
                assert_eq!(object, ObjectId::new(ObjectType::AnalogValue, 7));
                assert_eq!(property, PropertyId::PresentValue);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn duplicate_object_is_rejected() {
        let config = ServerConfig {
            objects: vec![
                ObjectConfig::new(ObjectType::BinaryValue, 1),
                ObjectConfig::new(ObjectType::BinaryValue, 1),
            ],
            ..ServerConfig::default()
        };
        assert!(matches!(
            config.build_device(),
            Err(ServerError::Store(StoreError::AlreadyExists(_)))
        ));
    }

    #[test]
    fn driver_config_uses_millis() {
        let config = ServerConfig {
            tick_millis: 0,
            update_interval_millis: 250,
            ..ServerConfig::default()
        };
        let driver = config.driver_config();
        assert_eq!(driver.tick, Duration::from_millis(1));
        assert_eq!(driver.update_interval, Duration::from_millis(250));
        assert_eq!(driver.schedule.len(), 1);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: ServerConfig = serde_json::from_str(
            r#"{
                "password": "secret",
                "objects": [
                    { "object_type": "AnalogValue", "instance": 9, "name": "Setpoint",
                      "writable": ["PresentValue"] }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(config.password, "secret");
        assert_eq!(config.device.instance, DEVICE);
        assert_eq!(config.objects.len(), 1);
        assert!(config.objects[0].values.is_empty());

        let text = serde_json::to_string(&ServerConfig::default()).unwrap();
        let back: ServerConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, ServerConfig::default());
    }
}
