use bacnode_core::npdu::NpduAddress;
use bacnode_core::types::{ObjectId, PropertyId, PropertyValue};
use bacnode_datalink::ConnectionString;
use log::debug;
use tokio::time::Instant;

/// One SubscribeCOV or SubscribeCOVProperty registration.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    pub subscriber: ConnectionString,
    /// SNET/SADR of a subscriber behind a router.
    pub route: Option<NpduAddress>,
    pub process_id: u32,
    pub object_id: ObjectId,
    /// `PresentValue` for SubscribeCOV.
    pub property: PropertyId,
    /// Client-supplied increment; overrides the object's `CovIncrement`.
    pub increment: Option<f64>,
    /// `None` for an indefinite subscription.
    pub expires_at: Option<Instant>,
    /// Value last reported to this subscriber.
    pub last_value: Option<PropertyValue>,
}

impl Subscription {
    fn same_key(&self, other: &Subscription) -> bool {
        self.matches(other.subscriber, other.process_id, other.object_id, other.property)
    }

    fn matches(
        &self,
        subscriber: ConnectionString,
        process_id: u32,
        object_id: ObjectId,
        property: PropertyId,
    ) -> bool {
        self.subscriber == subscriber
            && self.process_id == process_id
            && self.object_id == object_id
            && self.property == property
    }

    /// Seconds left, 0 for an indefinite subscription.
    pub fn time_remaining(&self, now: Instant) -> u32 {
        self.expires_at.map_or(0, |deadline| {
            u32::try_from(deadline.saturating_duration_since(now).as_secs()).unwrap_or(u32::MAX)
        })
    }
}

#[derive(Debug, Default)]
pub struct CovTable {
    subscriptions: Vec<Subscription>,
}

impl CovTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `subscription`, replacing one with the same subscriber, process,
    /// object and property.
    pub fn subscribe(&mut self, subscription: Subscription) {
        match self
            .subscriptions
            .iter_mut()
            .find(|existing| existing.same_key(&subscription))
        {
            Some(existing) => *existing = subscription,
            None => self.subscriptions.push(subscription),
        }
    }

    pub fn cancel(
        &mut self,
        subscriber: ConnectionString,
        process_id: u32,
        object_id: ObjectId,
        property: PropertyId,
    ) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions
            .retain(|s| !s.matches(subscriber, process_id, object_id, property));
        before != self.subscriptions.len()
    }

    /// Drops lapsed subscriptions and returns how many were removed.
    pub fn expire(&mut self, now: Instant) -> usize {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| match s.expires_at {
            Some(deadline) if now >= deadline => {
                debug!("cov subscription {} {} from {} lapsed", s.process_id, s.object_id, s.subscriber);
                false
            }
            _ => true,
        });
        before - self.subscriptions.len()
    }

    /// Subscriptions watching `property` of `object_id`.
    pub fn watching_mut(
        &mut self,
        object_id: ObjectId,
        property: PropertyId,
    ) -> impl Iterator<Item = &mut Subscription> + '_ {
        self.subscriptions
            .iter_mut()
            .filter(move |s| s.object_id == object_id && s.property == property)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Subscription> {
        self.subscriptions.iter()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

/// Whether `current` differs enough from the last reported value. Numeric
/// values with an increment must move by at least the increment; anything
/// else notifies on any change.
pub fn should_notify(
    previous: Option<&PropertyValue>,
    current: &PropertyValue,
    increment: Option<f64>,
) -> bool {
    let Some(previous) = previous else {
        return true;
    };
    match (previous.as_f64(), current.as_f64(), increment) {
        (Some(before), Some(after), Some(increment)) => (after - before).abs() >= increment,
        _ => previous != current,
    }
}
