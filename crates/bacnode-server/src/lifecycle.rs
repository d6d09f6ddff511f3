use std::time::Duration;

use bacnode_core::types::CommunicationState;
use log::info;
use tokio::time::Instant;

use crate::error::{ReinitError, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Normal,
    /// A warm start was acknowledged; the driver restarts after flushing.
    PendingReinitialization,
}

/// Result of a successful ReinitializeDevice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReinitOutcome {
    ChangesActivated,
    RestartScheduled,
}

/// Password gate, reinitialization state and communication control.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    password: String,
    state: LifecycleState,
    communication: CommunicationState,
    communication_expires: Option<Instant>,
}

impl Lifecycle {
    pub fn new(password: impl Into<String>) -> Result<Self, StoreError> {
        let password = password.into();
        if password.is_empty() {
            return Err(StoreError::InvalidConfiguration(
                "reinitialization password must not be empty".into(),
            ));
        }
        Ok(Self {
            password,
            state: LifecycleState::Normal,
            communication: CommunicationState::Enable,
            communication_expires: None,
        })
    }

    /// A missing, empty or different password fails.
    pub fn authorize(&self, supplied: Option<&str>) -> Result<(), ReinitError> {
        match supplied {
            Some(password) if !password.is_empty() && password == self.password => Ok(()),
            _ => Err(ReinitError::PasswordFailure),
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn schedule_restart(&mut self) {
        self.state = LifecycleState::PendingReinitialization;
    }

    pub fn communication_state(&self) -> CommunicationState {
        self.communication
    }

    /// Sets the communication state, optionally reverting to Enable after
    /// `duration`. Enable itself never expires.
    pub fn set_communication(
        &mut self,
        state: CommunicationState,
        duration: Option<Duration>,
        now: Instant,
    ) {
        self.communication = state;
        self.communication_expires = match state {
            CommunicationState::Enable => None,
            _ => duration.map(|d| now + d),
        };
        info!("communication state {state:?} (duration {duration:?})");
    }

    /// Restores Enable once a timed state has run out. Returns whether it did.
    pub fn expire_communication(&mut self, now: Instant) -> bool {
        match self.communication_expires {
            Some(deadline) if now >= deadline => {
                self.communication = CommunicationState::Enable;
                self.communication_expires = None;
                info!("communication control expired, re-enabled");
                true
            }
            _ => false,
        }
    }
}
