//! Producer and consumer roles.
//!
//! Both roles share the same bootstrap (see [`crate::app::run`]); only the
//! I/O loop and the counter they feed differ.

mod consumer;
mod producer;

use std::fmt;

use serde::Serialize;

pub use consumer::Consumer;
pub use producer::Producer;

use crate::telemetry::{
    MESSAGES_RECEIVED_COUNT, MESSAGES_RECEIVING_RATE, MESSAGES_SENDING_RATE, MESSAGES_SENT_COUNT,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerRole {
    Producer,
    Consumer,
}

/// Counter and gauge names registered by one role.
#[derive(Debug, Clone, Copy)]
pub struct RoleInstruments {
    pub counter: &'static str,
    pub counter_description: &'static str,
    pub gauge: &'static str,
    pub gauge_description: &'static str,
}

impl WorkerRole {
    pub fn instruments(self) -> RoleInstruments {
        match self {
            Self::Producer => RoleInstruments {
                counter: MESSAGES_SENT_COUNT,
                counter_description: "Count of messages sent",
                gauge: MESSAGES_SENDING_RATE,
                gauge_description: "Messages sending rate",
            },
            Self::Consumer => RoleInstruments {
                counter: MESSAGES_RECEIVED_COUNT,
                counter_description: "Count of messages received",
                gauge: MESSAGES_RECEIVING_RATE,
                gauge_description: "Messages receiving rate",
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Producer => "producer",
            Self::Consumer => "consumer",
        }
    }
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
