//! Outbound node events.
//!
//! The [`NodeService`](super::service::NodeService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other side
//! decide what to do with them.

use crate::error::SensorError;
use crate::telemetry::{ChannelId, RelayId, TelemetrySnapshot};

/// Structured events emitted by the node core.
#[derive(Debug, Clone)]
pub enum NodeEvent {
    /// Initialisation finished; carries the channels that failed to start.
    Started { failed_channels: usize },

    /// A sensor channel's read failed after a good read.
    ChannelOffline { channel: ChannelId, error: SensorError },

    /// A sensor channel read fine after being unavailable.
    ChannelOnline(ChannelId),

    /// Debounced button state changed.
    ButtonChanged { pressed: bool },

    /// A relay's commanded state changed.
    RelayChanged { relay: RelayId, on: bool },

    /// End of a poll cycle; carries the complete snapshot.
    Telemetry(TelemetrySnapshot),
}
