//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing node events to the `log` facade
//! (UART / USB-CDC through `esp_idf_logger` in production).  Every Nth
//! telemetry snapshot goes out as one JSON object per line so a host-side
//! reader can parse the console stream directly.

use log::{error, info, warn};

use crate::app::events::NodeEvent;
use crate::app::ports::EventSink;

/// Adapter that logs [`NodeEvent`]s to the serial console.
#[derive(Debug)]
pub struct LogEventSink {
    every: u32,
    seen: u32,
    lines: u64,
}

impl LogEventSink {
    /// Log one telemetry line per `every` snapshots (0 is treated as 1).
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            seen: 0,
            lines: 0,
        }
    }

    /// Telemetry lines written so far.
    pub fn telemetry_lines(&self) -> u64 {
        self.lines
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &NodeEvent) {
        match event {
            NodeEvent::Telemetry(snapshot) => {
                self.seen += 1;
                if self.seen < self.every {
                    return;
                }
                self.seen = 0;
                match snapshot.to_json() {
                    Ok(json) => {
                        self.lines += 1;
                        info!("TELEM {json}");
                    }
                    Err(e) => error!("TELEM | serialisation failed: {e}"),
                }
            }
            NodeEvent::Started { failed_channels } => {
                info!("START | {failed_channels} sensor channel(s) failed init");
            }
            NodeEvent::ChannelOffline { channel, error } => {
                warn!("SENSOR | {channel} offline: {error}");
            }
            NodeEvent::ChannelOnline(channel) => {
                info!("SENSOR | {channel} online");
            }
            NodeEvent::ButtonChanged { pressed } => {
                info!("BUTTON | {}", if *pressed { "pressed" } else { "released" });
            }
            NodeEvent::RelayChanged { relay, on } => {
                info!("RELAY | {relay} {}", if *on { "ON" } else { "OFF" });
            }
        }
    }
}
