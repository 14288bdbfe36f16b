use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current handshake version; bumping this is a breaking change to the
/// meta channel.
pub const PROTOCOL_VERSION: i16 = 1;

/// Remote store exporter default port.
pub const DEFAULT_STORE_PORT: u16 = 11411;
/// Remote clock exporter default port.
pub const DEFAULT_CLOCK_PORT: u16 = 11511;

/// Client -> server on the meta channel. `replay_start_ticks = -1` means
/// "start from the exporter's `now`".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaHello {
    pub protocol_version: i16,
    pub replay_start_ticks: i64,
    pub replay_end_ticks: i64,
}

impl MetaHello {
    pub const REPLAY_FROM_NOW: i64 = -1;
}

/// Server -> client reply to `MetaHello`: the session identity and
/// transport to use for the data channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaWelcome {
    pub session_guid: Uuid,
    pub transport_name: String,
    pub transport_params: Vec<String>,
}

/// All meta-channel messages, tagged for discriminated (de)serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
#[serde(rename_all = "snake_case")]
pub enum MetaMessage {
    Hello(MetaHello),
    Welcome(MetaWelcome),
    /// Zero-length "intermission" marker: the catalog batch just sent is
    /// complete, and data flow may now start (or the next catalog growth
    /// batch will follow later).
    Intermission,
}

/// Client -> server on the clock-sync channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSyncRequest {
    pub protocol_version: i16,
}

/// Server -> client reply: its file-time clock reading and its name, used
/// by the client to compute a virtual-time offset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockSyncReply {
    pub file_time: i64,
    pub machine_name: String,
}

/// Computes the client's virtual-time offset from one round trip:
/// `offset = server_time - (client_time - rtt / 2)`, i.e. the server's
/// reading minus the (clock-skew-corrected) client time at which the
/// server's clock was actually sampled.
///
/// `client_send_ticks`/`client_receive_ticks` bracket the round trip on
/// the client's own clock; an identical-machine negotiation (same
/// `machine_name` as the client already knows itself to be) should
/// short-circuit to an offset of zero without calling this.
#[must_use]
pub fn compute_offset_ticks(server_time_ticks: i64, client_send_ticks: i64, client_receive_ticks: i64) -> i64 {
    let rtt = client_receive_ticks - client_send_ticks;
    let client_time_at_server_sample = client_send_ticks + rtt / 2;
    server_time_ticks - client_time_at_server_sample
}

/// Tracks which machine, if any, is this federation's primary clock
/// source; a second distinct claimant is the fatal `MultiplePrimaryClocks`
/// condition.
#[derive(Debug, Default)]
pub struct PrimaryClockRegistry {
    primary: Option<String>,
}

impl PrimaryClockRegistry {
    #[must_use]
    pub fn new() -> Self {
        PrimaryClockRegistry::default()
    }

    /// Registers `machine_name` as the primary clock source. Returns an
    /// error if a different machine already holds that role.
    pub fn claim_primary(&mut self, machine_name: &str) -> Result<(), crate::error::StoreError> {
        match &self.primary {
            None => {
                self.primary = Some(machine_name.to_string());
                Ok(())
            }
            Some(existing) if existing == machine_name => Ok(()),
            Some(_) => Err(crate::error::StoreError::MultiplePrimaryClocks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_for_a_perfectly_synchronized_clock() {
        let offset = compute_offset_ticks(1_000, 900, 1_100);
        assert_eq!(offset, 1_000 - 1_000);
    }

    #[test]
    fn offset_accounts_for_server_being_ahead() {
        // rtt = 200, so server was sampled at client-time 900+100=1000.
        // server reports 1_500, so offset is 500.
        let offset = compute_offset_ticks(1_500, 900, 1_100);
        assert_eq!(offset, 500);
    }

    #[test]
    fn meta_message_round_trips_through_json_with_tag() {
        let hello = MetaMessage::Hello(MetaHello {
            protocol_version: PROTOCOL_VERSION,
            replay_start_ticks: MetaHello::REPLAY_FROM_NOW,
            replay_end_ticks: i64::MAX,
        });
        let json = serde_json::to_string(&hello).unwrap();
        assert!(json.contains("\"kind\":\"hello\""));
        let round_tripped: MetaMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(round_tripped, hello);
    }

    #[test]
    fn second_distinct_primary_clock_is_fatal() {
        let mut registry = PrimaryClockRegistry::new();
        registry.claim_primary("host-a").unwrap();
        registry.claim_primary("host-a").unwrap();
        let err = registry.claim_primary("host-b").unwrap_err();
        assert!(matches!(err, crate::error::StoreError::MultiplePrimaryClocks));
    }
}
