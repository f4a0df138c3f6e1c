//! Typed records for the two WANCommonInterfaceConfig actions.
//!
//! Every field is optional: a field missing from the device's answer, or a
//! poll that failed altogether, leaves it `None`. Consumers treat `None` as
//! "no update this cycle".

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ErrorKind, SoapError};
use crate::metric_store::Metric;

/// Remote operation polled on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TransferRates,
    LinkLimits,
}

impl Action {
    pub const ALL: [Action; 2] = [Action::TransferRates, Action::LinkLimits];

    /// SOAP action name as sent in the envelope and the SOAPACTION header.
    pub fn soap_action(&self) -> &'static str {
        match self {
            Action::TransferRates => "GetAddonInfos",
            Action::LinkLimits => "GetCommonLinkProperties",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::TransferRates => "transfer_rates",
            Action::LinkLimits => "link_limits",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Action::TransferRates => 0,
            Action::LinkLimits => 1,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record that can be filled element by element from a SOAP response.
pub trait SoapRecord: Default + Send {
    /// Stores `text` in the field bound to the element with local name
    /// `element`. Unknown elements are ignored.
    fn assign(&mut self, element: &str, text: &str) -> Result<(), SoapError>;
}

fn parse_number<T>(element: &str, text: &str) -> Result<Option<T>, SoapError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<T>()
        .map(Some)
        .map_err(|e| SoapError::mapping(element, text, e))
}

fn parse_flag(element: &str, text: &str) -> Result<Option<bool>, SoapError> {
    match text {
        "" => Ok(None),
        "1" | "true" => Ok(Some(true)),
        "0" | "false" => Ok(Some(false)),
        other => Err(SoapError::mapping(element, other, "expected 0, 1, true or false")),
    }
}

/// Answer to `GetAddonInfos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TransferRatesResponse {
    pub byte_send_rate: Option<u32>,
    pub byte_receive_rate: Option<u32>,
    pub packet_send_rate: Option<u32>,
    pub packet_receive_rate: Option<u32>,
    pub total_bytes_sent: Option<u64>,
    pub total_bytes_received: Option<u64>,
    pub auto_disconnect_time: Option<u32>,
    pub idle_disconnect_time: Option<u32>,
    pub dns_server1: Option<String>,
    pub dns_server2: Option<String>,
    pub voip_dns_server1: Option<String>,
    pub voip_dns_server2: Option<String>,
    pub upnp_control_enabled: Option<bool>,
    pub routed_bridged_mode_both: Option<bool>,
}

impl SoapRecord for TransferRatesResponse {
    fn assign(&mut self, element: &str, text: &str) -> Result<(), SoapError> {
        match element {
            "NewByteSendRate" => self.byte_send_rate = parse_number(element, text)?,
            "NewByteReceiveRate" => self.byte_receive_rate = parse_number(element, text)?,
            "NewPacketSendRate" => self.packet_send_rate = parse_number(element, text)?,
            "NewPacketReceiveRate" => self.packet_receive_rate = parse_number(element, text)?,
            "NewTotalBytesSent" => self.total_bytes_sent = parse_number(element, text)?,
            "NewTotalBytesReceived" => self.total_bytes_received = parse_number(element, text)?,
            "NewAutoDisconnectTime" => self.auto_disconnect_time = parse_number(element, text)?,
            "NewIdleDisconnectTime" => self.idle_disconnect_time = parse_number(element, text)?,
            "NewDNSServer1" => self.dns_server1 = Some(text.to_string()),
            "NewDNSServer2" => self.dns_server2 = Some(text.to_string()),
            "NewVoipDNSServer1" => self.voip_dns_server1 = Some(text.to_string()),
            "NewVoipDNSServer2" => self.voip_dns_server2 = Some(text.to_string()),
            "NewUpnpControlEnabled" => self.upnp_control_enabled = parse_flag(element, text)?,
            "NewRoutedBridgedModeBoth" => {
                self.routed_bridged_mode_both = parse_flag(element, text)?
            }
            _ => {}
        }
        Ok(())
    }
}

/// Answer to `GetCommonLinkProperties`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkLimitsResponse {
    pub wan_access_type: Option<String>,
    pub layer1_upstream_max_bit_rate: Option<u64>,
    pub layer1_downstream_max_bit_rate: Option<u64>,
    pub physical_link_status: Option<String>,
}

impl SoapRecord for LinkLimitsResponse {
    fn assign(&mut self, element: &str, text: &str) -> Result<(), SoapError> {
        match element {
            "NewWANAccessType" => self.wan_access_type = Some(text.to_string()),
            "NewLayer1UpstreamMaxBitRate" => {
                self.layer1_upstream_max_bit_rate = parse_number(element, text)?
            }
            "NewLayer1DownstreamMaxBitRate" => {
                self.layer1_downstream_max_bit_rate = parse_number(element, text)?
            }
            "NewPhysicalLinkStatus" => self.physical_link_status = Some(text.to_string()),
            _ => {}
        }
        Ok(())
    }
}

/// Response of either action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Response {
    TransferRates(TransferRatesResponse),
    LinkLimits(LinkLimitsResponse),
}

impl Response {
    /// All-absent response of the action's record type.
    pub fn empty(action: Action) -> Self {
        match action {
            Action::TransferRates => Response::TransferRates(TransferRatesResponse::default()),
            Action::LinkLimits => Response::LinkLimits(LinkLimitsResponse::default()),
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Response::TransferRates(_) => Action::TransferRates,
            Response::LinkLimits(_) => Action::LinkLimits,
        }
    }

    /// Metric values carried by this response. Link limits arrive in
    /// bits/sec and are reported in bytes/sec.
    pub fn metric_updates(&self) -> Vec<(Metric, Option<u64>)> {
        match self {
            Response::TransferRates(r) => vec![
                (Metric::Sent, r.byte_send_rate.map(u64::from)),
                (Metric::Recv, r.byte_receive_rate.map(u64::from)),
            ],
            Response::LinkLimits(r) => vec![
                (Metric::SentMax, r.layer1_upstream_max_bit_rate.map(|b| b / 8)),
                (Metric::RecvMax, r.layer1_downstream_max_bit_rate.map(|b| b / 8)),
            ],
        }
    }
}

/// Whether the response came from the device or is a stand-in for a failed poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FetchOutcome {
    Succeeded,
    Defaulted { kind: ErrorKind, message: String },
}

/// Result of one poll. Always carries a response; `outcome` tells a device
/// that reported nothing apart from a poll that failed.
#[derive(Debug, Clone, Serialize)]
pub struct Fetched {
    pub action: Action,
    pub response: Response,
    pub outcome: FetchOutcome,
    #[serde(skip)]
    pub duration: Duration,
}

impl Fetched {
    pub fn succeeded(response: Response, duration: Duration) -> Self {
        Self {
            action: response.action(),
            response,
            outcome: FetchOutcome::Succeeded,
            duration,
        }
    }

    pub fn defaulted(action: Action, error: &SoapError, duration: Duration) -> Self {
        Self {
            action,
            response: Response::empty(action),
            outcome: FetchOutcome::Defaulted {
                kind: error.kind(),
                message: error.to_string(),
            },
            duration,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Succeeded)
    }
}
