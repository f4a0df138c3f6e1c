//! Request side of the SOAP exchange.

use crate::response::Action;

/// Service type of the WAN common interface on an Internet Gateway Device.
pub const SERVICE_URN: &str = "urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1";

/// Value of the `Content-type` request header.
pub const CONTENT_TYPE: &str = "text/xml; charset=\"utf-8\"";

const ENVELOPE_HEAD: &str = "<?xml version=\"1.0\"?>\n\
<s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\"\n        \
s:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\">\n  \
<s:Body>\n    ";

const ENVELOPE_TAIL: &str = "\n  </s:Body>\n</s:Envelope>";

/// Renders the request body for `action`.
pub fn request_body(action: Action) -> String {
    format!(
        "{ENVELOPE_HEAD}<u:{} xmlns:u=\"{SERVICE_URN}\"/>{ENVELOPE_TAIL}",
        action.soap_action()
    )
}

/// Renders the `SOAPACTION` header value for `action`.
pub fn soap_action_header(action: Action) -> String {
    format!("{SERVICE_URN}#{}", action.soap_action())
}
