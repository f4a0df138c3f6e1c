//! Integration tests for the SOAP client against a local mock router.

mod support;

use fritzmon::response::{LinkLimitsResponse, TransferRatesResponse};
use fritzmon::{Action, ErrorKind, FetchOutcome, Metric, MetricStore, Response, SoapClient, SoapSettings};
use std::time::Duration;
use support::{router_reply, soap_response, ConnectionMode, MockRouter, Reply};

fn client_for(endpoint: &str) -> SoapClient {
    SoapClient::new(SoapSettings {
        endpoint: endpoint.to_string(),
        request_timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_secs(1),
    })
    .expect("client builds")
}

#[tokio::test]
async fn test_request_carries_envelope_and_headers() {
    let router = MockRouter::start(router_reply(1, 2, 3, 4)).await;
    let client = client_for(&router.endpoint);

    let fetched = client.fetch(Action::LinkLimits).await;
    assert!(fetched.is_success());

    let requests = router.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];

    assert_eq!(
        request.request_line,
        "POST /igdupnp/control/WANCommonIFC1 HTTP/1.1"
    );
    assert_eq!(
        request.header("soapaction"),
        Some("urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1#GetCommonLinkProperties")
    );
    assert_eq!(
        request.header("content-type"),
        Some("text/xml; charset=\"utf-8\"")
    );
    assert!(request.body.contains("<u:GetCommonLinkProperties"));
    assert!(request.body.contains("</s:Envelope>"));
}

#[tokio::test]
async fn test_transfer_rates_bind_only_present_fields() {
    let router = MockRouter::start(router_reply(12345, 6789, 0, 0)).await;
    let client = client_for(&router.endpoint);

    let fetched = client.fetch(Action::TransferRates).await;
    assert_eq!(fetched.outcome, FetchOutcome::Succeeded);
    assert_eq!(
        fetched.response,
        Response::TransferRates(TransferRatesResponse {
            byte_send_rate: Some(12345),
            byte_receive_rate: Some(6789),
            ..TransferRatesResponse::default()
        })
    );

    let store = MetricStore::new();
    store.apply(&fetched.response);
    assert_eq!(store.get(Metric::Sent), 12345);
    assert_eq!(store.get(Metric::Recv), 6789);
    assert_eq!(store.get(Metric::SentMax), 0);
}

#[tokio::test]
async fn test_link_limits_convert_bits_to_bytes() {
    let router = MockRouter::start(router_reply(0, 0, 40_000_000, 8000)).await;
    let client = client_for(&router.endpoint);

    let fetched = client.fetch(Action::LinkLimits).await;
    let store = MetricStore::new();
    store.apply(&fetched.response);

    assert_eq!(store.get(Metric::SentMax), 5_000_000);
    assert_eq!(store.get(Metric::RecvMax), 1000);
}

#[tokio::test]
async fn test_self_closing_response_is_empty_record() {
    let router = MockRouter::start(|_| {
        Reply::ok(
            "<?xml version=\"1.0\"?>\
             <s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\"><s:Body>\
             <u:GetCommonLinkPropertiesResponse xmlns:u=\"urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1\"/>\
             </s:Body></s:Envelope>",
        )
    })
    .await;
    let client = client_for(&router.endpoint);

    let fetched = client.fetch(Action::LinkLimits).await;
    assert!(fetched.is_success());
    assert_eq!(
        fetched.response,
        Response::LinkLimits(LinkLimitsResponse::default())
    );
}

#[tokio::test]
async fn test_connection_refused_yields_defaulted_record() {
    // Bind and drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_for(&format!("http://{}/igdupnp/control/WANCommonIFC1", addr));
    let fetched = client.fetch(Action::TransferRates).await;

    assert!(!fetched.is_success());
    assert!(matches!(
        fetched.outcome,
        FetchOutcome::Defaulted {
            kind: ErrorKind::Transport,
            ..
        }
    ));
    assert_eq!(fetched.response, Response::empty(Action::TransferRates));
}

#[tokio::test]
async fn test_http_error_status_is_transport_failure() {
    let router = MockRouter::start(|_| Reply::status(500, "<error/>")).await;
    let client = client_for(&router.endpoint);

    let fetched = client.fetch(Action::TransferRates).await;
    assert!(matches!(
        fetched.outcome,
        FetchOutcome::Defaulted {
            kind: ErrorKind::Transport,
            ..
        }
    ));
}

#[tokio::test]
async fn test_malformed_body_is_protocol_failure() {
    let router = MockRouter::start(|_| Reply::ok("<s:Envelope><s:Body>")).await;
    let client = client_for(&router.endpoint);

    let fetched = client.fetch(Action::TransferRates).await;
    assert!(matches!(
        fetched.outcome,
        FetchOutcome::Defaulted {
            kind: ErrorKind::Protocol,
            ..
        }
    ));
    assert_eq!(fetched.response, Response::empty(Action::TransferRates));
}

#[tokio::test]
async fn test_unparsable_number_is_mapping_failure() {
    let router = MockRouter::start(|_| {
        Reply::ok(soap_response(
            "GetAddonInfos",
            "<NewByteSendRate>fast</NewByteSendRate>",
        ))
    })
    .await;
    let client = client_for(&router.endpoint);

    let fetched = client.fetch(Action::TransferRates).await;
    match fetched.outcome {
        FetchOutcome::Defaulted { kind, message } => {
            assert_eq!(kind, ErrorKind::Mapping);
            assert!(message.contains("NewByteSendRate"), "message: {}", message);
        }
        other => panic!("expected mapping failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_each_call_uses_a_fresh_connection() {
    let router = MockRouter::start_with(ConnectionMode::KeepAlive, router_reply(1, 1, 8, 8)).await;
    let client = client_for(&router.endpoint);

    for _ in 0..3 {
        assert!(client.fetch(Action::TransferRates).await.is_success());
    }
    assert_eq!(router.requests().len(), 3);
    assert_eq!(router.connections(), 3);
}

#[tokio::test]
async fn test_silent_router_times_out_as_transport_failure() {
    let router = MockRouter::start_with(ConnectionMode::Silent, router_reply(1, 1, 8, 8)).await;
    let client = SoapClient::new(SoapSettings {
        endpoint: router.endpoint.clone(),
        request_timeout: Duration::from_millis(300),
        connect_timeout: Duration::from_secs(1),
    })
    .expect("client builds");

    let started = std::time::Instant::now();
    let fetched = client.fetch(Action::TransferRates).await;
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_secs(2), "took {:?}", elapsed);
    assert!(
        matches!(
            fetched.outcome,
            FetchOutcome::Defaulted {
                kind: ErrorKind::Transport,
                ..
            }
        ),
        "outcome: {:?}",
        fetched.outcome
    );
    assert_eq!(fetched.response, Response::empty(Action::TransferRates));
    assert_eq!(router.requests().len(), 1);
}
