//! SOAP client for the router's WANCommonInterfaceConfig service.
//!
//! One call is one HTTP POST on a fresh connection: the envelope is written
//! in full, the response body is streamed into the XML reader, the rest of
//! the body is drained and the connection is dropped. Failures never reach
//! the caller; `fetch` hands back the empty record for the action together
//! with the reason.

use futures_util::TryStreamExt;
use quick_xml::Reader;
use reqwest::header::CONTENT_TYPE;
use std::io;
use std::time::{Duration, Instant};
use tokio_util::io::StreamReader;
use tracing::{debug, instrument, warn};

use crate::error::SoapError;
use crate::response::{
    Action, Fetched, LinkLimitsResponse, Response, SoapRecord, TransferRatesResponse,
};
use crate::soap::envelope;
use crate::soap::reader::read_record;

/// Connection settings for the device endpoint.
#[derive(Debug, Clone)]
pub struct SoapSettings {
    /// Full control URL, e.g. `http://192.168.178.1:49000/igdupnp/control/WANCommonIFC1`.
    pub endpoint: String,
    /// Upper bound for one complete call, body included.
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}

pub struct SoapClient {
    http: reqwest::Client,
    endpoint: String,
}

impl SoapClient {
    pub fn new(settings: SoapSettings) -> Result<Self, SoapError> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .connect_timeout(settings.connect_timeout)
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            http,
            endpoint: settings.endpoint,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Polls `action` once. Never fails: on error the empty record of the
    /// action is returned with a `Defaulted` outcome.
    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    pub async fn fetch(&self, action: Action) -> Fetched {
        let start = Instant::now();
        let result = match action {
            Action::TransferRates => self
                .call::<TransferRatesResponse>(action)
                .await
                .map(Response::TransferRates),
            Action::LinkLimits => self
                .call::<LinkLimitsResponse>(action)
                .await
                .map(Response::LinkLimits),
        };

        match result {
            Ok(response) => {
                debug!(
                    "{} answered in {:.1}ms",
                    action.soap_action(),
                    start.elapsed().as_secs_f64() * 1000.0
                );
                Fetched::succeeded(response, start.elapsed())
            }
            Err(e) => {
                warn!(kind = %e.kind(), "{} failed: {}", action.soap_action(), e);
                Fetched::defaulted(action, &e, start.elapsed())
            }
        }
    }

    /// Performs the exchange and binds the response into `T`.
    pub async fn call<T: SoapRecord>(&self, action: Action) -> Result<T, SoapError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, envelope::CONTENT_TYPE)
            .header("SOAPACTION", envelope::soap_action_header(action))
            .body(envelope::request_body(action))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SoapError::Status(status));
        }

        let body = Box::pin(response.bytes_stream().map_err(io::Error::other));
        let mut reader = Reader::from_reader(StreamReader::new(body));
        reader.config_mut().trim_text(true);

        let record = read_record::<_, T>(&mut reader).await?;

        // Reading to EOF lets the transport finish the exchange cleanly
        // before the connection is dropped.
        let mut rest = reader.into_inner();
        match tokio::io::copy_buf(&mut rest, &mut tokio::io::sink()).await {
            Ok(n) => debug!("drained {} trailing bytes", n),
            Err(e) => debug!("failed to drain response body: {}", e),
        }

        Ok(record)
    }
}
