//! Throw-away HTTP/1.1 responder standing in for the router.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One request as seen by the mock router.
#[derive(Debug, Clone, Default)]
pub struct RecordedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a canned answer.
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// How the mock router treats a connection after reading a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Answer once with `Connection: close` and shut the socket.
    Close,
    /// Answer every request on the socket until the client hangs up.
    KeepAlive,
    /// Read the request and never answer.
    Silent,
}

pub struct MockRouter {
    pub endpoint: String,
    pub requests: Arc<Mutex<Vec<RecordedRequest>>>,
    connections: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl MockRouter {
    /// Serves every connection with `reply(request)` and closes it afterwards.
    pub async fn start<F>(reply: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
    {
        Self::start_with(ConnectionMode::Close, reply).await
    }

    pub async fn start_with<F>(mode: ConnectionMode, reply: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = requests.clone();
        let connections = Arc::new(AtomicUsize::new(0));
        let accepted = connections.clone();
        let reply = Arc::new(reply);

        let task = tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                accepted.fetch_add(1, Ordering::SeqCst);
                let recorded = recorded.clone();
                let reply = reply.clone();

                tokio::spawn(async move {
                    let (read_half, mut write_half) = stream.into_split();
                    let mut reader = BufReader::new(read_half);

                    while let Some(request) = read_request(&mut reader).await {
                        let answer = reply(&request);
                        recorded.lock().unwrap().push(request);

                        if mode == ConnectionMode::Silent {
                            std::future::pending::<()>().await;
                        }

                        let connection = match mode {
                            ConnectionMode::KeepAlive => "keep-alive",
                            _ => "close",
                        };
                        let response = format!(
                            "HTTP/1.1 {} Mock\r\n\
                             Content-Type: text/xml; charset=\"utf-8\"\r\n\
                             Content-Length: {}\r\n\
                             Connection: {}\r\n\r\n{}",
                            answer.status,
                            answer.body.len(),
                            connection,
                            answer.body
                        );
                        if write_half.write_all(response.as_bytes()).await.is_err() {
                            return;
                        }
                        if mode == ConnectionMode::Close {
                            let _ = write_half.shutdown().await;
                            return;
                        }
                    }
                });
            }
        });

        Self {
            endpoint: format!("http://{}/igdupnp/control/WANCommonIFC1", addr),
            requests,
            connections,
            task,
        }
    }

    /// Number of TCP connections accepted so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for MockRouter {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn read_request<R>(reader: &mut BufReader<R>) -> Option<RecordedRequest>
where
    R: tokio::io::AsyncRead + Unpin,
{
    let mut request = RecordedRequest::default();

    let mut line = String::new();
    reader.read_line(&mut line).await.ok()?;
    request.request_line = line.trim_end().to_string();

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await.ok()? == 0 {
            return None;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            request
                .headers
                .push((name.trim().to_string(), value.trim().to_string()));
        }
    }

    let length: usize = request
        .header("content-length")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await.ok()?;
    request.body = String::from_utf8_lossy(&body).into_owned();

    Some(request)
}

/// Wraps `inner` into a SOAP response envelope for `action`.
pub fn soap_response(action: &str, inner: &str) -> String {
    format!(
        "<?xml version=\"1.0\"?>\n\
         <s:Envelope xmlns:s=\"http://schemas.xmlsoap.org/soap/envelope/\" \
         s:encodingStyle=\"http://schemas.xmlsoap.org/soap/encoding/\">\n\
         <s:Body>\n\
         <u:{action}Response xmlns:u=\"urn:schemas-upnp-org:service:WANCommonInterfaceConfig:1\">\n\
         {inner}\n\
         </u:{action}Response>\n\
         </s:Body>\n\
         </s:Envelope>\n"
    )
}

pub fn transfer_rates_body(send: u32, recv: u32) -> String {
    soap_response(
        "GetAddonInfos",
        &format!(
            "<NewByteSendRate>{send}</NewByteSendRate>\
             <NewByteReceiveRate>{recv}</NewByteReceiveRate>"
        ),
    )
}

pub fn link_limits_body(up_bits: u64, down_bits: u64) -> String {
    soap_response(
        "GetCommonLinkProperties",
        &format!(
            "<NewWANAccessType>DSL</NewWANAccessType>\
             <NewLayer1UpstreamMaxBitRate>{up_bits}</NewLayer1UpstreamMaxBitRate>\
             <NewLayer1DownstreamMaxBitRate>{down_bits}</NewLayer1DownstreamMaxBitRate>\
             <NewPhysicalLinkStatus>Up</NewPhysicalLinkStatus>"
        ),
    )
}

/// Answers both actions like a router would, picked by the SOAPACTION header.
pub fn router_reply(send: u32, recv: u32, up_bits: u64, down_bits: u64) -> impl Fn(&RecordedRequest) -> Reply {
    move |request| match request.header("soapaction") {
        Some(action) if action.ends_with("#GetAddonInfos") => {
            Reply::ok(transfer_rates_body(send, recv))
        }
        Some(action) if action.ends_with("#GetCommonLinkProperties") => {
            Reply::ok(link_limits_body(up_bits, down_bits))
        }
        _ => Reply::status(500, "unknown action"),
    }
}
