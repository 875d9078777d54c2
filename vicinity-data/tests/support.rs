//! Single-request HTTP stub for exercising [`LocationIqClient`] end to end.
//!
//! [`LocationIqClient`]: vicinity_data::locationiq::LocationIqClient

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

/// Answers exactly one request with a canned status and JSON body.
pub struct StubServer {
    addr: SocketAddr,
    request_line: Arc<Mutex<Option<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl StubServer {
    /// Bind to an ephemeral port and serve one response.
    pub fn serve(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub server");
        let addr = listener.local_addr().expect("stub server address");
        let request_line = Arc::new(Mutex::new(None));
        let recorded = Arc::clone(&request_line);
        let response = format!(
            "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );

        let handle = thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
            let mut first = String::new();
            reader.read_line(&mut first).expect("read request line");
            *recorded.lock().expect("request lock") = Some(first.trim_end().to_owned());
            let mut line = String::new();
            while reader.read_line(&mut line).is_ok_and(|n| n > 2) {
                line.clear();
            }
            stream
                .write_all(response.as_bytes())
                .expect("write stub response");
        });

        Self {
            addr,
            request_line,
            handle: Some(handle),
        }
    }

    /// Base URL pointing at this server.
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.addr)
    }

    /// Request line of the served request, e.g. `GET /v1/nearby?... HTTP/1.1`.
    pub fn request_line(&mut self) -> String {
        if let Some(handle) = self.handle.take() {
            handle.join().expect("stub server thread");
        }
        self.request_line
            .lock()
            .expect("request lock")
            .clone()
            .expect("a request was served")
    }
}

/// A base URL on which nothing is listening.
pub fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe address");
    drop(listener);
    format!("http://{addr}/v1")
}
