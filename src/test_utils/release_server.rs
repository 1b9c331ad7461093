//! Local stand-in for the release download site.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tiny_http::{Header, Response, Server, StatusCode};

/// Serves `/download-headless/stable` (and `/experimental`) listing the given
/// versions, and the archive under every `/get-download/...` link.
pub struct ReleaseServer {
    base_url: String,
    index_requests: Arc<AtomicUsize>,
    archive_requests: Arc<AtomicUsize>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl ReleaseServer {
    /// Start serving on an ephemeral localhost port.
    pub fn start(versions: &[&str], archive: Vec<u8>) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let page = index_page(versions);
        let index_requests = Arc::new(AtomicUsize::new(0));
        let archive_requests = Arc::new(AtomicUsize::new(0));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let index_requests = Arc::clone(&index_requests);
            let archive_requests = Arc::clone(&archive_requests);
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let Ok(Some(request)) = server.recv_timeout(Duration::from_millis(50)) else {
                        continue;
                    };
                    let url = request.url().to_string();
                    let _ = if url.starts_with("/download-headless/") {
                        index_requests.fetch_add(1, Ordering::SeqCst);
                        request.respond(html(&page))
                    } else if url.starts_with("/get-download/") {
                        archive_requests.fetch_add(1, Ordering::SeqCst);
                        request.respond(Response::from_data(archive.clone()))
                    } else {
                        request.respond(Response::from_string("not found").with_status_code(StatusCode(404)))
                    };
                }
            })
        };

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            index_requests,
            archive_requests,
            stop,
            handle: Some(handle),
        }
    }

    /// `http://127.0.0.1:<port>`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// How many times a release index was requested.
    pub fn index_requests(&self) -> usize {
        self.index_requests.load(Ordering::SeqCst)
    }

    /// How many times an archive was downloaded.
    pub fn archive_requests(&self) -> usize {
        self.archive_requests.load(Ordering::SeqCst)
    }
}

impl Drop for ReleaseServer {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn html(body: &str) -> Response<std::io::Cursor<Vec<u8>>> {
    let response = Response::from_string(body);
    match Header::from_bytes("Content-Type", "text/html; charset=utf-8") {
        Ok(header) => response.with_header(header),
        Err(_) => response,
    }
}

/// Index page in the shape of the official download pages.
pub fn index_page(versions: &[&str]) -> String {
    let entries: String = versions
        .iter()
        .map(|v| {
            format!(
                "<h3>{v}</h3>\n<ul><li><a href=\"/get-download/{v}/headless/linux64\">Linux 64</a></li></ul>\n"
            )
        })
        .collect();
    format!("<html><body><h2>Headless</h2>\n{entries}</body></html>\n")
}
