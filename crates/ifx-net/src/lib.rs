//! Networking for the upload round-trip: URL validation, HTTP contracts,
//! multipart encoding, and a blocking transport.

pub mod http;
pub mod multipart;
pub mod transport;
pub mod url;

use http::HttpMethod;
use http::HttpRequest;
use ifx_core::PageError;
use ifx_core::PageResult;
use multipart::MultipartForm;
use transport::Transport;
use url::PageUrl;

/// File selected by the user, ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePayload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Client for the processing endpoint. One request per call; no retries,
/// no timeout beyond what the transport applies while connecting.
#[derive(Debug)]
pub struct UploadClient<T: Transport> {
    transport: T,
}

impl<T: Transport> UploadClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// POSTs the file as a multipart `file` field and returns the processed
    /// image bytes on any 2xx response.
    pub fn upload(&mut self, endpoint: &str, file: &FilePayload) -> PageResult<Vec<u8>> {
        let url = PageUrl::parse(endpoint)?;

        let mut form = MultipartForm::new();
        form.add_file("file", &file.filename, &file.content_type, &file.bytes);
        let content_type = form.content_type_header();
        let body = form.finish();

        let request = HttpRequest::builder(HttpMethod::Post, url)
            .header("Content-Type", &content_type)?
            .header("Accept", "image/*,application/json;q=0.5")?
            .body(body)
            .build()?;

        let response = self.transport.execute(&request)?;
        if !response.status.is_success() {
            return Err(PageError::new(
                "net.upload_rejected",
                format!("upload endpoint answered {}", response.status.as_u16()),
            ));
        }

        Ok(response.body)
    }

    /// Availability probe against the backend's health endpoint.
    pub fn probe_health(&mut self, endpoint: &str) -> PageResult<bool> {
        let url = PageUrl::parse(endpoint)?;
        let request = HttpRequest::builder(HttpMethod::Get, url)
            .header("Accept", "application/json")?
            .build()?;

        let response = self.transport.execute(&request)?;
        Ok(response.status.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::FilePayload;
    use super::UploadClient;
    use crate::http::HttpRequest;
    use crate::http::HttpResponse;
    use crate::http::HttpStatusCode;
    use crate::transport::Transport;
    use ifx_core::PageError;
    use ifx_core::PageResult;

    struct ScriptedTransport {
        status: u16,
        body: Vec<u8>,
        seen: Vec<HttpRequest>,
    }

    impl Transport for ScriptedTransport {
        fn execute(&mut self, request: &HttpRequest) -> PageResult<HttpResponse> {
            self.seen.push(request.clone());
            Ok(HttpResponse {
                status: HttpStatusCode::new(self.status)?,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    fn payload() -> FilePayload {
        FilePayload {
            filename: "pothole.png".to_owned(),
            content_type: "image/png".to_owned(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn upload_posts_multipart_and_returns_body() {
        let mut client = UploadClient::new(ScriptedTransport {
            status: 200,
            body: vec![9, 9],
            seen: Vec::new(),
        });

        let result = client.upload("http://127.0.0.1:8000/upload", &payload());
        assert_eq!(result, Ok(vec![9, 9]));

        let request = &client.transport.seen[0];
        assert_eq!(request.request_target(), "/upload");
        let content_type = request.header("Content-Type").unwrap_or_default();
        assert!(content_type.starts_with("multipart/form-data; boundary="));
        let body_text = String::from_utf8_lossy(&request.body);
        assert!(body_text.contains("name=\"file\""));
        assert!(body_text.contains("filename=\"pothole.png\""));
    }

    #[test]
    fn non_success_status_is_an_error() {
        let mut client = UploadClient::new(ScriptedTransport {
            status: 500,
            body: Vec::new(),
            seen: Vec::new(),
        });

        let result = client.upload("http://127.0.0.1:8000/upload", &payload());
        assert_eq!(
            result,
            Err(PageError::new(
                "net.upload_rejected",
                "upload endpoint answered 500"
            ))
        );
    }

    #[test]
    fn health_probe_reports_success_flag() {
        let mut client = UploadClient::new(ScriptedTransport {
            status: 200,
            body: b"{\"status\":\"ok\"}".to_vec(),
            seen: Vec::new(),
        });
        assert_eq!(client.probe_health("http://127.0.0.1:8000/health"), Ok(true));
    }
}
