//! `multipart/form-data` body encoding.

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

/// Incrementally built multipart body with a unique boundary.
#[derive(Debug, Clone)]
pub struct MultipartForm {
    boundary: String,
    body: Vec<u8>,
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl MultipartForm {
    pub fn new() -> Self {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|value| value.as_nanos())
            .unwrap_or_default();
        Self::with_boundary(&format!("----infrafix-{stamp:032x}"))
    }

    pub fn with_boundary(boundary: &str) -> Self {
        Self {
            boundary: boundary.to_owned(),
            body: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type_header(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Appends one file part. Quotes and line breaks in the field or file
    /// name are stripped rather than escaped; the wire stays parseable.
    pub fn add_file(&mut self, field: &str, filename: &str, content_type: &str, bytes: &[u8]) {
        self.body.extend_from_slice(b"--");
        let boundary = self.boundary.clone();
        self.body.extend_from_slice(boundary.as_bytes());
        self.body.extend_from_slice(b"\r\n");
        self.body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                sanitize_token(field),
                sanitize_token(filename),
            )
            .as_bytes(),
        );
        self.body
            .extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type.trim()).as_bytes());
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
    }

    /// Appends the closing delimiter and returns the finished body.
    pub fn finish(mut self) -> Vec<u8> {
        let closing = format!("--{}--\r\n", self.boundary);
        self.body.extend_from_slice(closing.as_bytes());
        self.body
    }
}

fn sanitize_token(input: &str) -> String {
    input
        .chars()
        .filter(|ch| !matches!(ch, '"' | '\r' | '\n' | '\\'))
        .collect()
}
