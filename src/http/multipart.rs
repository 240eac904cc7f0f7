/// multipart/form-data request bodies
///
/// Both outgoing uploads (gallery client -> server, server -> image CDN)
/// are a handful of text fields plus one file, so the whole body is built
/// in memory.
use bytes::{BufMut, Bytes, BytesMut};
use rand::Rng;

pub struct MultipartForm {
    boundary: String,
    body: BytesMut,
}

impl MultipartForm {
    pub fn new() -> Self {
        let nonce: u64 = rand::thread_rng().gen();
        Self::with_boundary(format!("gallery-wall-{:016x}", nonce))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            body: BytesMut::new(),
        }
    }

    /// Value for the request's Content-Type header
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.open_part(&format!(
            "Content-Disposition: form-data; name=\"{}\"\r\n\r\n",
            escape(name)
        ));
        self.body.put_slice(value.as_bytes());
        self.body.put_slice(b"\r\n");
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, data: &[u8]) -> Self {
        self.open_part(&format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
            escape(name),
            escape(file_name),
            content_type
        ));
        self.body.put_slice(data);
        self.body.put_slice(b"\r\n");
        self
    }

    fn open_part(&mut self, headers: &str) {
        self.body.put_slice(b"--");
        self.body.put_slice(self.boundary.as_bytes());
        self.body.put_slice(b"\r\n");
        self.body.put_slice(headers.as_bytes());
    }

    /// Close the form and return (content type, body)
    pub fn finish(mut self) -> (String, Bytes) {
        let content_type = self.content_type();
        self.body.put_slice(b"--");
        self.body.put_slice(self.boundary.as_bytes());
        self.body.put_slice(b"--\r\n");
        (content_type, self.body.freeze())
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

fn escape(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::{BodyDataStream, Full};

    #[test]
    fn test_layout() {
        let (content_type, body) = MultipartForm::with_boundary("XYZ")
            .text("api_key", "123")
            .file("file", "a.png", "image/png", b"PNG")
            .finish();

        assert_eq!(content_type, "multipart/form-data; boundary=XYZ");
        assert_eq!(
            &body[..],
            b"--XYZ\r\n\
Content-Disposition: form-data; name=\"api_key\"\r\n\r\n\
123\r\n\
--XYZ\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\
Content-Type: image/png\r\n\r\n\
PNG\r\n\
--XYZ--\r\n"
        );
    }

    #[tokio::test]
    async fn test_multer_reads_what_we_write() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(4096).collect();
        let (content_type, body) = MultipartForm::new()
            .text("note", "hello")
            .file("image", "holiday photo.jpg", "image/jpeg", &payload)
            .finish();

        let boundary = multer::parse_boundary(&content_type).unwrap();
        let stream = BodyDataStream::new(Full::new(body));
        let mut multipart = multer::Multipart::new(stream, boundary);

        let note = multipart.next_field().await.unwrap().unwrap();
        assert_eq!(note.name(), Some("note"));
        assert_eq!(note.text().await.unwrap(), "hello");

        let image = multipart.next_field().await.unwrap().unwrap();
        assert_eq!(image.name(), Some("image"));
        assert_eq!(image.file_name(), Some("holiday photo.jpg"));
        assert_eq!(image.content_type().map(|m| m.essence_str()), Some("image/jpeg"));
        assert_eq!(image.bytes().await.unwrap(), payload);

        assert!(multipart.next_field().await.unwrap().is_none());
    }
}
