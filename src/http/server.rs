use bytes::Bytes;
use http_body_util::{BodyDataStream, Full};
use hyper::body::{Body, Incoming};
use hyper::header::{self, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use serde_json::json;
use std::convert::Infallible;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::{GalleryError, RecordError};
use crate::state::{ImageRecord, NewImageRecord, RecordStore, UploadReceipt};
use crate::storage::{ImageUpload, ObjectStore};

/// Largest accepted upload request (the whole multipart stream)
pub const MAX_UPLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Form field carrying the uploaded image
pub const UPLOAD_FIELD: &str = "image";

type HttpResponse = Response<Full<Bytes>>;

/// The gallery backend: upload and listing on top of an object store and a record store
pub struct Gallery<O, R> {
    objects: O,
    records: Arc<R>,
    static_dir: PathBuf,
}

impl<O: ObjectStore, R: RecordStore> Gallery<O, R> {
    pub fn new(objects: O, records: R, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            objects,
            records: Arc::new(records),
            static_dir: static_dir.into(),
        }
    }

    pub fn objects(&self) -> &O {
        &self.objects
    }

    pub fn records(&self) -> &R {
        &self.records
    }

    /// Store one image and record it.
    ///
    /// Exactly one object store call, then (only if it succeeded) one record write.
    /// A failed record write leaves the stored blob behind with nothing pointing at it.
    pub async fn upload(&self, upload: ImageUpload) -> Result<UploadReceipt, GalleryError> {
        if !upload.is_image() {
            return Err(GalleryError::NotAnImage(upload.content_type));
        }

        let original_name = upload.original_name.clone();
        let stored = self.objects.put(upload).await.map_err(|e| {
            error!("❌ Object store rejected {}: {}", original_name, e);
            GalleryError::UpstreamStorage(e)
        })?;

        let storage_id = stored.storage_id.clone();
        let new_record = NewImageRecord {
            url: stored.url,
            storage_id: stored.storage_id,
            original_name,
            format: stored.format,
            width: stored.width,
            height: stored.height,
        };

        let records = Arc::clone(&self.records);
        let record = tokio::task::spawn_blocking(move || records.insert(new_record))
            .await
            .map_err(|e| RecordError::Join(e.to_string()))
            .and_then(|inserted| inserted)
            .map_err(|e| {
                error!(
                    "❌ Record write failed, blob {} is now orphaned: {}",
                    storage_id, e
                );
                GalleryError::Persistence(e)
            })?;

        info!(
            "📸 Uploaded {} as record {} ({})",
            record.original_name, record.id, record.storage_id
        );

        Ok(UploadReceipt {
            image_url: record.url,
            id: record.id,
        })
    }

    /// Every record, newest first
    pub async fn list(&self) -> Result<Vec<ImageRecord>, GalleryError> {
        let records = Arc::clone(&self.records);
        tokio::task::spawn_blocking(move || records.list_newest_first())
            .await
            .map_err(|e| RecordError::Join(e.to_string()))
            .and_then(|listed| listed)
            .map_err(|e| {
                error!("❌ Listing failed: {}", e);
                GalleryError::ListingUnavailable(e)
            })
    }

    /// Route one request. Every error becomes a JSON body; nothing is retried.
    pub async fn handle<B>(&self, req: Request<B>) -> HttpResponse
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
    {
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        debug!("{} {}", method, path);

        let result = match (&method, path.as_str()) {
            (&Method::OPTIONS, _) => Ok(preflight()),
            (&Method::GET, "/health") => Ok(json_response(StatusCode::OK, &json!({ "ok": true }))),
            (&Method::GET, "/api/images") => self
                .list()
                .await
                .map(|records| json_response(StatusCode::OK, &records)),
            (&Method::POST, "/api/upload") => match read_upload_form(req).await {
                Ok(upload) => self
                    .upload(upload)
                    .await
                    .map(|receipt| json_response(StatusCode::OK, &receipt)),
                Err(err) => Err(err),
            },
            (&Method::GET, p) if p.starts_with("/media/") => {
                self.serve_media(&p["/media/".len()..]).await
            }
            (&Method::GET, "/") => serve_file(&self.static_dir.join("index.html")).await,
            (&Method::GET, p) => match resolve_static(&self.static_dir, p) {
                Some(file) => serve_file(&file).await,
                None => Err(GalleryError::NotFound),
            },
            _ => Err(GalleryError::NotFound),
        };

        let mut res = result.unwrap_or_else(error_response);
        res.headers_mut().insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        );
        res
    }

    async fn serve_media(&self, storage_id: &str) -> Result<HttpResponse, GalleryError> {
        let path = self
            .objects
            .local_blob(storage_id)
            .ok_or(GalleryError::NotFound)?;
        serve_file(&path).await
    }
}

/// Pull the single `image` file out of a multipart request.
/// Other fields are skipped. A missing or empty file is a client error.
pub async fn read_upload_form<B>(req: Request<B>) -> Result<ImageUpload, GalleryError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>> + 'static,
{
    let boundary = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or(GalleryError::MissingFile)?;

    let constraints = multer::Constraints::new()
        .size_limit(multer::SizeLimit::new().whole_stream(MAX_UPLOAD_BYTES));
    let mut multipart = multer::Multipart::with_constraints(
        BodyDataStream::new(req.into_body()),
        boundary,
        constraints,
    );

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or("upload")
            .to_string();
        let content_type = field
            .content_type()
            .map(|mime| mime.essence_str().to_string())
            .unwrap_or_default();
        let bytes = field.bytes().await?;

        if bytes.is_empty() {
            return Err(GalleryError::MissingFile);
        }

        return Ok(ImageUpload {
            bytes,
            original_name,
            content_type,
        });
    }

    Err(GalleryError::MissingFile)
}

/// Map a request path onto the static directory. `..` never resolves.
fn resolve_static(root: &Path, request_path: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    for segment in request_path.split('/').filter(|s| !s.is_empty()) {
        if segment == ".." || segment == "." || segment.contains('\\') {
            return None;
        }
        path.push(segment);
    }
    Some(path)
}

async fn serve_file(path: &Path) -> Result<HttpResponse, GalleryError> {
    let is_dir = tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    let path = if is_dir {
        path.join("index.html")
    } else {
        path.to_path_buf()
    };

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        debug!("static file {} unavailable: {}", path.display(), e);
        GalleryError::NotFound
    })?;

    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let mut res = Response::new(Full::new(Bytes::from(bytes)));
    if let Ok(value) = HeaderValue::from_str(mime.as_ref()) {
        res.headers_mut().insert(header::CONTENT_TYPE, value);
    }
    Ok(res)
}

fn preflight() -> HttpResponse {
    let mut res = Response::new(Full::new(Bytes::new()));
    *res.status_mut() = StatusCode::NO_CONTENT;
    let headers = res.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    res
}

fn json_response<T: Serialize>(status: StatusCode, value: &T) -> HttpResponse {
    let (status, body) = match serde_json::to_vec(value) {
        Ok(body) => (status, Bytes::from(body)),
        Err(e) => {
            error!("failed to serialize response: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Bytes::from_static(br#"{"error":"internal error"}"#),
            )
        }
    };

    let mut res = Response::new(Full::new(body));
    *res.status_mut() = status;
    res.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    res
}

fn error_response(err: GalleryError) -> HttpResponse {
    if err.is_client_error() {
        debug!("rejected request: {}", err);
    }
    json_response(err.status(), &json!({ "error": err.to_string() }))
}

/// Accept connections until `shutdown` resolves. Each connection gets its own task.
pub async fn serve<O, R>(
    listener: TcpListener,
    gallery: Arc<Gallery<O, R>>,
    shutdown: impl Future<Output = ()>,
) -> std::io::Result<()>
where
    O: ObjectStore,
    R: RecordStore,
{
    info!("🖼️  Gallery listening on http://{}", listener.local_addr()?);
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down");
                return Ok(());
            }
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("accept failed: {}", e);
                    continue;
                }
            },
        };

        let gallery = Arc::clone(&gallery);
        tokio::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let gallery = Arc::clone(&gallery);
                async move { Ok::<_, Infallible>(gallery.handle(req).await) }
            });

            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(stream), service)
                .await
            {
                debug!("connection from {} ended with error: {}", peer, e);
            }
        });
    }
}
