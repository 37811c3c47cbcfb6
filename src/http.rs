//! HTTP API for RSVPs
//!
//! ## Public
//! - `GET /api/health` - Liveness and uptime
//! - `POST /api/rsvp` - Submit an RSVP
//!
//! ## Admin (password in `?password=` or `X-Admin-Password`)
//! - `GET /api/admin` - All RSVPs with summary counts
//! - `DELETE /api/admin/rsvp/{id}` - Delete an RSVP
//! - `GET /api/admin/guests` - Guest list
//! - `POST /api/admin/guests` - Add a guest (`{"name": "..."}`)
//! - `DELETE /api/admin/guests/{name}` - Remove a guest (URL-encoded name)
//!
//! Every response is JSON; failures carry `{"error": "..."}`.
//!
//! ## Example Usage
//!
//! ```bash
//! curl -X POST -H "Content-Type: application/json" \
//!      -d '{"names":"John Smith","phone":"555-123-4567","attending":"yes","guests":2}' \
//!      http://localhost:3000/api/rsvp
//!
//! curl -H "X-Admin-Password: $ADMIN_PASSWORD" http://localhost:3000/api/admin
//! ```

use bytes::Bytes;
use http_body_util::{BodyExt, Full, Limited};
use hyper::body::Body;
use hyper::header::{self, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{HeaderMap, Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::error::RsvpError;
use crate::model::{Attendance, RsvpSubmission};
use crate::service::RsvpService;

/// Header carrying the admin password when it is not in the query string
pub const ADMIN_PASSWORD_HEADER: &str = "x-admin-password";

const ATTENDING_MESSAGE: &str = "Thank you for your RSVP! We can't wait to celebrate with you!";
const DECLINING_MESSAGE: &str = "Thank you for letting us know. We'll miss you on our special day!";
const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong. Please try again later.";

type HttpResponse = Response<Full<Bytes>>;

/// Failure while serving one request
#[derive(Debug)]
enum ApiError {
    /// Malformed request before it reached the service
    BadRequest(String),
    PayloadTooLarge,
    Rsvp(RsvpError),
}

impl From<RsvpError> for ApiError {
    fn from(e: RsvpError) -> Self {
        Self::Rsvp(e)
    }
}

/// HTTP status for a service error
pub fn status_for(err: &RsvpError) -> StatusCode {
    match err {
        RsvpError::MissingFields | RsvpError::InvalidGuestCount { .. } | RsvpError::InvalidPhone => {
            StatusCode::BAD_REQUEST
        }
        RsvpError::Unauthorized => StatusCode::UNAUTHORIZED,
        RsvpError::NotOnGuestList => StatusCode::FORBIDDEN,
        RsvpError::NotFound(_) => StatusCode::NOT_FOUND,
        RsvpError::DuplicateSubmission | RsvpError::AlreadyExists(_) => StatusCode::CONFLICT,
        RsvpError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

#[derive(Debug, Deserialize)]
struct AdminQuery {
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AddGuestRequest {
    #[serde(default)]
    name: Option<String>,
}

/// HTTP server state
pub struct HttpServer {
    service: Arc<RsvpService>,
    bind_addr: SocketAddr,
    trust_proxy: bool,
    max_body_bytes: usize,
    started_at: Instant,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(service: Arc<RsvpService>, bind_addr: SocketAddr) -> Self {
        Self {
            service,
            bind_addr,
            trust_proxy: false,
            max_body_bytes: 64 * 1024,
            started_at: Instant::now(),
        }
    }

    /// Take the client address from `X-Forwarded-For`
    pub fn with_trust_proxy(mut self, trust_proxy: bool) -> Self {
        self.trust_proxy = trust_proxy;
        self
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Run the HTTP server
    pub async fn run(self: Arc<Self>) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.bind_addr).await?;
        info!(addr = %self.bind_addr, "HTTP server listening");

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let server = self.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req| {
                    let server = server.clone();
                    async move { server.handle_request(req, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(addr = %remote_addr, error = %err, "Connection error");
                }
            });
        }
    }

    /// Route a request to its handler
    pub async fn handle_request<B>(
        &self,
        req: Request<B>,
        remote_addr: SocketAddr,
    ) -> Result<HttpResponse, hyper::Error>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let path = req.uri().path().to_string();
        let method = req.method().clone();

        debug!(method = %method, path = %path, "Incoming request");

        let credential = admin_credential(&req);
        let credential = credential.as_deref();

        let result = match (method, path.as_str()) {
            (Method::OPTIONS, _) => Ok(preflight_response()),

            (Method::GET, "/api/health") => Ok(self.handle_health()),
            (Method::POST, "/api/rsvp") => self.handle_submit(req, remote_addr).await,

            (Method::GET, "/api/admin") => self.handle_list_rsvps(credential).await,
            (Method::DELETE, p) if p.starts_with("/api/admin/rsvp/") => {
                let id = p.strip_prefix("/api/admin/rsvp/").unwrap_or("");
                self.handle_delete_rsvp(credential, id).await
            }

            (Method::GET, "/api/admin/guests") => self.handle_list_guests(credential).await,
            (Method::POST, "/api/admin/guests") => self.handle_add_guest(req, credential).await,
            (Method::DELETE, p) if p.starts_with("/api/admin/guests/") => {
                let name = p.strip_prefix("/api/admin/guests/").unwrap_or("");
                self.handle_delete_guest(credential, name).await
            }

            (_, p) if p.starts_with("/api/") => Ok(json_response(
                StatusCode::NOT_FOUND,
                &serde_json::json!({ "error": "API endpoint not found" }),
            )),

            _ => Ok(json_response(
                StatusCode::NOT_FOUND,
                &serde_json::json!({ "error": "Not Found" }),
            )),
        };

        Ok(result.unwrap_or_else(|e| self.error_response(e)))
    }

    fn error_response(&self, err: ApiError) -> HttpResponse {
        match err {
            ApiError::BadRequest(message) => {
                json_response(StatusCode::BAD_REQUEST, &serde_json::json!({ "error": message }))
            }
            ApiError::PayloadTooLarge => json_response(
                StatusCode::PAYLOAD_TOO_LARGE,
                &serde_json::json!({
                    "error": format!("Request body exceeds {} bytes", self.max_body_bytes)
                }),
            ),
            ApiError::Rsvp(e) if e.is_rejection() => {
                debug!(kind = e.kind(), "Request rejected");
                json_response(status_for(&e), &serde_json::json!({ "error": e.to_string() }))
            }
            ApiError::Rsvp(e) => {
                error!(error = %e, "Request error");
                json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &serde_json::json!({ "error": INTERNAL_ERROR_MESSAGE }),
                )
            }
        }
    }

    /// GET /api/health
    fn handle_health(&self) -> HttpResponse {
        let body = serde_json::json!({
            "status": "ok",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "uptime": self.started_at.elapsed().as_secs_f64(),
            "version": env!("CARGO_PKG_VERSION"),
        });
        json_response(StatusCode::OK, &body)
    }

    /// POST /api/rsvp
    async fn handle_submit<B>(
        &self,
        req: Request<B>,
        remote_addr: SocketAddr,
    ) -> Result<HttpResponse, ApiError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let origin = client_ip(req.headers(), remote_addr, self.trust_proxy);
        let submission: RsvpSubmission = self.read_json(req).await?;

        let record = self.service.submit_rsvp(&submission, &origin).await?;

        let message = match record.attending {
            Attendance::Yes => ATTENDING_MESSAGE,
            Attendance::No => DECLINING_MESSAGE,
        };
        Ok(json_response(
            StatusCode::CREATED,
            &serde_json::json!({ "message": message, "id": record.id }),
        ))
    }

    /// GET /api/admin
    async fn handle_list_rsvps(&self, credential: Option<&str>) -> Result<HttpResponse, ApiError> {
        let overview = self.service.list_rsvps(credential).await?;
        Ok(json_response(StatusCode::OK, &serde_json::json!(overview)))
    }

    /// DELETE /api/admin/rsvp/{id}
    async fn handle_delete_rsvp(
        &self,
        credential: Option<&str>,
        raw_id: &str,
    ) -> Result<HttpResponse, ApiError> {
        let id = decode_segment(raw_id)?;
        if id.is_empty() {
            return Err(ApiError::BadRequest("RSVP ID is required".to_string()));
        }

        let removed = self.service.delete_rsvp(credential, &id).await?;

        Ok(json_response(
            StatusCode::OK,
            &serde_json::json!({
                "success": true,
                "message": "RSVP deleted successfully",
                "deletedRsvp": { "id": removed.id, "names": removed.names },
            }),
        ))
    }

    /// GET /api/admin/guests
    async fn handle_list_guests(&self, credential: Option<&str>) -> Result<HttpResponse, ApiError> {
        let guests = self.service.list_guests(credential).await?;
        Ok(json_response(
            StatusCode::OK,
            &serde_json::json!({ "success": true, "total": guests.len(), "guests": guests }),
        ))
    }

    /// POST /api/admin/guests
    async fn handle_add_guest<B>(
        &self,
        req: Request<B>,
        credential: Option<&str>,
    ) -> Result<HttpResponse, ApiError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let body: AddGuestRequest = self.read_json(req).await?;

        let name = body.name.unwrap_or_default();
        let change = self.service.add_guest(credential, &name).await?;

        Ok(json_response(
            StatusCode::OK,
            &serde_json::json!({
                "success": true,
                "message": "Guest added successfully",
                "guest": change.guest,
                "total": change.total,
            }),
        ))
    }

    /// DELETE /api/admin/guests/{name}
    async fn handle_delete_guest(
        &self,
        credential: Option<&str>,
        raw_name: &str,
    ) -> Result<HttpResponse, ApiError> {
        let name = decode_segment(raw_name)?;

        let change = self.service.delete_guest(credential, &name).await?;

        Ok(json_response(
            StatusCode::OK,
            &serde_json::json!({
                "success": true,
                "message": "Guest deleted successfully",
                "deletedGuest": change.guest,
                "total": change.total,
            }),
        ))
    }

    /// Collect a size-limited body and parse it as JSON
    async fn read_json<B, T>(&self, req: Request<B>) -> Result<T, ApiError>
    where
        B: Body<Data = Bytes>,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
        T: DeserializeOwned,
    {
        let body = Limited::new(req.into_body(), self.max_body_bytes)
            .collect()
            .await
            .map_err(|e| {
                if e.is::<http_body_util::LengthLimitError>() {
                    ApiError::PayloadTooLarge
                } else {
                    ApiError::BadRequest(format!("Failed to read body: {}", e))
                }
            })?
            .to_bytes();

        serde_json::from_slice(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
    }
}

/// Admin password from the `password` query parameter, else the header
fn admin_credential<B>(req: &Request<B>) -> Option<String> {
    let from_query = req
        .uri()
        .query()
        .and_then(|q| serde_urlencoded::from_str::<AdminQuery>(q).ok())
        .and_then(|q| q.password);

    from_query.or_else(|| {
        req.headers()
            .get(ADMIN_PASSWORD_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    })
}

/// Best-effort client address
fn client_ip(headers: &HeaderMap, remote_addr: SocketAddr, trust_proxy: bool) -> String {
    if trust_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }
    remote_addr.ip().to_string()
}

fn decode_segment(raw: &str) -> Result<String, ApiError> {
    urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .map_err(|_| ApiError::BadRequest("Path segment is not valid UTF-8".to_string()))
}

fn with_cors(headers: &mut HeaderMap) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, X-Admin-Password"),
    );
}

fn json_response(status: StatusCode, body: &serde_json::Value) -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    with_cors(headers);
    response
}

fn preflight_response() -> HttpResponse {
    let mut response = Response::new(Full::new(Bytes::new()));
    *response.status_mut() = StatusCode::NO_CONTENT;
    let headers = response.headers_mut();
    with_cors(headers);
    headers.insert(header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from_static("86400"));
    response
}
