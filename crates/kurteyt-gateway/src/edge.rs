use crate::error::{AppError, Result};
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::STRICT_TRANSPORT_SECURITY;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use kurteyt_redirector::{Reply, Resolution};
use tracing::trace;

/// Runs the edge resolver in front of the router.
///
/// Pass-through requests continue to the API; everything else is answered
/// here. Either way the response carries `Strict-Transport-Security`.
pub async fn edge_resolver(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response> {
    // the request body is not Sync, so nothing borrowed from it may live
    // across the lookup
    let method = request.method().as_str().to_owned();
    let path = request.uri().path().to_owned();

    match state.resolver().resolve(&method, &path).await? {
        Resolution::PassThrough => {
            let mut response = next.run(request).await;
            let hsts = HeaderValue::from_str(&state.resolver().config().strict_transport_security)
                .map_err(|e| AppError::Internal(format!("invalid HSTS header: {e}")))?;
            response.headers_mut().insert(STRICT_TRANSPORT_SECURITY, hsts);
            Ok(response)
        }
        Resolution::Respond(reply) => {
            trace!(status = reply.status, path = %path, "answered at the edge");
            into_response(reply)
        }
    }
}

fn into_response(reply: Reply) -> Result<Response> {
    let mut builder = Response::builder().status(reply.status);
    for (key, value) in reply.headers {
        builder = builder.header(key, value);
    }

    builder
        .body(reply.body.map(Body::from).unwrap_or_else(Body::empty))
        .map_err(|e| AppError::Internal(format!("invalid edge response: {e}")))
}
