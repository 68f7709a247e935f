use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use slashgate_discord::{
    InteractionReply, InteractionService, SignedRequest, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};

/// Both paths serve the same webhook; the platform may be pointed at either.
pub fn router(service: InteractionService) -> Router {
    Router::new()
        .route("/interactions", post(interactions))
        .route("/", post(interactions))
        .with_state(service)
}

/// The body is taken as raw bytes; verification must see exactly what was sent.
pub async fn interactions(
    State(service): State<InteractionService>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request = SignedRequest {
        signature: header_value(&headers, SIGNATURE_HEADER),
        timestamp: header_value(&headers, TIMESTAMP_HEADER),
        body: &body,
    };

    match service.handle(request).await {
        InteractionReply::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        InteractionReply::Respond(response) => (StatusCode::OK, Json(response)).into_response(),
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}
