//! Session management

use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::Next;
use actix_web::web::Data;
use actix_web::{Error, HttpMessage, HttpResponse};
use serde_json::json;
use session_core::Category;

use crate::model::Model;

/// `Authorization` header scheme for session tokens
const SESSION_SCHEME: &str = "Session";

/// Response for any rejected token
///
/// The rejection reason is never exposed, so the response can't be used as an oracle.
pub fn not_authenticated() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "error": "not_authenticated" }))
}

/// Response for infrastructure failures, the client may retry
pub fn service_unavailable() -> HttpResponse {
    HttpResponse::ServiceUnavailable().json(json!({ "error": "service_unavailable" }))
}

/// Authenticates requests carrying `Authorization: Session {token}`
///
/// On success the `Session` is attached to the request extensions. Requests without the header
/// pass through unauthenticated.
pub async fn middleware<B>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, Error>
where
    B: MessageBody + 'static,
{
    let Some(auth_header) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(next.call(req).await?.map_into_left_body());
    };

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|header| header.split_once(' '))
        .and_then(|(scheme, token)| (scheme == SESSION_SCHEME).then_some(token));

    let Some(token) = token else {
        return Ok(req.into_response(not_authenticated()).map_into_right_body());
    };

    let Some(model) = req.app_data::<Data<Model>>().cloned() else {
        return Ok(req.into_response(service_unavailable()).map_into_right_body());
    };

    match model.sessions().validate_token(token).await {
        Ok(session) => {
            req.extensions_mut().insert(session);
            Ok(next.call(req).await?.map_into_left_body())
        }
        Err(err) => {
            let response = match err.category() {
                Category::Unauthenticated => not_authenticated(),
                Category::Unavailable => service_unavailable(),
            };
            Ok(req.into_response(response).map_into_right_body())
        }
    }
}
