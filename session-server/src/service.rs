//! Utilities for services building

use actix_web::web::{Data, ServiceConfig};
use actix_web::{HttpMessage, HttpRequest, HttpResponse, delete, get, middleware, web};
use session_core::Session;
use tracing::warn;


mod session;

use crate::model::Model;

/// Returns the public view of the current session
#[get("/session")]
async fn current_session(req: HttpRequest) -> HttpResponse {
    match req.extensions().get::<Session>() {
        Some(session) => HttpResponse::Ok().json(session.view()),
        None => session::not_authenticated(),
    }
}

/// Closes current session
#[delete("/session")]
async fn expire_session(req: HttpRequest, model: Data<Model>) -> HttpResponse {
    let Some(session) = req.extensions_mut().remove::<Session>() else {
        return session::not_authenticated();
    };

    match model.sessions().revoke_session(&session.id).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => {
            warn!(error = %err, session_id = %session.id, "Cannot close session");
            session::service_unavailable()
        }
    }
}

/// Returns configuration function for the ActixWeb services
pub fn configure(context: Model) -> impl Fn(&mut web::ServiceConfig) + Clone {
    move |cfg: &mut ServiceConfig| {
        let session_aware = web::scope("")
            .wrap(middleware::from_fn(session::middleware))
            .service(current_session)
            .service(expire_session);

        cfg.app_data(Data::new(context.clone()))
            .service(session_aware);
    }
}
