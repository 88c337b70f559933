use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{ConsultancyService, ContactInquiry};
use super::service::{ContactError, ContactService, CONTACT_SUCCESS_MESSAGE};
use crate::relay::EmailSender;

pub fn contact_router<E>(service: Arc<ContactService<E>>) -> Router
where
    E: EmailSender + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/contact", post(submit_handler::<E>))
        .route("/api/v1/contact/services", get(services_handler))
        .with_state(service)
}

pub(crate) async fn submit_handler<E>(
    State(service): State<Arc<ContactService<E>>>,
    Json(inquiry): Json<ContactInquiry>,
) -> Response
where
    E: EmailSender + ?Sized + 'static,
{
    match service.submit(inquiry).await {
        Ok(_) => {
            let payload = json!({ "message": CONTACT_SUCCESS_MESSAGE });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(ContactError::Invalid(errors)) => {
            let payload = json!({ "errors": errors });
            (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
        }
        Err(err @ ContactError::Dispatch(_)) => {
            let payload = json!({ "error": err.user_message() });
            (StatusCode::BAD_GATEWAY, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn services_handler() -> Json<serde_json::Value> {
    let services: Vec<_> = ConsultancyService::ALL
        .into_iter()
        .map(|service| json!({ "value": service.value(), "label": service.label() }))
        .collect();
    Json(json!({ "services": services }))
}
