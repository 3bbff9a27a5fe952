use actix::*;
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use signaling::message::UserId;

use super::{client, error::NotFound, relay::Relay};
use crate::settings::RelaySettings;

#[get("/health_check")]
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}

#[derive(Debug, serde::Deserialize)]
pub struct ConnectQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

/// Opens a signaling connection.
///
/// The `userId` query parameter is trusted as given. Without it (or with an
/// empty one) the connection is anonymous and nobody can call it.
#[get("/ws")]
async fn connect(
    req: HttpRequest,
    query: web::Query<ConnectQuery>,
    stream: web::Payload,
    relay: web::Data<Addr<Relay>>,
    settings: web::Data<RelaySettings>,
) -> Result<HttpResponse, Error> {
    let user_id = query
        .into_inner()
        .user_id
        .filter(|id| !id.is_empty())
        .map(UserId::from);
    let websocket = client::WsClient::new(user_id, relay.get_ref().clone(), &settings);
    client::start(websocket, &req, stream)
}

pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, NotFound> {
    let path = req
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_else(|| req.path());
    Err(NotFound::new(path))
}
