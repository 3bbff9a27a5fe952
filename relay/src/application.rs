use actix::*;
use actix_web::{dev::Server, web, App, HttpServer};
use std::net::TcpListener;
use tracing::info;

use crate::settings::{RelaySettings, Settings};

use self::relay::Relay;

mod calls;
mod client;
mod dispatch;
pub mod error;
mod presence;
pub mod relay;
mod services;
use services::{connect, health_check, not_found};

pub use calls::{CallTracker, Ring};
pub use dispatch::{route, Route};
pub use presence::PresenceRegistry;

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(configuration: Settings) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(&address)?;
        let port = listener.local_addr()?.port();
        info!("Running on port: {port}");

        let server = create_server(listener, configuration.relay)?;
        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn create_server(
    listener: TcpListener,
    settings: RelaySettings,
) -> Result<Server, anyhow::Error> {
    let relay = web::Data::new(Relay::new(&settings).start());
    let settings = web::Data::new(settings);
    Ok(HttpServer::new(move || {
        App::new()
            .app_data(relay.clone())
            .app_data(settings.clone())
            .service(health_check)
            .service(connect)
            .default_service(web::to(not_found))
    })
    .listen(listener)?
    .run())
}
