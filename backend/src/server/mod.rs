//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, MlSettings, ServerConfig};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use vitalwatch::Trace;
#[cfg(debug_assertions)]
use vitalwatch::doc::ApiDoc;
use vitalwatch::inbound::http::configure;
use vitalwatch::inbound::http::health::HealthState;
use vitalwatch::inbound::http::state::HttpState;
use vitalwatch::inbound::ws;
use vitalwatch::inbound::ws::state::WsState;
use vitalwatch::outbound::realtime::AlertHub;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .wrap(Trace)
        .configure(configure)
        .service(ws::ws_entry);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Returns [`std::io::Error`] when adapters cannot be built or the socket
/// cannot be bound.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let hub = AlertHub::new();
    let http_state = web::Data::new(
        build_http_state(&config, &hub).map_err(|err| std::io::Error::other(err.to_string()))?,
    );
    let ws_state = web::Data::new(WsState::new(hub, &config.allowed_origins));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
