//! WebSocket delivery of alerts raised through the HTTP pipeline.

#[path = "support/mod.rs"]
mod support;

use std::time::Duration;

use actix_web::http::header;
use actix_web::{App, HttpServer, web};
use awc::ws::{Frame, Message};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use support::HIGH_RISK_INPUT;
use url::Url;
use vitalwatch::inbound::http::configure;
use vitalwatch::inbound::http::health::HealthState;
use vitalwatch::inbound::ws;
use vitalwatch::inbound::ws::state::WsState;
use vitalwatch::outbound::realtime::AlertHub;

const ORIGIN: &str = "http://localhost:5173";

type Socket = actix_codec::Framed<awc::BoxedSocket, awc::ws::Codec>;

fn start_server() -> (String, actix_web::dev::Server) {
    let hub = AlertHub::new();
    let http_state = web::Data::new(support::in_memory_state(&hub));
    let ws_state = web::Data::new(WsState::new(
        hub,
        &[Url::parse(ORIGIN).expect("origin url")],
    ));
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    let server = HttpServer::new(move || {
        App::new()
            .app_data(http_state.clone())
            .app_data(ws_state.clone())
            .app_data(web::Data::new(HealthState::new()))
            .configure(configure)
            .service(ws::ws_entry)
    })
    .listen(listener)
    .expect("listen")
    .disable_signals()
    .workers(1)
    .run();
    (format!("http://{addr}"), server)
}

async fn next_json(socket: &mut Socket) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("frame before timeout")
            .expect("open socket")
            .expect("valid frame");
        match frame {
            Frame::Text(bytes) => return serde_json::from_slice(&bytes).expect("json frame"),
            Frame::Ping(_) | Frame::Pong(_) => {}
            other => panic!("expected text frame, got {other:?}"),
        }
    }
}

async fn post_json(client: &awc::Client, url: String, body: Value) -> Value {
    client
        .post(url)
        .send_json(&body)
        .await
        .expect("request")
        .json::<Value>()
        .await
        .expect("json body")
}

#[actix_web::test]
async fn joined_doctor_receives_alert_raised_by_prediction() {
    let (base, server) = start_server();
    let handle = server.handle();
    actix_web::rt::spawn(server);
    let client = awc::Client::default();

    let doctor = post_json(
        &client,
        format!("{base}/register"),
        json!({
            "name": "Cara",
            "email": "cara@clinic.example",
            "password": "correct horse",
            "role": "doctor",
            "symptoms": ["Hypertension"],
        }),
    )
    .await;
    let doctor_id = doctor["data"]["id"].as_str().expect("doctor id").to_owned();

    let (_resp, mut socket) = client
        .ws(format!("{base}/ws"))
        .set_header(header::ORIGIN, ORIGIN)
        .connect()
        .await
        .expect("websocket connect");
    socket
        .send(Message::Text(
            json!({ "event": "join", "data": { "doctorId": doctor_id } })
                .to_string()
                .into(),
        ))
        .await
        .expect("send join");
    let ack = next_json(&mut socket).await;
    assert_eq!(ack["event"], "joined");
    assert_eq!(ack["data"]["doctorId"], doctor_id.as_str());

    let prediction = post_json(
        &client,
        format!("{base}/api/predict"),
        json!({ "input": HIGH_RISK_INPUT, "symptoms": "Hypertension" }),
    )
    .await;
    assert_eq!(prediction["alertsCreated"], 1);

    let pushed = next_json(&mut socket).await;
    assert_eq!(pushed["event"], "alert");
    assert_eq!(pushed["data"]["doctorId"], doctor_id.as_str());
    assert_eq!(pushed["data"]["prediction"], 1);

    handle.stop(true).await;
}
