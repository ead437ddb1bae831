use std::sync::Arc;
use std::time::{Duration, Instant};

use actix::prelude::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::snapshot::BoutSnapshot;
use crate::state::app_state::AppState;
use crate::ws::hub::WsRegistry;
use crate::ws::protocol::{Outbound, ServerMsg};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(40);

pub async fn upgrade(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    // Snapshot fetched before the upgrade so the session can render
    // immediately without waiting for the next mutation.
    let snapshot = app_state.controller.snapshot().await;
    let session = SpectatorSession::new(app_state.registry.clone(), snapshot);
    ws::start(session, &req, stream)
}

/// One connected spectator. Push-only: inbound frames other than pings are
/// ignored. Receives copies of state, never owns it.
pub struct SpectatorSession {
    conn_id: Option<Uuid>,
    registry: Arc<WsRegistry>,
    initial_snapshot: BoutSnapshot,
    last_heartbeat: Instant,
}

impl SpectatorSession {
    fn new(registry: Arc<WsRegistry>, initial_snapshot: BoutSnapshot) -> Self {
        Self {
            conn_id: None,
            registry,
            initial_snapshot,
            last_heartbeat: Instant::now(),
        }
    }

    fn send_json(ctx: &mut ws::WebsocketContext<Self>, msg: &ServerMsg) {
        match serde_json::to_string(msg) {
            Ok(payload) => ctx.text(payload),
            Err(err) => warn!(error = %err, "[WS SESSION] failed to serialize outbound message"),
        }
    }

    fn start_heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |actor, ctx| {
            if Instant::now().duration_since(actor.last_heartbeat) > CLIENT_TIMEOUT {
                warn!(conn_id = ?actor.conn_id, "[WS SESSION] heartbeat timed out");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Normal)));
                ctx.stop();
                return;
            }
            ctx.ping(b"keepalive");
        });
    }
}

impl Actor for SpectatorSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let recipient = ctx.address().recipient::<Outbound>();
        let conn_id = self.registry.register(recipient);
        self.conn_id = Some(conn_id);
        info!(%conn_id, "[WS SESSION] spectator connected");

        Self::send_json(
            ctx,
            &ServerMsg::BoutState {
                snapshot: self.initial_snapshot.clone(),
            },
        );
        self.registry.broadcast_viewer_count();
        self.start_heartbeat(ctx);
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        if let Some(conn_id) = self.conn_id.take() {
            self.registry.unregister(conn_id);
            self.registry.broadcast_viewer_count();
            info!(%conn_id, "[WS SESSION] spectator disconnected");
        }
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for SpectatorSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(payload)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&payload);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            // Spectators have nothing to say; tolerate chatter silently.
            Ok(ws::Message::Text(_)) | Ok(ws::Message::Binary(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {
                self.last_heartbeat = Instant::now();
            }
            Err(err) => {
                warn!(conn_id = ?self.conn_id, error = %err, "[WS SESSION] protocol error");
                ctx.close(Some(ws::CloseReason::from(ws::CloseCode::Error)));
                ctx.stop();
            }
        }
    }
}

impl Handler<Outbound> for SpectatorSession {
    type Result = ();

    fn handle(&mut self, msg: Outbound, ctx: &mut Self::Context) -> Self::Result {
        Self::send_json(ctx, &msg.0);
    }
}
