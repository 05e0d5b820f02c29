//! Per-connection protocol handling.
//!
//! Each connection starts in the login phase, where every inbound line
//! is a candidate display name. After login, lines starting with `/`
//! go to the command dispatcher and everything else is chat for the
//! session's current channel. All outgoing traffic funnels through an
//! unbounded queue drained by a writer task, so nothing blocks while
//! the shared state lock is held.

use std::net::SocketAddr;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::chat::{command, ChatState, Outbox, Outgoing, SharedState};

const BANNER: &str = "Welcome to DIE: Denizens of the Internet Effusing";
const LOGIN_PROMPT: &str = "Login name?";
const NO_ROOM_REBUKE: &str =
    "\tLike nuclear ash,\n\tyour words fall but on blind eyes.\n\tTry joining a room.";

/// Drive one client connection from greeting to disconnect.
pub async fn handle_connection(stream: TcpStream, addr: SocketAddr, state: SharedState) {
    let (read_half, mut write_half) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Outgoing>();

    let writer = tokio::spawn(async move {
        while let Some(out) = rx.recv().await {
            match out {
                Outgoing::Line(line) => {
                    if write_half.write_all(line.as_bytes()).await.is_err() {
                        break;
                    }
                    if write_half.write_all(b"\r\n").await.is_err() {
                        break;
                    }
                }
                Outgoing::Close => break,
            }
        }
        let _ = write_half.shutdown().await;
    });

    debug!("connection from {}", addr);
    let _ = tx.send(Outgoing::Line(BANNER.to_string()));
    let _ = tx.send(Outgoing::Line(LOGIN_PROMPT.to_string()));

    let mut lines = BufReader::new(read_half).lines();
    let mut me: Option<String> = None;

    loop {
        let next = tokio::select! {
            line = lines.next_line() => line,
            // `/quit` closed the outgoing queue; stop reading too.
            _ = tx.closed() => break,
        };
        let Ok(Some(raw)) = next else {
            break;
        };
        let line = raw.trim_end_matches('\r');

        let mut chat = state.lock().await;
        match &me {
            None => {
                if let Some(name) = try_login(&mut chat, line, &tx) {
                    info!(user = %name, "logged in from {}", addr);
                    me = Some(name);
                }
            }
            Some(name) => {
                if let Some(cmd) = line.strip_prefix('/') {
                    command::dispatch(&mut chat, name, cmd);
                } else {
                    handle_chat(&mut chat, name, line);
                }
            }
        }
    }

    if let Some(name) = me {
        state.lock().await.disconnect_cleanup(&name);
        info!(user = %name, "disconnected ({})", addr);
    } else {
        debug!("connection {} closed before login", addr);
    }
    drop(tx);
    let _ = writer.await;
}

/// Handle one line in the login phase.
///
/// Returns the accepted name, or None (with an advisory line queued)
/// when the name is taken or not purely alphanumeric.
fn try_login(state: &mut ChatState, name: &str, outbox: &Outbox) -> Option<String> {
    if state.users.contains_key(name) {
        let _ = outbox.send(Outgoing::Line("Sorry, name taken.".to_string()));
        return None;
    }
    if !valid_name(name) {
        let _ = outbox.send(Outgoing::Line(
            "Please use alphanumeric characters only.".to_string(),
        ));
        return None;
    }
    let _ = outbox.send(Outgoing::Line(format!("Welcome {name}!")));
    state.register_user(name, outbox.clone());
    Some(name.to_string())
}

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(char::is_alphanumeric)
}

/// Handle a non-command line: broadcast to the current channel, or
/// rebuke the unfocused.
fn handle_chat(state: &mut ChatState, name: &str, message: &str) {
    let current = state.users.get(name).and_then(|u| u.current.clone());
    match current {
        None => state.write_to(name, NO_ROOM_REBUKE),
        Some(channel_name) => {
            if let Some(channel) = state.channels.get(&channel_name) {
                channel.chat(name, message, &state.users);
            }
        }
    }
}
