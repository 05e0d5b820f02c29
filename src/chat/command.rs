//! Slash-command dispatch.
//!
//! One process-wide table maps each verb to a handler, an ordered
//! parameter signature, and a help line. A signature's last parameter
//! may be greedy, soaking up the remainder of the line as a single
//! space-joined argument. Handlers are free functions over the shared
//! state and the issuing user's name; they report back exclusively by
//! writing lines to users or channels.

use tracing::debug;

use super::state::ChatState;

const INVALID_COMMAND: &str = "Invalid command. To see a list of commands, type \"/commands\". \
                               For command-specific help, type \"/help <command>\"";

/// A formal parameter in a command signature.
#[derive(Debug, Clone, Copy)]
pub struct Param {
    /// Parameter name, for documentation.
    pub name: &'static str,
    /// Greedy parameters consume all remaining tokens. Only valid in
    /// the last position.
    pub greedy: bool,
}

const fn p(name: &'static str) -> Param {
    Param {
        name,
        greedy: false,
    }
}

const fn greedy(name: &'static str) -> Param {
    Param { name, greedy: true }
}

/// A command handler: shared state, issuing user's name, resolved args.
pub type Handler = fn(&mut ChatState, &str, &[String]);

/// One entry of the command table.
pub struct CommandSpec {
    /// The verb, matched case-sensitively.
    pub verb: &'static str,
    /// Handler function.
    pub handler: Handler,
    /// Ordered parameter signature.
    pub params: &'static [Param],
    /// Help text shown by `/help <verb>`.
    pub help: &'static str,
}

/// The command table. Table order is the order `/commands` reports.
pub const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        verb: "commands",
        handler: cmd_commands,
        params: &[],
        help: "See all documented commands.",
    },
    CommandSpec {
        verb: "help",
        handler: cmd_help,
        params: &[p("cmd")],
        help: "Get information on a given command",
    },
    CommandSpec {
        verb: "msg",
        handler: cmd_msg,
        params: &[p("user"), greedy("message")],
        help: "Send a private message.",
    },
    CommandSpec {
        verb: "part",
        handler: cmd_part,
        params: &[greedy("message")],
        help: "Leave the current room, or a specified room.",
    },
    CommandSpec {
        verb: "join",
        handler: cmd_join,
        params: &[p("channel"), greedy("topic")],
        help: "Join a room, or create a new one if it doesn't already exist.",
    },
    CommandSpec {
        verb: "quit",
        handler: cmd_quit,
        params: &[greedy("message")],
        help: "Leave the server.",
    },
    CommandSpec {
        verb: "rooms",
        handler: cmd_rooms,
        params: &[],
        help: "See a list of active rooms",
    },
    CommandSpec {
        verb: "switch",
        handler: cmd_switch,
        params: &[p("channel")],
        help: "Switch to another room. You will remain in both rooms, but only see \
               messages from the current room.",
    },
    CommandSpec {
        verb: "topic",
        handler: cmd_topic,
        params: &[greedy("topic")],
        help: "Set a new topic for the current room. Note that you must be a channel \
               operator to do this.",
    },
    CommandSpec {
        verb: "toggleprivate",
        handler: cmd_toggleprivate,
        params: &[p("channel")],
        help: "Toggle the private setting on a channel. The current channel is \
               affected by default.",
    },
    CommandSpec {
        verb: "toggleop",
        handler: cmd_toggleop,
        params: &[p("other"), p("channel")],
        help: "Toggle operator powers on another user for a given channel. Default \
               is the current channel.",
    },
    CommandSpec {
        verb: "invite",
        handler: cmd_invite,
        params: &[p("other"), p("channel")],
        help: "Invite a user to a channel. Defaults to the current channel. If the \
               channel is private, you must be an op.",
    },
    CommandSpec {
        verb: "protect",
        handler: cmd_protect,
        params: &[p("channel")],
        help: "Protect a channel with a (pseudo)random token. Any user without the \
               token will not be able to join.",
    },
    CommandSpec {
        verb: "unprotect",
        handler: cmd_unprotect,
        params: &[p("channel")],
        help: "Clear the protection on a channel. Default this channel.",
    },
];

/// Look up a verb in the command table, case-sensitively.
pub fn lookup(verb: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.verb == verb)
}

/// Parse and execute one command line (leading slash already stripped).
pub fn dispatch(state: &mut ChatState, name: &str, line: &str) {
    let mut tokens: Vec<&str> = line.split_whitespace().collect();
    let verb = if tokens.is_empty() { "" } else { tokens.remove(0) };

    let Some(spec) = lookup(verb) else {
        state.write_to(name, INVALID_COMMAND);
        return;
    };
    debug!(user = name, verb, "command");

    // A verb with no arguments still gets one empty-string placeholder.
    if tokens.is_empty() {
        tokens.push("");
    }
    let args = resolve_args(spec.params, &tokens);
    (spec.handler)(state, name, &args);
}

/// Walk the signature left to right, one token per non-greedy parameter;
/// a greedy parameter space-joins everything left. Missing tokens are
/// simply absent, degrading to empty strings in the handlers.
fn resolve_args(params: &[Param], tokens: &[&str]) -> Vec<String> {
    let mut args = Vec::with_capacity(params.len());
    let mut rest = tokens;
    for param in params {
        if param.greedy {
            args.push(rest.join(" "));
            break;
        }
        match rest.split_first() {
            Some((first, tail)) => {
                args.push((*first).to_string());
                rest = tail;
            }
            None => break,
        }
    }
    args
}

fn arg<'a>(args: &'a [String], index: usize) -> &'a str {
    args.get(index).map(String::as_str).unwrap_or("")
}

/// Resolve a channel argument: empty means the issuer's current channel,
/// anything else must name an existing channel.
fn target_channel(state: &ChatState, name: &str, channel_arg: &str) -> Option<String> {
    if channel_arg.is_empty() {
        state.users.get(name).and_then(|u| u.current.clone())
    } else if state.channels.contains_key(channel_arg) {
        Some(channel_arg.to_string())
    } else {
        None
    }
}

fn cmd_commands(state: &mut ChatState, name: &str, _args: &[String]) {
    let verbs: Vec<String> = COMMANDS.iter().map(|c| c.verb.to_uppercase()).collect();
    state.write_to(name, verbs.join(" "));
}

fn cmd_help(state: &mut ChatState, name: &str, args: &[String]) {
    let cmd = arg(args, 0);
    match lookup(cmd) {
        None => dispatch(state, name, "commands"),
        Some(spec) => {
            state.write_to(name, cmd);
            state.write_to(name, spec.help);
        }
    }
}

fn cmd_msg(state: &mut ChatState, name: &str, args: &[String]) {
    let you = arg(args, 0);
    let message = arg(args, 1);
    if !state.users.contains_key(you) {
        state.write_to(name, "No such person.");
    } else {
        state.write_to(you, format!("{name} says, \"{message}\""));
    }
}

fn cmd_part(state: &mut ChatState, name: &str, args: &[String]) {
    let message = arg(args, 0);
    let Some(current) = state.users.get(name).and_then(|u| u.current.clone()) else {
        state.write_to(name, "You are not in a room.");
        return;
    };
    if let Some(channel) = state.channels.get_mut(&current) {
        channel.part(name, message, &state.users);
    }
    if let Some(user) = state.users.get_mut(name) {
        if let Some(pos) = user.channels.iter().position(|c| c == &current) {
            user.channels.remove(pos);
        }
        user.current = user.channels.last().cloned();
    }
}

fn cmd_join(state: &mut ChatState, name: &str, args: &[String]) {
    let channel_name = arg(args, 0);
    let topic = arg(args, 1);

    state.get_or_create_channel(channel_name, name, topic);
    state.write_to(name, format!("entering room: {channel_name}"));

    let joined = match (
        state.channels.get_mut(channel_name),
        state.users.get_mut(name),
    ) {
        (Some(channel), Some(user)) => channel.join(user),
        _ => false,
    };

    if joined {
        if let Some(user) = state.users.get_mut(name) {
            user.channels.push(channel_name.to_string());
            user.current = Some(channel_name.to_string());
        }
        let members = state
            .channels
            .get(channel_name)
            .map(|c| c.users.clone())
            .unwrap_or_default();
        for other in members {
            let mut line = format!("* {other}");
            if other == name {
                line.push_str(" (** this is you)");
            }
            state.write_to(name, line);
        }
        state.write_to(name, "end of list");
    } else {
        state.write_to(name, format!("Failed to enter {channel_name}"));
    }
}

fn cmd_quit(state: &mut ChatState, name: &str, args: &[String]) {
    let message = arg(args, 0);
    state.remove_from_all_channels(name, message);
    state.write_to(name, "BYE");
    if let Some(user) = state.users.get(name) {
        user.close();
    }
}

fn cmd_rooms(state: &mut ChatState, name: &str, _args: &[String]) {
    let rooms = state.public_channels();
    if rooms.is_empty() {
        state.write_to(name, "No active rooms.");
        return;
    }
    state.write_to(name, "Active rooms are:");
    for (room, members) in rooms {
        state.write_to(name, format!("* {room} ({members})"));
    }
    state.write_to(name, "end of list.");
}

fn cmd_switch(state: &mut ChatState, name: &str, args: &[String]) {
    let channel = arg(args, 0);
    let joined = state
        .users
        .get(name)
        .map(|u| u.has_joined(channel))
        .unwrap_or(false);
    if joined {
        if let Some(user) = state.users.get_mut(name) {
            user.current = Some(channel.to_string());
        }
        return;
    }
    // Not joined yet: switching is joining.
    cmd_join(state, name, &[channel.to_string()]);
}

fn cmd_topic(state: &mut ChatState, name: &str, args: &[String]) {
    let topic = arg(args, 0);
    let Some(current) = state.users.get(name).and_then(|u| u.current.clone()) else {
        return;
    };
    let set = match state.channels.get_mut(&current) {
        Some(channel) if channel.is_op(name) => {
            channel.topic = topic.to_string();
            true
        }
        _ => false,
    };
    if set {
        state.write_to(name, "Topic set.");
    }
}

fn cmd_toggleprivate(state: &mut ChatState, name: &str, args: &[String]) {
    let Some(target) = target_channel(state, name, arg(args, 0)) else {
        return;
    };
    let now_private = {
        let Some(channel) = state.channels.get_mut(&target) else {
            return;
        };
        if !channel.is_op(name) {
            return;
        }
        channel.private = !channel.private;
        channel.private
    };
    if now_private {
        state.private_count += 1;
        state.write_to(name, format!("{target} is now private."));
    } else {
        state.private_count -= 1;
        state.write_to(name, format!("{target} is no longer private."));
    }
}

fn cmd_toggleop(state: &mut ChatState, name: &str, args: &[String]) {
    let other = arg(args, 0);
    let channel_arg = arg(args, 1);

    if !state.users.contains_key(other) {
        state.write_to(name, "No such person.");
        return;
    }
    if other == name {
        return;
    }
    let target = if channel_arg.is_empty() {
        match state.users.get(name).and_then(|u| u.current.clone()) {
            Some(current) => current,
            None => {
                state.write_to(name, "Join a channel first.");
                return;
            }
        }
    } else {
        if !state.channels.contains_key(channel_arg) {
            return;
        }
        channel_arg.to_string()
    };

    let granted = {
        let Some(channel) = state.channels.get_mut(&target) else {
            return;
        };
        if !channel.is_op(name) {
            return;
        }
        if channel.is_op(other) {
            channel.ops.retain(|o| o != other);
            false
        } else {
            channel.ops.push(other.to_string());
            true
        }
    };
    if granted {
        state.write_to(name, format!("Op status granted for {other}"));
        state.write_to(other, format!("You have been given op status for {target}"));
    } else {
        state.write_to(name, format!("Op status removed from {other}"));
        state.write_to(
            other,
            format!("Your op status for {target} has been revoked."),
        );
    }
}

fn cmd_invite(state: &mut ChatState, name: &str, args: &[String]) {
    let other = arg(args, 0);
    let channel_arg = arg(args, 1);

    if !state.users.contains_key(other) {
        state.write_to(name, "No such person.");
        return;
    }
    let Some(target) = target_channel(state, name, channel_arg) else {
        return;
    };
    let Some((private, is_op, token)) = state
        .channels
        .get(&target)
        .map(|c| (c.private, c.is_op(name), c.token.clone()))
    else {
        return;
    };
    if private && !is_op {
        state.write_to(
            name,
            "You aren't qualified to do that. Ask an op to invite your little friend.",
        );
        return;
    }
    state.write_to(
        other,
        format!(
            "{name} has invited you to join {target}. \
             If you want to accept, type '/join {target}'"
        ),
    );
    // Seeding the token cache is what actually grants entry to a
    // protected channel; an empty token is seeded all the same.
    if let Some(user) = state.users.get_mut(other) {
        user.tokens.insert(target.clone(), token);
    }
}

fn cmd_protect(state: &mut ChatState, name: &str, args: &[String]) {
    let Some(target) = target_channel(state, name, arg(args, 0)) else {
        return;
    };
    let rotated = match state.channels.get_mut(&target) {
        Some(channel) if channel.is_op(name) => {
            channel.token = rand::random::<u128>().to_string();
            Some((channel.ops.clone(), channel.token.clone()))
        }
        _ => None,
    };
    let Some((ops, token)) = rotated else {
        return;
    };
    for op in ops {
        if let Some(user) = state.users.get_mut(&op) {
            user.tokens.insert(target.clone(), token.clone());
        }
    }
    state.write_to(name, format!("Okay, {target} is now protected."));
}

fn cmd_unprotect(state: &mut ChatState, name: &str, args: &[String]) {
    let Some(target) = target_channel(state, name, arg(args, 0)) else {
        return;
    };
    let cleared = match state.channels.get_mut(&target) {
        Some(channel) if channel.is_op(name) => {
            channel.token.clear();
            true
        }
        _ => false,
    };
    if cleared {
        state.write_to(name, format!("Removed protection from {target}"));
    }
}
