// Copyright (c) 2023 xmpp-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The session state machine: parses `session-initiate`, emits
//! `session-accept`, handles and emits `session-terminate`, and
//! structurally acknowledges the Jingle actions this core doesn't act on.

use jid::Jid;
use minidom::Element;

use crate::dispatch::{Collaborators, Core};
use crate::model::{self, ContentState, SessionState};
use crate::stanza::envelope;
use crate::stanza::jingle::{
    self, build_content, Action, ContentFields, Jingle, ReasonElement, SessionId,
};
use crate::stanza::jingle_ft;
use crate::stanza::jingle_ibb;

/// Entry point for any inbound `iq` carrying a `jingle` child.
pub fn handle_jingle(core: &mut Core, collab: &mut Collaborators, from: &Jid, id: &str, elem: Element) {
    let jingle = match Jingle::try_from(elem) {
        Ok(j) => j,
        Err(e) => {
            log::debug!("dropping malformed jingle envelope from {}: {}", from, e);
            return;
        }
    };
    match jingle.action {
        Action::SessionInitiate => handle_session_initiate(core, collab, from, id, jingle),
        Action::SessionTerminate => handle_session_terminate(core, collab, from, id, jingle),
        _ => {
            // session-info, session-accept (we're never the initiator of
            // an outbound offer), and the transport-* actions are
            // acknowledged structurally but not otherwise processed.
            collab.xmpp.send(envelope::ack(id, from));
        }
    }
}

fn handle_session_initiate(
    core: &mut Core,
    collab: &mut Collaborators,
    from: &Jid,
    id: &str,
    jingle: Jingle,
) {
    let initiator = match &jingle.initiator {
        Some(i) => i,
        None => {
            log::debug!("session-initiate from {} missing initiator, dropping", from);
            return;
        }
    };
    if initiator != from {
        log::debug!(
            "session-initiate from {} claims initiator {}, dropping",
            from,
            initiator
        );
        return;
    }

    collab.xmpp.send(envelope::ack(id, from));

    if jingle.content_elements.is_empty() {
        emit_terminate_to(collab, from, &jingle.sid, "cancel");
        return;
    }

    let mut session = model::Session::new(jingle.sid.clone(), from.clone());
    for raw in jingle.content_elements {
        match accept_content(raw) {
            Some(content) => {
                if session.contents.contains_key(&content.name) {
                    log::warn!(
                        "rejecting duplicate content '{}' in session {}",
                        content.name,
                        jingle.sid
                    );
                    continue;
                }
                session.contents.insert(content.name.clone(), content);
            }
            None => continue,
        }
    }

    if session.contents.is_empty() {
        emit_terminate_to(collab, from, &jingle.sid, "cancel");
        return;
    }

    session.state = SessionState::Accepted;
    let accept = build_session_accept(&core.config.local_jid, &session);
    let request_id = collab.ids.new_id();
    collab
        .xmpp
        .send(envelope::set(&request_id, from, accept.into()));
    core.sessions.insert(session);
}

/// Parses one raw `content` element into a domain [`model::Content`],
/// skipping (with a warning) anything this core doesn't understand. A
/// `None` result means the content is silently dropped from the session.
fn accept_content(raw: Element) -> Option<model::Content> {
    let fields = match ContentFields::try_from(raw) {
        Ok(f) => f,
        Err(e) => {
            log::warn!("skipping unparseable content: {}", e);
            return None;
        }
    };
    let creator = match fields.creator() {
        Some(c) => c,
        None => {
            log::warn!("skipping content '{}' with unrecognised creator", fields.name);
            return None;
        }
    };
    let description = match fields.description {
        Some(jingle::Description::FileTransfer(d)) => d,
        Some(jingle::Description::Other(_)) | None => {
            log::warn!(
                "skipping content '{}' without a file-transfer description",
                fields.name
            );
            return None;
        }
    };
    let transport = match fields.transport {
        Some(jingle::Transport::InBandBytestream(t)) => t,
        Some(jingle::Transport::Other(_)) | None => {
            log::warn!(
                "skipping content '{}' without an in-band-bytestream transport",
                fields.name
            );
            return None;
        }
    };
    let jingle_ft::File { media_type, name, date, size, hash } = description.file;
    let size = match size {
        Some(size) => size,
        None => {
            log::warn!("skipping content '{}' with no file size", fields.name);
            return None;
        }
    };

    Some(model::Content {
        name: fields.name,
        creator,
        senders: fields.senders,
        file: model::FileInfo { name, media_type, date, size, hash },
        transport: model::InBandTransport {
            sid: transport.sid,
            block_size: transport.block_size,
        },
        state: ContentState::Pending,
    })
}

fn build_session_accept(local_jid: &Jid, session: &model::Session) -> Jingle {
    let mut jingle = Jingle::new(Action::SessionAccept, session.sid.clone())
        .with_responder(local_jid.clone());
    for content in session.contents.values() {
        let file = jingle_ft::File {
            media_type: content.file.media_type.clone(),
            name: content.file.name.clone(),
            date: content.file.date.clone(),
            size: Some(content.file.size),
            hash: content.file.hash.clone(),
        };
        let description: Element = jingle_ft::Description { file }.into();
        let transport: Element = jingle_ibb::Transport {
            block_size: content.transport.block_size,
            sid: content.transport.sid.clone(),
        }
        .into();
        jingle = jingle.add_content_element(build_content(
            content.creator,
            content.senders,
            &content.name,
            description,
            transport,
        ));
    }
    jingle
}

fn handle_session_terminate(
    core: &mut Core,
    collab: &mut Collaborators,
    from: &Jid,
    id: &str,
    jingle: Jingle,
) {
    match core.sessions.remove(&jingle.sid) {
        Some(_) => {
            core.transfers.remove_session(&jingle.sid);
            collab.xmpp.send(envelope::ack(id, from));
            collab
                .ui
                .info(&format!("session {} terminated by peer", jingle.sid));
        }
        None => {
            // Idempotence: a second session-terminate for an already-gone
            // sid is a no-op, not even an ack.
        }
    }
}

/// Emits `session-terminate` for `sid` and drops it from the registry, if
/// present. Used both for the cross-layer "all contents finished" path
/// and for the session layer's own local-initiated terminations.
pub fn emit_terminate(core: &mut Core, collab: &mut Collaborators, sid: &SessionId, reason: &str) {
    let Some(session) = core.sessions.get(sid) else {
        return;
    };
    let to = session.initiator.clone();
    emit_terminate_to(collab, &to, sid, reason);
    core.sessions.remove(sid);
    core.transfers.remove_session(sid);
}

fn emit_terminate_to(collab: &mut Collaborators, to: &Jid, sid: &SessionId, reason: &str) {
    let jingle = Jingle::new(Action::SessionTerminate, sid.clone())
        .with_reason(ReasonElement::new(reason));
    let request_id = collab.ids.new_id();
    collab.xmpp.send(envelope::set(&request_id, to, jingle.into()));
}
