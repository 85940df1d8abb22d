// Copyright (c) 2023 xmpp-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The top-level entry point: classifies an inbound envelope and routes it
//! to the session or transfer state machine, and carries the cross-layer
//! glue between them. Grounded on `xmpp/src/event_loop.rs`'s classify-then-
//! route shape, adapted from an async event loop to a single synchronous
//! call the embedder drives.

use jid::Jid;
use minidom::Element;

use crate::collab::{Downloads, IdSource, Ui, XmppSink};
use crate::config::Config;
use crate::model::ContentState;
use crate::ns;
use crate::registry::{SessionRegistry, TransferRegistry};
use crate::session;
use crate::stanza::jingle_message::JingleMessage;
use crate::stanza::jingle::SessionId;
use crate::transfer;

/// Bundles the collaborators a single dispatch call needs. Held as
/// separate borrows rather than one boxed struct so tests can pass plain
/// in-memory doubles without an extra allocation.
pub struct Collaborators<'a> {
    pub xmpp: &'a mut dyn XmppSink,
    pub ids: &'a mut dyn IdSource,
    pub downloads: &'a dyn Downloads,
    pub ui: &'a mut dyn Ui,
}

/// Owns the two lifecycle registries and the local configuration. This is
/// the whole of the state this core carries between dispatch calls.
pub struct Core {
    pub config: Config,
    pub sessions: SessionRegistry,
    pub transfers: TransferRegistry,
}

impl Core {
    pub fn new(config: Config) -> Core {
        Core {
            config,
            sessions: SessionRegistry::new(),
            transfers: TransferRegistry::new(),
        }
    }

    /// Classifies an inbound `iq` payload and routes it. Returns `true` if
    /// the payload was recognised and handled (even if handling it meant
    /// replying with an error), `false` if it belongs to some other part
    /// of the client entirely.
    pub fn dispatch_iq(
        &mut self,
        collab: &mut Collaborators,
        from: &Jid,
        id: &str,
        payload: &Element,
    ) -> bool {
        if payload.is("jingle", ns::JINGLE) {
            session::handle_jingle(self, collab, from, id, payload.clone());
            true
        } else if payload.has_ns(ns::IBB) {
            transfer::handle_ibb(self, collab, from, id, payload.clone());
            true
        } else {
            false
        }
    }

    /// Classifies an inbound `message` payload. The only thing this core
    /// reacts to is an XEP-0353 `propose` naming an RTP description, which
    /// it surfaces as a UI alert; everything else is "not handled".
    pub fn dispatch_message(&mut self, ui: &mut dyn Ui, payload: Element) -> bool {
        if !payload.has_ns(ns::JINGLE_MESSAGE) {
            return false;
        }
        match JingleMessage::try_from(payload) {
            Ok(message) if message.is_rtp_propose() => {
                ui.alert();
                true
            }
            Ok(_) => false,
            Err(e) => {
                log::debug!("malformed jingle-message envelope: {}", e);
                false
            }
        }
    }

    /// Finds the content whose transport sid is `sid`, across every live
    /// session. At most one match exists by invariant.
    pub fn lookup_content_by_transport_sid(
        &self,
        sid: &crate::stanza::ibb::StreamId,
    ) -> Option<(SessionId, String)> {
        self.sessions.find_by_transport_sid(sid)
    }

    /// Marks the content owning `transport_sid` as finished. If every
    /// content of its session has finished, asks the session layer to
    /// terminate with reason `success` and drop the session.
    pub fn mark_content_finished(
        &mut self,
        collab: &mut Collaborators,
        transport_sid: &crate::stanza::ibb::StreamId,
    ) {
        let found = self.lookup_content_by_transport_sid(transport_sid);
        let Some((sid, content_name)) = found else {
            return;
        };
        let all_finished = {
            let Some(s) = self.sessions.get_mut(&sid) else {
                return;
            };
            if let Some(content) = s.contents.get_mut(&content_name) {
                content.state = ContentState::TransferFinished;
            }
            s.all_contents_finished()
        };
        if all_finished {
            session::emit_terminate(self, collab, &sid, "success");
        }
    }
}
