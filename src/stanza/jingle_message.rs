// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! XEP-0353 Jingle Message Initiation: the `propose`/`retract`/`accept`/
//! `proceed`/`reject` messages used to ring all of a contact's clients
//! before a Jingle session is actually established. This core only acts
//! on `propose`; the rest are recognised so the dispatcher doesn't choke
//! on them.

use minidom::Element;

use crate::error::{Error, Result};
use crate::ns;
use crate::stanza::jingle::SessionId;

#[derive(Debug, Clone)]
pub enum JingleMessage {
    /// A proposal to start a session, carrying its (unparsed) description.
    Propose {
        sid: SessionId,
        description: Element,
    },
    Retract(SessionId),
    Accept(SessionId),
    Proceed(SessionId),
    Reject(SessionId),
}

fn get_sid(elem: &Element) -> Result<SessionId> {
    match elem.attr("id") {
        Some(id) => Ok(SessionId(id.to_owned())),
        None => Err(Error::Missing("id")),
    }
}

impl TryFrom<Element> for JingleMessage {
    type Error = Error;

    fn try_from(elem: Element) -> Result<JingleMessage> {
        if !elem.has_ns(ns::JINGLE_MESSAGE) {
            return Err(Error::Mismatch);
        }
        Ok(match elem.name() {
            "propose" => {
                let sid = get_sid(&elem)?;
                let description = elem
                    .children()
                    .find(|c| c.name() == "description")
                    .cloned()
                    .ok_or(Error::Missing("description"))?;
                JingleMessage::Propose { sid, description }
            }
            "retract" => JingleMessage::Retract(get_sid(&elem)?),
            "accept" => JingleMessage::Accept(get_sid(&elem)?),
            "proceed" => JingleMessage::Proceed(get_sid(&elem)?),
            "reject" => JingleMessage::Reject(get_sid(&elem)?),
            _ => return Err(Error::Mismatch),
        })
    }
}

impl JingleMessage {
    /// True if `description` names an RTP (audio/video call) payload —
    /// the only proposal kind this core surfaces to the UI.
    pub fn is_rtp_propose(&self) -> bool {
        matches!(
            self,
            JingleMessage::Propose { description, .. }
                if description.is("description", ns::JINGLE_RTP)
        )
    }
}
