// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Wire types for the Jingle (XEP-0166) container and its `content`
//! children.
//!
//! A `jingle` container with a bad `sid`/`action` is a malformed envelope
//! and the whole thing is dropped — [`Jingle::try_from`] reflects that by
//! failing outright. A single bad `content` child, on the other hand, is
//! a per-content problem the session layer skips with a warning rather
//! than a reason to drop the whole session; [`Jingle::try_from`] reflects
//! that by *not* attempting to fully parse each `content` child, instead
//! collecting them as raw elements for [`crate::session`] to parse one at
//! a time via [`ContentFields::try_from`].

use minidom::Element;

use crate::error::{Error, Result};
use crate::ns;
use crate::stanza::jingle_ft;
use crate::stanza::jingle_ibb;

generate_attribute!(
    /// The action attribute on a Jingle container.
    Action, "action", {
        ContentAccept => "content-accept",
        ContentAdd => "content-add",
        ContentModify => "content-modify",
        ContentReject => "content-reject",
        ContentRemove => "content-remove",
        DescriptionInfo => "description-info",
        SecurityInfo => "security-info",
        SessionAccept => "session-accept",
        SessionInfo => "session-info",
        SessionInitiate => "session-initiate",
        SessionTerminate => "session-terminate",
        TransportAccept => "transport-accept",
        TransportInfo => "transport-info",
        TransportReject => "transport-reject",
        TransportReplace => "transport-replace",
    }
);

generate_attribute!(
    /// Which party originally generated a content item. Unlike
    /// [`Senders`], an unrecognised value here is a per-content parse
    /// failure, not a tolerated default.
    Creator, "creator", {
        Initiator => "initiator",
        Responder => "responder",
    }
);

/// Which parties may send data for a content item. An unrecognised value
/// is tolerated as [`Senders::Unknown`] rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Senders {
    Both,
    Initiator,
    Responder,
    None,
    Unknown,
}

impl Senders {
    pub fn parse(s: &str) -> Senders {
        match s {
            "both" => Senders::Both,
            "initiator" => Senders::Initiator,
            "responder" => Senders::Responder,
            "none" => Senders::None,
            _ => Senders::Unknown,
        }
    }

    fn attr_value(self) -> Option<&'static str> {
        match self {
            Senders::Both => None,
            Senders::Initiator => Some("initiator"),
            Senders::Responder => Some("responder"),
            Senders::None => Some("none"),
            Senders::Unknown => None,
        }
    }
}

impl Default for Senders {
    fn default() -> Senders {
        Senders::Both
    }
}

generate_id!(
    /// Per-session unique identifier for a `content` element.
    ContentId
);

generate_id!(
    /// Per-peer-pair unique identifier for a Jingle session.
    SessionId
);

/// Tagged union over the description kinds that can appear inside a
/// `content` element. Only `FileTransfer` is understood by this core;
/// everything else is kept as an opaque element so the session layer can
/// recognise and skip it.
#[derive(Debug, Clone)]
pub enum Description {
    FileTransfer(jingle_ft::Description),
    Other(Element),
}

impl TryFrom<Element> for Description {
    type Error = Error;

    fn try_from(elem: Element) -> Result<Description> {
        if elem.is("description", ns::JINGLE_FT) {
            Ok(Description::FileTransfer(jingle_ft::Description::try_from(
                elem,
            )?))
        } else if elem.name() == "description" {
            Ok(Description::Other(elem))
        } else {
            Err(Error::Mismatch)
        }
    }
}

/// Tagged union over the transport kinds that can appear inside a
/// `content` element. Only `InBandBytestream` is understood.
#[derive(Debug, Clone)]
pub enum Transport {
    InBandBytestream(jingle_ibb::Transport),
    Other(Element),
}

impl TryFrom<Element> for Transport {
    type Error = Error;

    fn try_from(elem: Element) -> Result<Transport> {
        if elem.is("transport", ns::JINGLE_IBB) {
            Ok(Transport::InBandBytestream(jingle_ibb::Transport::try_from(
                elem,
            )?))
        } else if elem.name() == "transport" {
            Ok(Transport::Other(elem))
        } else {
            Err(Error::Mismatch)
        }
    }
}

/// The raw fields of one `content` child, parsed independently of its
/// siblings so that a problem with one content never invalidates the
/// others. `creator` is kept as the raw wire string: the session layer
/// decides whether an unparseable value skips the content or fails it,
/// per its own validation order.
#[derive(Debug, Clone)]
pub struct ContentFields {
    pub creator_raw: String,
    pub senders: Senders,
    pub name: String,
    pub description: Option<Description>,
    pub transport: Option<Transport>,
}

impl ContentFields {
    pub fn creator(&self) -> Option<Creator> {
        self.creator_raw.parse().ok()
    }
}

impl TryFrom<Element> for ContentFields {
    type Error = Error;

    fn try_from(elem: Element) -> Result<ContentFields> {
        check_self!(elem, "content", JINGLE);
        let creator_raw: String = get_attr!(elem, "creator", Required);
        let senders = match elem.attr("senders") {
            Some(value) => Senders::parse(value),
            None => Senders::default(),
        };
        let name: String = get_attr!(elem, "name", Required);

        let mut description = None;
        let mut transport = None;
        for child in elem.children() {
            if child.name() == "description" {
                description = Description::try_from(child.clone()).ok();
            } else if child.name() == "transport" {
                transport = Transport::try_from(child.clone()).ok();
            }
        }

        Ok(ContentFields {
            creator_raw,
            senders,
            name,
            description,
            transport,
        })
    }
}

/// Builds the outbound `content` element for a `session-accept`, mirroring
/// the accepted `creator`/`senders`/`name` and nesting the file-transfer
/// description and IBB transport this core always offers in response.
pub fn build_content(
    creator: Creator,
    senders: Senders,
    name: &str,
    description: Element,
    transport: Element,
) -> Element {
    let mut builder = Element::builder("content", ns::JINGLE)
        .attr("creator", creator)
        .attr("name", name);
    if let Some(value) = senders.attr_value() {
        builder = builder.attr("senders", value);
    }
    builder.append(description).append(transport).build()
}

/// The `reason` child of a `session-terminate` (or other) Jingle
/// container. This core only ever emits `success` or `cancel`, so unlike
/// the full XEP-0166 `Reason` enum we keep just the element name and an
/// optional human-readable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonElement {
    pub reason: String,
    pub text: Option<String>,
}

impl ReasonElement {
    pub fn new(reason: &str) -> ReasonElement {
        ReasonElement {
            reason: reason.to_owned(),
            text: None,
        }
    }
}

impl TryFrom<Element> for ReasonElement {
    type Error = Error;

    fn try_from(elem: Element) -> Result<ReasonElement> {
        check_self!(elem, "reason", JINGLE);
        let mut reason = None;
        let mut text = None;
        for child in elem.children() {
            if child.name() == "text" {
                text = Some(child.text());
            } else if reason.is_none() {
                reason = Some(child.name().to_owned());
            }
        }
        match reason {
            Some(reason) => Ok(ReasonElement { reason, text }),
            None => Err(Error::Missing("reason")),
        }
    }
}

impl From<ReasonElement> for Element {
    fn from(reason: ReasonElement) -> Element {
        Element::builder("reason", ns::JINGLE)
            .append(Element::builder(reason.reason, ns::JINGLE).build())
            .append_all(
                reason
                    .text
                    .map(|text| Element::builder("text", ns::JINGLE).append(text)),
            )
            .build()
    }
}

/// The `jingle` element carried inside an `iq` of type `set`.
#[derive(Debug, Clone)]
pub struct Jingle {
    pub action: Action,
    pub initiator: Option<jid::Jid>,
    pub responder: Option<jid::Jid>,
    pub sid: SessionId,
    /// Raw, unparsed `content` children — see the module docs for why.
    pub content_elements: Vec<Element>,
    pub reason: Option<ReasonElement>,
}

impl Jingle {
    pub fn new(action: Action, sid: SessionId) -> Jingle {
        Jingle {
            action,
            initiator: None,
            responder: None,
            sid,
            content_elements: Vec::new(),
            reason: None,
        }
    }

    pub fn with_responder(mut self, responder: jid::Jid) -> Jingle {
        self.responder = Some(responder);
        self
    }

    pub fn add_content_element(mut self, content: Element) -> Jingle {
        self.content_elements.push(content);
        self
    }

    pub fn with_reason(mut self, reason: ReasonElement) -> Jingle {
        self.reason = Some(reason);
        self
    }
}

impl TryFrom<Element> for Jingle {
    type Error = Error;

    fn try_from(elem: Element) -> Result<Jingle> {
        check_self!(elem, "jingle", JINGLE);
        let action = get_attr!(elem, "action", Required);
        let sid = get_attr!(elem, "sid", Required);
        let initiator = match elem.attr("initiator") {
            Some(value) => Some(value.parse::<jid::Jid>()?),
            None => None,
        };
        let responder = match elem.attr("responder") {
            Some(value) => Some(value.parse::<jid::Jid>()?),
            None => None,
        };

        let mut content_elements = Vec::new();
        let mut reason = None;
        for child in elem.children() {
            if child.is("content", ns::JINGLE) {
                content_elements.push(child.clone());
            } else if child.is("reason", ns::JINGLE) {
                reason = ReasonElement::try_from(child.clone()).ok();
            }
        }

        Ok(Jingle {
            action,
            initiator,
            responder,
            sid,
            content_elements,
            reason,
        })
    }
}

impl From<Jingle> for Element {
    fn from(jingle: Jingle) -> Element {
        Element::builder("jingle", ns::JINGLE)
            .attr("action", jingle.action)
            .attr("initiator", jingle.initiator)
            .attr("responder", jingle.responder)
            .attr("sid", jingle.sid)
            .append_all(jingle.content_elements)
            .append_all(jingle.reason.map(Element::from))
            .build()
    }
}
