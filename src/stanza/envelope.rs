// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Builders for the `iq` envelopes this core sends: the bare `result` ack,
//! the typed `error`, and the `set` request carrying a Jingle or IBB
//! payload. Parsing of inbound envelopes (correlating ids, classifying
//! `get`/`set`/`result`/`error`) is the out-of-scope job of the embedding
//! application's stanza layer — this core only needs to build outbound
//! ones and read the handful of attributes off inbound ones that
//! [`crate::dispatch`] inspects directly.

use jid::Jid;
use minidom::Element;

use crate::ns;

generate_attribute!(
    /// The `type` attribute of an `error` element.
    ErrorType, "type", {
        Cancel => "cancel",
        Modify => "modify",
    }
);

/// An error condition this core can emit, per the three protocol-violation
/// cases it distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    NotAcceptable,
    ResourceConstraint,
    BadRequest,
    ItemNotFound,
}

impl Condition {
    fn name(self) -> &'static str {
        match self {
            Condition::NotAcceptable => "not-acceptable",
            Condition::ResourceConstraint => "resource-constraint",
            Condition::BadRequest => "bad-request",
            Condition::ItemNotFound => "item-not-found",
        }
    }

    /// The error type the XEP recommends pairing with this condition.
    pub fn error_type(self) -> ErrorType {
        match self {
            Condition::ResourceConstraint => ErrorType::Modify,
            _ => ErrorType::Cancel,
        }
    }
}

/// Builds a bare `iq` result (ack) in reply to `id`.
pub fn ack(id: &str, to: &Jid) -> Element {
    Element::builder("iq", "jabber:client")
        .attr("type", "result")
        .attr("id", id)
        .attr("to", to.clone())
        .build()
}

/// Builds an `iq` error in reply to `id`, with the given condition as the
/// sole child of `error`, in the standard stanzas namespace.
pub fn error(id: &str, to: &Jid, condition: Condition) -> Element {
    let error_elem = Element::builder("error", "jabber:client")
        .attr("type", condition.error_type())
        .append(Element::builder(condition.name(), ns::STANZAS).build())
        .build();
    Element::builder("iq", "jabber:client")
        .attr("type", "error")
        .attr("id", id)
        .attr("to", to.clone())
        .append(error_elem)
        .build()
}

/// Builds an `iq` of type `set` wrapping `payload`, addressed to `to`.
pub fn set(id: &str, to: &Jid, payload: Element) -> Element {
    Element::builder("iq", "jabber:client")
        .attr("type", "set")
        .attr("id", id)
        .attr("to", to.clone())
        .append(payload)
        .build()
}
