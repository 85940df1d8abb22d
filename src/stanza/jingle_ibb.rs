// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The Jingle IBB transport descriptor, see also [`crate::stanza::ibb`].

use minidom::Element;

use crate::error::{Error, Result};
use crate::ns;
use crate::stanza::ibb::StreamId;

/// Describes an In-Band Bytestream (XEP-0047) Jingle transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    /// Maximum size in bytes for each chunk.
    pub block_size: u16,
    /// The identifier to be used to create a stream.
    pub sid: StreamId,
}

impl TryFrom<Element> for Transport {
    type Error = Error;

    fn try_from(elem: Element) -> Result<Transport> {
        check_self!(elem, "transport", JINGLE_IBB);
        let block_size = get_attr!(elem, "block-size", Required);
        let sid = get_attr!(elem, "sid", Required);
        Ok(Transport { block_size, sid })
    }
}

impl From<Transport> for Element {
    fn from(transport: Transport) -> Element {
        Element::builder("transport", ns::JINGLE_IBB)
            .attr("block-size", transport.block_size.to_string())
            .attr("sid", transport.sid)
            .build()
    }
}
