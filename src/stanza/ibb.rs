// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Wire types for the XEP-0047 In-Band Bytestream control elements.

use base64::engine::general_purpose::STANDARD as Base64;
use base64::Engine;
use minidom::Element;

use crate::error::{Error, Result};
use crate::ns;

generate_id!(
    /// An identifier matching a bytestream.
    StreamId
);

/// Starts an In-Band Bytestream session with the given parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Open {
    pub block_size: u16,
    pub sid: StreamId,
}

impl TryFrom<Element> for Open {
    type Error = Error;

    fn try_from(elem: Element) -> Result<Open> {
        check_self!(elem, "open", IBB);
        let block_size = get_attr!(elem, "block-size", Required);
        let sid = get_attr!(elem, "sid", Required);
        Ok(Open { block_size, sid })
    }
}

impl From<Open> for Element {
    fn from(open: Open) -> Element {
        Element::builder("open", ns::IBB)
            .attr("block-size", open.block_size.to_string())
            .attr("sid", open.sid)
            .attr("stanza", "iq")
            .build()
    }
}

/// One chunk of data exchanged on an open stream.
///
/// `seq` is kept as the raw wire value here; wraparound-aware comparison
/// against a transfer's expected sequence happens in the transfer state
/// machine, not at the parsing layer.
#[derive(Debug, Clone)]
pub struct Data {
    pub seq_raw: String,
    pub sid: StreamId,
    pub text: String,
}

impl Data {
    /// Parses the `seq` attribute as an unsigned 16-bit integer.
    pub fn seq(&self) -> std::result::Result<u16, std::num::ParseIntError> {
        self.seq_raw.parse()
    }

    /// Decodes the base64 text body.
    pub fn decode(&self) -> std::result::Result<Vec<u8>, base64::DecodeError> {
        Base64.decode(self.text.as_bytes())
    }
}

impl TryFrom<Element> for Data {
    type Error = Error;

    fn try_from(elem: Element) -> Result<Data> {
        check_self!(elem, "data", IBB);
        let seq_raw = match elem.attr("seq") {
            Some(v) => v.to_owned(),
            None => return Err(Error::Missing("seq")),
        };
        let sid = get_attr!(elem, "sid", Required);
        Ok(Data {
            seq_raw,
            sid,
            text: elem.text(),
        })
    }
}

impl Data {
    pub fn build(seq: u16, sid: StreamId, bytes: &[u8]) -> Element {
        Element::builder("data", ns::IBB)
            .attr("seq", seq.to_string())
            .attr("sid", sid)
            .append(Base64.encode(bytes))
            .build()
    }
}

/// Closes an open stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Close {
    pub sid: StreamId,
}

impl TryFrom<Element> for Close {
    type Error = Error;

    fn try_from(elem: Element) -> Result<Close> {
        check_self!(elem, "close", IBB);
        let sid = get_attr!(elem, "sid", Required);
        Ok(Close { sid })
    }
}

impl From<Close> for Element {
    fn from(close: Close) -> Element {
        Element::builder("close", ns::IBB).attr("sid", close.sid).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open() {
        let elem: Element = "<open xmlns='http://jabber.org/protocol/ibb' block-size='4096' sid='t1'/>"
            .parse()
            .unwrap();
        let open = Open::try_from(elem).unwrap();
        assert_eq!(open.block_size, 4096);
        assert_eq!(open.sid, StreamId(String::from("t1")));
    }

    #[test]
    fn test_data_decode() {
        let elem: Element =
            "<data xmlns='http://jabber.org/protocol/ibb' seq='0' sid='t1'>AAAA</data>"
                .parse()
                .unwrap();
        let data = Data::try_from(elem).unwrap();
        assert_eq!(data.seq().unwrap(), 0);
        assert_eq!(data.decode().unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_data_empty_body_decodes_to_empty_vec() {
        let elem: Element =
            "<data xmlns='http://jabber.org/protocol/ibb' seq='0' sid='t1'></data>"
                .parse()
                .unwrap();
        let data = Data::try_from(elem).unwrap();
        assert_eq!(data.decode().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_data_bad_seq_is_not_a_parse_error_at_try_from() {
        // malformed seq is not rejected by Data::try_from; the caller
        // decides (drop silently) when seq() fails to parse.
        let elem: Element =
            "<data xmlns='http://jabber.org/protocol/ibb' seq='not-a-number' sid='t1'>AAAA</data>"
                .parse()
                .unwrap();
        let data = Data::try_from(elem).unwrap();
        assert!(data.seq().is_err());
    }

    #[test]
    fn test_close() {
        let elem: Element = "<close xmlns='http://jabber.org/protocol/ibb' sid='t1'/>"
            .parse()
            .unwrap();
        let close = Close::try_from(elem).unwrap();
        assert_eq!(close.sid, StreamId(String::from("t1")));
    }
}
