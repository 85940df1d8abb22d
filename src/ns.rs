// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Namespace constants for the stanzas this crate parses and builds.

/// XEP-0166: Jingle.
pub const JINGLE: &str = "urn:xmpp:jingle:1";

/// XEP-0234: Jingle File Transfer.
pub const JINGLE_FT: &str = "urn:xmpp:jingle:apps:file-transfer:5";

/// XEP-0261 / Jingle IBB transport.
pub const JINGLE_IBB: &str = "urn:xmpp:jingle:transports:ibb:1";

/// XEP-0047: In-Band Bytestreams.
pub const IBB: &str = "http://jabber.org/protocol/ibb";

/// XEP-0353: Jingle Message Initiation.
pub const JINGLE_MESSAGE: &str = "urn:xmpp:jingle-message:0";

/// XEP-0167: Jingle RTP Sessions, referenced only to recognize (and reject)
/// non-file-transfer descriptions.
pub const JINGLE_RTP: &str = "urn:xmpp:jingle:apps:rtp:1";

/// RFC 6120 stanza error conditions.
pub const STANZAS: &str = "urn:ietf:params:xml:ns:xmpp-stanzas";
