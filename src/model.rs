// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The domain model: the negotiated-session and in-flight-transfer records
//! the registries own. These are distinct from the wire types in
//! [`crate::stanza`] — a `stanza::jingle::Content` is parsed once and
//! folded into a [`Content`] here, which is what the state machines
//! actually operate on.
//!
//! Rather than a Transfer holding a borrowed/shared-owned pointer back to
//! its Content's [`FileInfo`], it caches the two fields it needs
//! (`file_size`, `file_name`) at creation time and otherwise refers back
//! to its owning content only by `(SessionId, String)` key. This avoids
//! back-pointers and keeps the registries the sole owners of their
//! records, in the spirit of an arena-plus-index design.

use std::fs::File as FsFile;

use crate::stanza::ibb::StreamId;
use crate::stanza::jingle::{Creator, Senders, SessionId};

/// The three states a [`Session`] passes through; monotonic, no
/// regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Initiated,
    Accepted,
    Terminated,
}

/// A negotiated Jingle session with one remote peer.
#[derive(Debug, Clone)]
pub struct Session {
    pub sid: SessionId,
    pub initiator: jid::Jid,
    pub state: SessionState,
    pub contents: std::collections::BTreeMap<String, Content>,
}

impl Session {
    pub fn new(sid: SessionId, initiator: jid::Jid) -> Session {
        Session {
            sid,
            initiator,
            state: SessionState::Initiated,
            contents: std::collections::BTreeMap::new(),
        }
    }

    /// True once every content has finished its transfer.
    pub fn all_contents_finished(&self) -> bool {
        !self.contents.is_empty()
            && self
                .contents
                .values()
                .all(|c| c.state == ContentState::TransferFinished)
    }
}

/// The three states a [`Content`] passes through; monotonic, no
/// regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentState {
    Pending,
    Active,
    TransferFinished,
}

/// One negotiated file-transfer-over-IBB media item inside a [`Session`].
#[derive(Debug, Clone)]
pub struct Content {
    pub name: String,
    pub creator: Creator,
    pub senders: Senders,
    pub file: FileInfo,
    pub transport: InBandTransport,
    pub state: ContentState,
}

/// The parsed, immutable description of the file being transferred.
/// `size` is parsed from its decimal wire string exactly once, at content
/// acceptance time, and never re-derived per data block.
#[derive(Debug, Clone)]
pub struct FileInfo {
    pub name: Option<String>,
    pub media_type: Option<String>,
    pub date: Option<String>,
    pub size: u64,
    pub hash: Option<String>,
}

/// The negotiated IBB transport parameters for one content.
#[derive(Debug, Clone)]
pub struct InBandTransport {
    pub sid: StreamId,
    pub block_size: u16,
}

/// An active in-band-bytestream reception.
pub struct Transfer {
    pub sid: StreamId,
    pub owning_session: SessionId,
    pub owning_content: String,
    pub expected_seq: u16,
    pub sink: Option<FsFile>,
    pub bytes_written: u64,
    pub file_size: u64,
    pub file_name: String,
}

impl Transfer {
    pub fn new(
        sid: StreamId,
        owning_session: SessionId,
        owning_content: String,
        file_size: u64,
        file_name: String,
    ) -> Transfer {
        Transfer {
            sid,
            owning_session,
            owning_content,
            expected_seq: 0,
            sink: None,
            bytes_written: 0,
            file_size,
            file_name,
        }
    }
}

impl Drop for Transfer {
    fn drop(&mut self) {
        use std::io::Write;
        if let Some(sink) = self.sink.as_mut() {
            let _ = sink.flush();
        }
    }
}
