// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The two process-wide lifecycle singletons: the session registry and
//! the transfer registry. Neither is thread-safe — only the dispatch
//! thread is permitted to mutate them, per the single-threaded
//! concurrency model this core assumes.

use std::collections::HashMap;

use crate::model::{Session, Transfer};
use crate::stanza::ibb::StreamId;
use crate::stanza::jingle::SessionId;

/// Owns every live [`Session`], keyed by session id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> SessionRegistry {
        SessionRegistry::default()
    }

    pub fn insert(&mut self, session: Session) {
        self.sessions.insert(session.sid.clone(), session);
    }

    pub fn get(&self, sid: &SessionId) -> Option<&Session> {
        self.sessions.get(sid)
    }

    pub fn get_mut(&mut self, sid: &SessionId) -> Option<&mut Session> {
        self.sessions.get_mut(sid)
    }

    pub fn remove(&mut self, sid: &SessionId) -> Option<Session> {
        self.sessions.remove(sid)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Session> {
        self.sessions.values_mut()
    }

    /// Finds the session and content name owning the content whose
    /// transport sid matches `sid`. The transport sid is unique across
    /// every content of every live session by invariant, so at most one
    /// match exists.
    pub fn find_by_transport_sid(&self, sid: &StreamId) -> Option<(SessionId, String)> {
        for session in self.sessions.values() {
            for content in session.contents.values() {
                if &content.transport.sid == sid {
                    return Some((session.sid.clone(), content.name.clone()));
                }
            }
        }
        None
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Owns every in-flight [`Transfer`], keyed by transport (stream) id.
#[derive(Default)]
pub struct TransferRegistry {
    transfers: HashMap<StreamId, Transfer>,
}

impl TransferRegistry {
    pub fn new() -> TransferRegistry {
        TransferRegistry::default()
    }

    pub fn insert(&mut self, transfer: Transfer) {
        self.transfers.insert(transfer.sid.clone(), transfer);
    }

    pub fn get(&self, sid: &StreamId) -> Option<&Transfer> {
        self.transfers.get(sid)
    }

    pub fn get_mut(&mut self, sid: &StreamId) -> Option<&mut Transfer> {
        self.transfers.get_mut(sid)
    }

    pub fn contains(&self, sid: &StreamId) -> bool {
        self.transfers.contains_key(sid)
    }

    pub fn remove(&mut self, sid: &StreamId) -> Option<Transfer> {
        self.transfers.remove(sid)
    }

    /// Removes every transfer belonging to `session`, flushing and
    /// closing their sinks via `Transfer`'s destructor.
    pub fn remove_session(&mut self, session: &SessionId) {
        self.transfers.retain(|_, t| &t.owning_session != session);
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Content, ContentState, FileInfo, InBandTransport, SessionState};
    use crate::stanza::jingle::{Creator, Senders};
    use std::str::FromStr;

    fn sample_session(sid: &str, transport_sid: &str) -> Session {
        let mut session = Session::new(
            SessionId(sid.to_owned()),
            jid::Jid::from_str("peer@example.com/res").unwrap(),
        );
        session.state = SessionState::Accepted;
        session.contents.insert(
            "c1".to_owned(),
            Content {
                name: "c1".to_owned(),
                creator: Creator::Initiator,
                senders: Senders::Both,
                file: FileInfo {
                    name: Some("kitten.jpg".to_owned()),
                    media_type: None,
                    date: None,
                    size: 8192,
                    hash: None,
                },
                transport: InBandTransport {
                    sid: StreamId(transport_sid.to_owned()),
                    block_size: 4096,
                },
                state: ContentState::Pending,
            },
        );
        session
    }

    #[test]
    fn test_find_by_transport_sid() {
        let mut registry = SessionRegistry::new();
        registry.insert(sample_session("s1", "t1"));
        let found = registry.find_by_transport_sid(&StreamId("t1".to_owned()));
        assert_eq!(found, Some((SessionId("s1".to_owned()), "c1".to_owned())));
        assert_eq!(registry.find_by_transport_sid(&StreamId("bogus".to_owned())), None);
    }

    #[test]
    fn test_remove_session_transfers() {
        let mut transfers = TransferRegistry::new();
        transfers.insert(Transfer::new(
            StreamId("t1".to_owned()),
            SessionId("s1".to_owned()),
            "c1".to_owned(),
            8192,
            "kitten.jpg".to_owned(),
        ));
        transfers.insert(Transfer::new(
            StreamId("t2".to_owned()),
            SessionId("s2".to_owned()),
            "c1".to_owned(),
            8192,
            "other.jpg".to_owned(),
        ));
        transfers.remove_session(&SessionId("s1".to_owned()));
        assert_eq!(transfers.len(), 1);
        assert!(transfers.contains(&StreamId("t2".to_owned())));
    }
}
