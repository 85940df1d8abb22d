// Copyright (c) 2023 xmpp-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The transfer state machine: `open`/`data`/`close` framing over an
//! already-negotiated IBB transport, sequencing, and the file sink.

use std::fs::File;
use std::io::Write;

use jid::Jid;
use minidom::Element;

use crate::dispatch::{Collaborators, Core};
use crate::model::{self, ContentState};
use crate::stanza::envelope::{self, Condition};
use crate::stanza::ibb::{self, Close, Data, Open, StreamId};

/// Entry point for any inbound `iq` carrying an IBB child.
pub fn handle_ibb(core: &mut Core, collab: &mut Collaborators, from: &Jid, id: &str, elem: Element) {
    match elem.name() {
        "open" => match Open::try_from(elem) {
            Ok(open) => handle_open(core, collab, from, id, open),
            Err(e) => log::debug!("dropping malformed ibb open from {}: {}", from, e),
        },
        "data" => match Data::try_from(elem) {
            Ok(data) => handle_data(core, collab, from, id, data),
            Err(e) => log::debug!("dropping malformed ibb data from {}: {}", from, e),
        },
        "close" => match Close::try_from(elem) {
            Ok(close) => handle_close(core, collab, from, id, close),
            Err(e) => log::debug!("dropping malformed ibb close from {}: {}", from, e),
        },
        other => log::debug!("dropping unknown ibb child '{}' from {}", other, from),
    }
}

fn handle_open(core: &mut Core, collab: &mut Collaborators, from: &Jid, id: &str, open: Open) {
    if core.transfers.contains(&open.sid) {
        collab
            .xmpp
            .send(envelope::error(id, from, Condition::NotAcceptable));
        return;
    }

    let Some((owning_session, owning_content)) = core.lookup_content_by_transport_sid(&open.sid)
    else {
        collab
            .xmpp
            .send(envelope::error(id, from, Condition::NotAcceptable));
        return;
    };

    let Some(content) = core
        .sessions
        .get_mut(&owning_session)
        .and_then(|s| s.contents.get_mut(&owning_content))
    else {
        collab
            .xmpp
            .send(envelope::error(id, from, Condition::NotAcceptable));
        return;
    };

    if content.transport.block_size != open.block_size {
        collab
            .xmpp
            .send(envelope::error(id, from, Condition::ResourceConstraint));
        return;
    }

    content.state = ContentState::Active;
    let file_name = content
        .file
        .name
        .clone()
        .unwrap_or_else(|| "download".to_owned());
    let file_size = content.file.size;

    core.transfers.insert(model::Transfer::new(
        open.sid,
        owning_session,
        owning_content,
        file_size,
        file_name,
    ));
    collab.xmpp.send(envelope::ack(id, from));
}

fn handle_data(core: &mut Core, collab: &mut Collaborators, from: &Jid, id: &str, data: Data) {
    if !core.transfers.contains(&data.sid) {
        collab
            .xmpp
            .send(envelope::error(id, from, Condition::ItemNotFound));
        return;
    }

    let seq = match data.seq() {
        Ok(seq) => seq,
        Err(_) => {
            log::debug!("dropping ibb data with unparseable seq on {}", data.sid);
            return;
        }
    };

    let bytes = match data.decode() {
        Ok(bytes) => bytes,
        Err(_) => {
            collab
                .xmpp
                .send(envelope::error(id, from, Condition::BadRequest));
            return;
        }
    };

    let accepted = {
        let transfer = core.transfers.get_mut(&data.sid).expect("checked above");
        if seq == 0 {
            transfer.expected_seq == 0 && transfer.sink.is_none()
        } else {
            seq == transfer.expected_seq.wrapping_add(1)
        }
    };
    if !accepted {
        log::warn!("aborting transfer {} on out-of-order seq {}", data.sid, seq);
        abort_transfer(core, collab, &data.sid, "data received out of order");
        return;
    }

    if seq != 0 {
        core.transfers.get_mut(&data.sid).unwrap().expected_seq = seq;
    }

    if core.transfers.get_mut(&data.sid).unwrap().sink.is_none() {
        let (dir, base) = {
            let transfer = core.transfers.get_mut(&data.sid).unwrap();
            (collab.downloads.downloads_directory(), transfer.file_name.clone())
        };
        if let Err(e) = collab.downloads.ensure_dir(&dir) {
            log::error!("could not create downloads directory: {}", e);
            abort_transfer(
                core,
                collab,
                &data.sid,
                &format!("could not create downloads directory: {}", e),
            );
            return;
        }
        let path = collab.downloads.unique_filename(&base, &dir);
        match File::create(&path) {
            Ok(file) => core.transfers.get_mut(&data.sid).unwrap().sink = Some(file),
            Err(e) => {
                log::error!("could not open sink for {}: {}", data.sid, e);
                abort_transfer(core, collab, &data.sid, &format!("could not open file: {}", e));
                return;
            }
        }
    }

    let transfer = core.transfers.get_mut(&data.sid).unwrap();
    if let Err(e) = transfer.sink.as_mut().unwrap().write_all(&bytes) {
        log::error!("write failed for {}: {}", data.sid, e);
        abort_transfer(core, collab, &data.sid, &format!("write failed: {}", e));
        return;
    }
    transfer.bytes_written += bytes.len() as u64;
    let finished = transfer.bytes_written >= transfer.file_size;

    collab.xmpp.send(envelope::ack(id, from));

    if finished {
        complete_transfer(core, collab, &data.sid);
    }
}

fn handle_close(core: &mut Core, collab: &mut Collaborators, from: &Jid, id: &str, close: Close) {
    match core.transfers.remove(&close.sid) {
        Some(_) => {
            core.mark_content_finished(collab, &close.sid);
            collab.xmpp.send(envelope::ack(id, from));
        }
        None => {
            collab
                .xmpp
                .send(envelope::error(id, from, Condition::ItemNotFound));
        }
    }
}

fn peer_for_transport(core: &Core, sid: &StreamId) -> Option<Jid> {
    let (owning_session, _) = core.lookup_content_by_transport_sid(sid)?;
    core.sessions.get(&owning_session).map(|s| s.initiator.clone())
}

fn send_outbound_close(core: &Core, collab: &mut Collaborators, sid: &StreamId) {
    if let Some(to) = peer_for_transport(core, sid) {
        let request_id = collab.ids.new_id();
        let close: Element = ibb::Close { sid: sid.clone() }.into();
        collab.xmpp.send(envelope::set(&request_id, &to, close));
    }
}

/// A local or protocol-violation abort: tells the peer, drops the
/// transfer, but deliberately does **not** mark the content finished —
/// an aborted transfer never completes the owning session.
fn abort_transfer(core: &mut Core, collab: &mut Collaborators, sid: &StreamId, reason: &str) {
    let file_name = core
        .transfers
        .get(sid)
        .map(|t| t.file_name.clone())
        .unwrap_or_else(|| "transfer".to_owned());
    collab
        .ui
        .error(&format!("transfer of {} aborted: {}", file_name, reason));
    send_outbound_close(core, collab, sid);
    core.transfers.remove(sid);
}

/// A successful completion: tells the peer, drops the transfer, and marks
/// its content finished — which may in turn terminate the session.
fn complete_transfer(core: &mut Core, collab: &mut Collaborators, sid: &StreamId) {
    if let Some(transfer) = core.transfers.get(sid) {
        collab.ui.info(&format!(
            "download finished: {} ({} bytes)",
            transfer.file_name, transfer.bytes_written
        ));
    }
    send_outbound_close(core, collab, sid);
    core.transfers.remove(sid);
    core.mark_content_finished(collab, sid);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{Downloads, IdSource, Ui, XmppSink};
    use crate::config::Config;
    use crate::dispatch::Core;
    use crate::model::{Content, FileInfo, InBandTransport, Session, SessionState};
    use crate::stanza::jingle::{Creator, Senders, SessionId};
    use std::cell::RefCell;
    use std::path::{Path, PathBuf};
    use std::str::FromStr;

    #[derive(Default)]
    struct RecordingSink {
        sent: RefCell<Vec<Element>>,
    }

    impl XmppSink for RecordingSink {
        fn send(&mut self, envelope: Element) {
            self.sent.borrow_mut().push(envelope);
        }
    }

    struct SeqIds(u64);
    impl IdSource for SeqIds {
        fn new_id(&mut self) -> String {
            self.0 += 1;
            format!("id{}", self.0)
        }
    }

    struct DirDownloads(PathBuf);
    impl Downloads for DirDownloads {
        fn downloads_directory(&self) -> PathBuf {
            self.0.clone()
        }
        fn ensure_dir(&self, path: &Path) -> std::io::Result<()> {
            std::fs::create_dir_all(path)
        }
        fn unique_filename(&self, base: &str, dir: &Path) -> PathBuf {
            dir.join(base)
        }
    }

    #[derive(Default)]
    struct NoUi;
    impl Ui for NoUi {
        fn info(&mut self, _msg: &str) {}
        fn error(&mut self, _msg: &str) {}
        fn alert(&mut self) {}
    }

    #[derive(Default)]
    struct RecordingUi {
        info: RefCell<Vec<String>>,
        error: RefCell<Vec<String>>,
    }
    impl Ui for RecordingUi {
        fn info(&mut self, msg: &str) {
            self.info.borrow_mut().push(msg.to_owned());
        }
        fn error(&mut self, msg: &str) {
            self.error.borrow_mut().push(msg.to_owned());
        }
        fn alert(&mut self) {}
    }

    fn peer() -> Jid {
        Jid::from_str("peer@example.com/res").unwrap()
    }

    fn core_with_session(block_size: u16, size: u64) -> Core {
        let mut core = Core::new(Config::new(Jid::from_str("me@example.com/res").unwrap()));
        let mut session = Session::new(SessionId("s1".to_owned()), peer());
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
                    size,
                    hash: None,
                },
                transport: InBandTransport {
                    sid: StreamId("t1".to_owned()),
                    block_size,
                },
                state: crate::model::ContentState::Pending,
            },
        );
        core.sessions.insert(session);
        core
    }

    #[test]
    fn test_open_accepts_matching_block_size() {
        let mut core = core_with_session(4096, 8192);
        let mut xmpp = RecordingSink::default();
        let mut ids = SeqIds(0);
        let dir = tempfile::tempdir().unwrap();
        let downloads = DirDownloads(dir.path().to_path_buf());
        let mut ui = NoUi;
        let mut collab = Collaborators {
            xmpp: &mut xmpp,
            ids: &mut ids,
            downloads: &downloads,
            ui: &mut ui,
        };
        let open: Element = "<open xmlns='http://jabber.org/protocol/ibb' sid='t1' block-size='4096' stanza='iq'/>".parse().unwrap();
        handle_ibb(&mut core, &mut collab, &peer(), "o1", open);
        assert_eq!(core.transfers.len(), 1);
        assert_eq!(xmpp.sent.borrow()[0].attr("type"), Some("result"));
    }

    #[test]
    fn test_duplicate_open_rejected() {
        let mut core = core_with_session(4096, 8192);
        let mut xmpp = RecordingSink::default();
        let mut ids = SeqIds(0);
        let dir = tempfile::tempdir().unwrap();
        let downloads = DirDownloads(dir.path().to_path_buf());
        let mut ui = NoUi;
        let mut collab = Collaborators {
            xmpp: &mut xmpp,
            ids: &mut ids,
            downloads: &downloads,
            ui: &mut ui,
        };
        let open: Element = "<open xmlns='http://jabber.org/protocol/ibb' sid='t1' block-size='4096' stanza='iq'/>".parse().unwrap();
        handle_ibb(&mut core, &mut collab, &peer(), "o1", open.clone());
        handle_ibb(&mut core, &mut collab, &peer(), "o2", open);
        assert_eq!(core.transfers.len(), 1);
        let sent = xmpp.sent.borrow();
        assert_eq!(sent[1].attr("type"), Some("error"));
    }

    #[test]
    fn test_mismatched_block_size_rejected() {
        let mut core = core_with_session(4096, 8192);
        let mut xmpp = RecordingSink::default();
        let mut ids = SeqIds(0);
        let dir = tempfile::tempdir().unwrap();
        let downloads = DirDownloads(dir.path().to_path_buf());
        let mut ui = NoUi;
        let mut collab = Collaborators {
            xmpp: &mut xmpp,
            ids: &mut ids,
            downloads: &downloads,
            ui: &mut ui,
        };
        let open: Element = "<open xmlns='http://jabber.org/protocol/ibb' sid='t1' block-size='2048' stanza='iq'/>".parse().unwrap();
        handle_ibb(&mut core, &mut collab, &peer(), "o1", open);
        assert!(core.transfers.is_empty());
        let sent = xmpp.sent.borrow();
        assert_eq!(sent[0].attr("type"), Some("error"));
        let error_child = sent[0].children().next().unwrap();
        assert_eq!(error_child.attr("type"), Some("modify"));
    }

    #[test]
    fn test_happy_path_completes_and_terminates_session() {
        // "AAAAAAAA" (8 base64 chars, no padding) decodes to exactly 6
        // zero bytes, matching the content's negotiated file size below.
        let mut core = core_with_session(4096, 6);
        let mut xmpp = RecordingSink::default();
        let mut ids = SeqIds(0);
        let dir = tempfile::tempdir().unwrap();
        let downloads = DirDownloads(dir.path().to_path_buf());
        let mut ui = RecordingUi::default();
        let mut collab = Collaborators {
            xmpp: &mut xmpp,
            ids: &mut ids,
            downloads: &downloads,
            ui: &mut ui,
        };
        let open: Element = "<open xmlns='http://jabber.org/protocol/ibb' sid='t1' block-size='4096' stanza='iq'/>".parse().unwrap();
        handle_ibb(&mut core, &mut collab, &peer(), "o1", open);

        let data0: Element =
            "<data xmlns='http://jabber.org/protocol/ibb' sid='t1' seq='0'>AAAAAAAA</data>"
                .parse()
                .unwrap();
        handle_ibb(&mut core, &mut collab, &peer(), "d0", data0);

        assert!(core.transfers.is_empty());
        assert!(core.sessions.is_empty());
        let sent = xmpp.sent.borrow();
        // ack(open), ack(data), outbound close, outbound session-terminate
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[3].attr("type"), Some("set"));
        let info = ui.info.borrow();
        assert_eq!(info.len(), 1);
        assert!(info[0].contains("kitten.jpg"));
        assert!(info[0].contains('6'));
    }

    #[test]
    fn test_out_of_order_data_aborts() {
        let mut core = core_with_session(4096, 8192);
        let mut xmpp = RecordingSink::default();
        let mut ids = SeqIds(0);
        let dir = tempfile::tempdir().unwrap();
        let downloads = DirDownloads(dir.path().to_path_buf());
        let mut ui = RecordingUi::default();
        let mut collab = Collaborators {
            xmpp: &mut xmpp,
            ids: &mut ids,
            downloads: &downloads,
            ui: &mut ui,
        };
        let open: Element = "<open xmlns='http://jabber.org/protocol/ibb' sid='t1' block-size='4096' stanza='iq'/>".parse().unwrap();
        handle_ibb(&mut core, &mut collab, &peer(), "o1", open);

        let data0: Element =
            "<data xmlns='http://jabber.org/protocol/ibb' sid='t1' seq='0'>AAAA</data>"
                .parse()
                .unwrap();
        handle_ibb(&mut core, &mut collab, &peer(), "d0", data0);

        let data2: Element =
            "<data xmlns='http://jabber.org/protocol/ibb' sid='t1' seq='2'>AAAA</data>"
                .parse()
                .unwrap();
        handle_ibb(&mut core, &mut collab, &peer(), "d2", data2);

        assert!(core.transfers.is_empty());
        // session is not terminated by an abort.
        assert_eq!(core.sessions.len(), 1);
        let error = ui.error.borrow();
        assert_eq!(error.len(), 1);
        assert!(error[0].contains("kitten.jpg"));
        assert!(error[0].contains("out of order"));
    }

    #[test]
    fn test_unknown_transport_sid_on_data() {
        let mut core = core_with_session(4096, 8192);
        let mut xmpp = RecordingSink::default();
        let mut ids = SeqIds(0);
        let dir = tempfile::tempdir().unwrap();
        let downloads = DirDownloads(dir.path().to_path_buf());
        let mut ui = NoUi;
        let mut collab = Collaborators {
            xmpp: &mut xmpp,
            ids: &mut ids,
            downloads: &downloads,
            ui: &mut ui,
        };
        let data: Element =
            "<data xmlns='http://jabber.org/protocol/ibb' sid='bogus' seq='0'>AAAA</data>"
                .parse()
                .unwrap();
        handle_ibb(&mut core, &mut collab, &peer(), "d0", data);
        let sent = xmpp.sent.borrow();
        assert_eq!(sent[0].attr("type"), Some("error"));
        let error_child = sent[0].children().next().unwrap();
        let condition = error_child.children().next().unwrap();
        assert_eq!(condition.name(), "item-not-found");
    }
}
