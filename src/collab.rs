// Copyright (c) 2023 xmpp-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Narrow interfaces for the collaborators this core relies on but does
//! not own: the XMPP connection, id generation, download-directory
//! naming, and the user interface. Splitting these out mirrors how
//! [`xmpp::Agent`] keeps its owned client behind a method call rather
//! than exposing it to handler code directly — it lets the state
//! machines in [`crate::session`] and [`crate::transfer`] be driven from
//! tests with in-memory doubles instead of a live connection.

use std::io;
use std::path::{Path, PathBuf};

use minidom::Element;

/// Sends a pre-built envelope. Fire-and-forget: the core never awaits a
/// response to anything it sends.
pub trait XmppSink {
    fn send(&mut self, envelope: Element);
}

/// Generates unique stanza ids for outbound requests.
pub trait IdSource {
    fn new_id(&mut self) -> String;
}

/// Resolves where received files are written.
pub trait Downloads {
    fn downloads_directory(&self) -> PathBuf;
    fn ensure_dir(&self, path: &Path) -> io::Result<()>;
    /// Returns a filename under `dir`, derived from `base`, guaranteed
    /// not to collide with an existing file.
    fn unique_filename(&self, base: &str, dir: &Path) -> PathBuf;
}

/// Surfaces progress and outcomes to the user.
pub trait Ui {
    fn info(&mut self, msg: &str);
    fn error(&mut self, msg: &str);
    fn alert(&mut self);
}
