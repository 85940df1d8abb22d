// Copyright (c) 2023 xmpp-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Jingle (XEP-0166/XEP-0234) file-transfer negotiation and In-Band
//! Bytestream (XEP-0047) transport core.
//!
//! This crate implements the receive side only: it accepts an incoming
//! `session-initiate` offering a file over IBB, negotiates it, and drives
//! the bytestream through to completion. It owns no network connection —
//! [`collab::XmppSink`] and friends are the seams through which an
//! embedding XMPP client drives it.

#[macro_use]
mod util;

pub mod collab;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod ns;
pub mod registry;
pub mod session;
pub mod stanza;
pub mod transfer;

pub use collab::{Downloads, IdSource, Ui, XmppSink};
pub use config::Config;
pub use dispatch::{Collaborators, Core};
pub use error::{Error, Result};
