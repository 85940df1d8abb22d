// Copyright (c) 2023 xmpp-rs contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Configuration the core needs beyond what's negotiated on the wire.

use jid::Jid;

/// The local identity and any process-wide knobs the state machines need
/// but that the XEPs don't negotiate.
#[derive(Debug, Clone)]
pub struct Config {
    pub local_jid: Jid,
}

impl Config {
    pub fn new(local_jid: Jid) -> Config {
        Config { local_jid }
    }
}
