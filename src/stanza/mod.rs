// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Wire-level stanza types, one module per XEP, following the layout of
//! the parser crate this core is descended from.

pub mod envelope;
pub mod ibb;
pub mod jingle;
pub mod jingle_ft;
pub mod jingle_ibb;
pub mod jingle_message;
