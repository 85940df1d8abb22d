// Copyright (c) 2017 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Wire types for the XEP-0234 Jingle File Transfer description, trimmed
//! to the text children this core's wire grammar actually carries:
//! `media-type`, `date`, `name`, `size`, and an optional `hash`. Real
//! XEP-0234 nests an algorithm-qualified `<hash>` in the `urn:xmpp:hashes:2`
//! namespace and adds `desc`/`range`/checksum support; none of that is
//! part of this core, so `hash` and `date` are carried as opaque strings.

use minidom::Element;

use crate::error::{Error, Result};
use crate::ns;

/// A `file` element as found inside a file-transfer `description`.
#[derive(Debug, Clone, Default)]
pub struct File {
    pub media_type: Option<String>,
    pub name: Option<String>,
    pub date: Option<String>,
    pub size: Option<u64>,
    pub hash: Option<String>,
}

impl TryFrom<Element> for File {
    type Error = Error;

    fn try_from(elem: Element) -> Result<File> {
        check_self!(elem, "file", JINGLE_FT);

        let mut file = File::default();
        for child in elem.children() {
            match child.name() {
                "media-type" => file.media_type = Some(child.text()),
                "name" => file.name = Some(child.text()),
                "date" => file.date = Some(child.text()),
                "size" => {
                    file.size = Some(child.text().parse()?);
                }
                "hash" => file.hash = Some(child.text()),
                _ => {}
            }
        }
        Ok(file)
    }
}

impl From<File> for Element {
    fn from(file: File) -> Element {
        Element::builder("file", ns::JINGLE_FT)
            .append_all(
                file.media_type
                    .map(|v| Element::builder("media-type", ns::JINGLE_FT).append(v)),
            )
            .append_all(
                file.name
                    .map(|v| Element::builder("name", ns::JINGLE_FT).append(v)),
            )
            .append_all(
                file.date
                    .map(|v| Element::builder("date", ns::JINGLE_FT).append(v)),
            )
            .append_all(
                file.size
                    .map(|v| Element::builder("size", ns::JINGLE_FT).append(format!("{}", v))),
            )
            .append_all(
                file.hash
                    .map(|v| Element::builder("hash", ns::JINGLE_FT).append(v)),
            )
            .build()
    }
}

/// The `description` wrapper, holding the single `file` child.
#[derive(Debug, Clone)]
pub struct Description {
    pub file: File,
}

impl TryFrom<Element> for Description {
    type Error = Error;

    fn try_from(elem: Element) -> Result<Description> {
        check_self!(elem, "description", JINGLE_FT);
        let mut file = None;
        for child in elem.children() {
            if child.is("file", ns::JINGLE_FT) {
                file = Some(File::try_from(child.clone())?);
            }
        }
        match file {
            Some(file) => Ok(Description { file }),
            None => Err(Error::Missing("file")),
        }
    }
}

impl From<Description> for Element {
    fn from(description: Description) -> Element {
        Element::builder("description", ns::JINGLE_FT)
            .append(Element::from(description.file))
            .build()
    }
}
