// Copyright (c) 2017-2018 Emmanuel Gil Peyrot <linkmauve@linkmauve.fr>
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Small helper macros for the hand-written `TryFrom<Element>` stanza
//! parsers, in the style of a parser combinator library without the
//! combinators: each macro expands to plain match/return code.

macro_rules! get_attr {
    ($elem:ident, $attr:tt, Required) => {
        match $elem.attr($attr) {
            Some(value) => value.parse().map_err(Into::<crate::error::Error>::into)?,
            None => return Err(crate::error::Error::Missing($attr)),
        }
    };
    ($elem:ident, $attr:tt, Option) => {
        match $elem.attr($attr) {
            Some(value) => Some(value.parse().map_err(Into::<crate::error::Error>::into)?),
            None => None,
        }
    };
}

macro_rules! check_self {
    ($elem:ident, $name:tt, $ns:ident) => {
        if !$elem.is($name, crate::ns::$ns) {
            return Err(crate::error::Error::Mismatch);
        }
    };
}

macro_rules! check_no_unknown_attributes {
    ($elem:ident, $name:tt, [$($attr:tt),*]) => (
        for (_attr, _) in $elem.attrs() {
            $(
                if _attr == $attr {
                    continue;
                }
            )*
            return Err(crate::error::Error::Invalid(
                concat!("unknown attribute on ", $name, " element").to_owned(),
            ));
        }
    );
}

macro_rules! generate_attribute {
    ($(#[$meta:meta])* $elem:ident, $name:tt, {$($(#[$a_meta:meta])* $a:ident => $b:tt),+$(,)?}) => (
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $elem {
            $(
                $(#[$a_meta])*
                $a
            ),+
        }
        impl ::std::str::FromStr for $elem {
            type Err = crate::error::Error;
            fn from_str(s: &str) -> crate::error::Result<$elem> {
                Ok(match s {
                    $($b => $elem::$a),+,
                    _ => return Err(crate::error::Error::Invalid(
                        concat!("unknown value for '", $name, "' attribute").to_owned(),
                    )),
                })
            }
        }
        impl ::std::fmt::Display for $elem {
            fn fmt(&self, fmt: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(fmt, "{}", match self {
                    $($elem::$a => $b),+
                })
            }
        }
        impl ::minidom::IntoAttributeValue for $elem {
            fn into_attribute_value(self) -> Option<String> {
                Some(String::from(match self {
                    $($elem::$a => $b),+
                }))
            }
        }
    );
    ($(#[$meta:meta])* $elem:ident, $name:tt, {$($(#[$a_meta:meta])* $a:ident => $b:tt),+$(,)?}, Default = $default:ident) => (
        generate_attribute!($(#[$meta])* $elem, $name, {$($(#[$a_meta])* $a => $b),+});
        impl ::std::default::Default for $elem {
            fn default() -> $elem {
                $elem::$default
            }
        }
    );
}

macro_rules! generate_id {
    ($(#[$meta:meta])* $elem:ident) => (
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $elem(pub String);
        impl ::std::str::FromStr for $elem {
            type Err = crate::error::Error;
            fn from_str(s: &str) -> crate::error::Result<$elem> {
                Ok($elem(String::from(s)))
            }
        }
        impl ::std::fmt::Display for $elem {
            fn fmt(&self, fmt: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                write!(fmt, "{}", self.0)
            }
        }
        impl ::minidom::IntoAttributeValue for $elem {
            fn into_attribute_value(self) -> Option<String> {
                Some(self.0)
            }
        }
        impl From<&str> for $elem {
            fn from(s: &str) -> $elem {
                $elem(String::from(s))
            }
        }
    );
}

#[cfg(test)]
macro_rules! assert_size (
    ($t:ty, $sz:expr) => (
        assert_eq!(::core::mem::size_of::<$t>(), $sz);
    );
);
