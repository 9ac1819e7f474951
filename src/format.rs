//! Environment Variable Format
//!
//! This module documents how values are laid out as flat `KEY=VALUE`
//! environment variables by this library.
//!
//! # Overview
//!
//! An environment is a flat set of string pairs. To carry structured
//! configuration through it, every leaf of a struct or map is given a key
//! that spells its path from the root, and every leaf value is rendered as
//! text.
//!
//! # Keys
//!
//! A key is the sequence of path segments joined by `.`:
//!
//! | Position | Segment | Example |
//! |----------|---------|---------|
//! | Struct field | Field name, uppercased | `port_name` → `PORT_NAME` |
//! | Map entry | Stringified map key, uppercased on output | `http` → `HTTP` |
//! | Sequence element | Decimal index from `0` | `ADDR.0` |
//!
//! **Rules**:
//! - `#[serde(rename = "...")]` changes the segment; the result is still
//!   uppercased on output
//! - Fields whose name starts with `_` are internal and never read or
//!   written; decoding gives them the zero value of their type
//! - A prefix, when given, is prepended verbatim to every key on output and
//!   stripped from every key on input; keys without it are invisible
//! - Nothing escapes `.` inside a segment, so map keys containing a dot do not
//!   round-trip (see [Maps](#maps))
//!
//! # Scalars
//!
//! | Type | Written as | Read from |
//! |------|------------|-----------|
//! | `bool` | `true` / `false` | `true` in any case is true, anything else false |
//! | Integers | Decimal | Decimal with optional sign, wrapped to the target width |
//! | `String`, `char` | Verbatim | Verbatim |
//! | Unit enum variant | Variant name | Variant name |
//!
//! A missing string reads as `""` and a missing bool as `false`. A missing
//! integer is an error, since the empty string is not a number.
//!
//! Floats and byte buffers are not supported. Nested inside a struct or map
//! they are skipped on output; reading them is an error.
//!
//! # Sequences
//!
//! ## Scalar sequences
//!
//! A sequence of scalars is a single variable holding one CSV record
//! (RFC 4180, comma separator):
//!
//! ```text
//! TAGS=web,public
//! NOTES="a time, comma",omg
//! EMPTY=
//! ```
//!
//! - Fields containing `,`, `"`, a line break, or leading whitespace are quoted
//! - A quote inside a quoted field is doubled: `"say ""hi"""`
//! - A record made of one empty string is written as `""` so it is told
//!   apart from an empty sequence
//! - An empty value reads as an empty sequence
//!
//! ## Other sequences
//!
//! Elements that are structs, maps or sequences are indexed:
//!
//! ```text
//! ADDR.0.KIND=1
//! ADDR.0.STREET=Main
//! ADDR.1.KIND=2
//! ADDR.1.STREET=High
//! ```
//!
//! On input, elements are read from index `0` upward and reading stops at the
//! first index with nothing at or below it. A gap therefore truncates the
//! sequence silently:
//!
//! ```text
//! ITEMS.0.NAME=a
//! ITEMS.2.NAME=c      # never read: ITEMS.1 is missing
//! ```
//!
//! A sequence of sequences stores each inner scalar sequence as a CSV record
//! at its index:
//!
//! ```text
//! ARR_LIST.0=a,b
//! ARR_LIST.1="a time, comma",omg
//! ```
//!
//! An empty sequence is written as `KEY=` whatever its element type, so it
//! reads back as empty rather than missing. That entry is consumed, and
//! purged, like any other:
//!
//! ```text
//! ITEMS=              # items: Vec<Item> = []
//! ```
//!
//! A `None` element cannot be written, since nothing would mark its index.
//! A `None` next to a present scalar is rejected; a sequence made entirely
//! of `None` writes nothing, because it cannot be told apart from a sequence
//! of absent structs.
//!
//! # Maps
//!
//! Each entry becomes a subtree at its key:
//!
//! ```text
//! PORT_NAME.80=http
//! PORT_NAME.443=https
//! ```
//!
//! On input, the keys of a map are the distinct segments found right after
//! the map path, visited in lexicographic order. Map keys must be scalars.
//!
//! A key is cut at its first `.`, so `HEADERS.X.Y=1` is read as key `X` with
//! a nested value `Y`. When the map holds scalars or scalar sequences that
//! nested value cannot be read, and decoding fails with
//! [`Error::AmbiguousMapKey`](crate::Error::AmbiguousMapKey) instead of
//! inventing an empty entry.
//!
//! # Options
//!
//! `None` writes nothing. On input an option is `Some` when its own key or
//! any key below it is present:
//!
//! ```text
//! TLS.CERT=/etc/cert.pem   # tls: Some(Tls { cert, .. })
//!                          # tls: None when no TLS or TLS.* key exists
//! ```
//!
//! Presence is segment aware: `PORT_NAME` does not make `port` present.
//!
//! # Consumption
//!
//! Every key read during a decode is recorded. With
//! [`EnvOptions::unset_consumed`](crate::EnvOptions::unset_consumed), those
//! keys are removed from the store afterwards. Keys that were present but
//! never read are left alone.
//!
//! # Example
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use std::collections::BTreeMap;
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Service {
//!     name: String,
//!     tags: Vec<String>,
//!     ports: BTreeMap<u16, String>,
//!     backends: Vec<Backend>,
//! }
//!
//! #[derive(Serialize, Deserialize, Debug, PartialEq)]
//! struct Backend {
//!     host: String,
//!     weight: u8,
//! }
//!
//! let service: Service = serde_environ::from_entries([
//!     "NAME=edge",
//!     "TAGS=public,\"eu, west\"",
//!     "PORTS.80=http",
//!     "PORTS.443=https",
//!     "BACKENDS.0.HOST=a.internal",
//!     "BACKENDS.0.WEIGHT=3",
//!     "BACKENDS.1.HOST=b.internal",
//!     "BACKENDS.1.WEIGHT=1",
//! ])
//! .unwrap();
//!
//! assert_eq!(service.tags, vec!["public", "eu, west"]);
//! assert_eq!(service.ports[&443], "https");
//! assert_eq!(service.backends[1].host, "b.internal");
//! ```
