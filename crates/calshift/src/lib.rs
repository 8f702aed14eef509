//! # calshift
//!
//! Calendar-relative time shifts as small, validated patterns.
//!
//! A pattern such as `"W^1 w0 h6 m0 s0"` ("06:00 on the first Sunday
//! of the month") or `"D$1"` ("the last day of the month") parses into
//! an immutable [`ShiftSpec`], which is then applied to a
//! [`chrono::DateTime`] to produce the shifted timestamp. Patterns
//! express "a point in time relative to another point in time", which
//! makes them safe to embed in configuration instead of code.
//!
//! ## Pattern grammar
//!
//! One or more clauses `<unit><anchor?><sign?><digits>`, in the fixed
//! unit order `Y M D W w h m s l u n`, each unit at most once:
//!
//! | letter | unit    | letter | unit        |
//! |--------|---------|--------|-------------|
//! | `Y`    | year    | `m`    | minute      |
//! | `M`    | month   | `s`    | second      |
//! | `D`    | day     | `l`    | millisecond |
//! | `W`    | week    | `u`    | microsecond |
//! | `w`    | weekday | `n`    | nanosecond  |
//! | `h`    | hour    |        |             |
//!
//! A bare number sets the field (`h6`); a signed number adds to it
//! with calendar carry (`M+22` rolls into later years). `^` and `$`
//! anchor day and week clauses to the start or end of their containing
//! period: `D$1` is the last day of the month, `W^2 w1` the second
//! Monday of the month, `W$1 w5` the last Friday. Weekdays run
//! 0 = Sunday … 6 = Saturday. A blank pattern is the identity shift.
//!
//! ## Example
//!
//! ```
//! use calshift::ShiftSpec;
//! use chrono::DateTime;
//!
//! // 06:00 on the first Sunday of the current month
//! let spec = ShiftSpec::parse("W^1 w0 h6 m0 s0")?;
//! let t = DateTime::parse_from_rfc3339("2021-01-20T14:55:22+03:00")?;
//! assert_eq!(spec.apply(t).to_rfc3339(), "2021-01-03T06:00:00+03:00");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Parsing and evaluation are pure and lock-free; share a
//! [`PatternCache`] to parse each distinct pattern once.
//!
//! ## Modules
//!
//! - [`scan`] — pattern string → clause list (the micro-grammar)
//! - [`spec`] — clause list → validated [`ShiftSpec`]
//! - [`cache`] — memoized parsing behind an explicit [`PatternCache`]
//! - [`error`] — error types
//!
//! Evaluation lives on [`ShiftSpec::apply`].

pub mod cache;
pub mod error;
pub mod scan;
pub mod spec;

mod apply;

pub use cache::PatternCache;
pub use error::{Result, ShiftError};
pub use scan::Unit;
pub use spec::{PartDef, ShiftSpec};
