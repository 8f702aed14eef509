//! Shift specifications: validated, immutable parse results.
//!
//! [`ShiftSpec::parse`] checks a scanned pattern against the fixed
//! unit ordering, anchor applicability, and per-unit value rules, and
//! stores one [`PartDef`] per unit. A spec never changes after
//! construction and can be applied to any number of timestamps from
//! any number of threads.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, ShiftError};
use crate::scan::{self, Anchor, Clause, Sign, Unit, UNIT_ORDER};

// ── Part definitions ────────────────────────────────────────────────────────

/// One adjustment directive for a single calendar unit.
///
/// When `absolute`, `value` replaces the field outright; otherwise it
/// is added to the field's current value, with calendar carry soaking
/// up any overflow. `from_begin`/`from_end` mark the value as counted
/// from the start or end of the containing period; an anchor implies
/// `absolute`, and the two anchors never hold together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PartDef {
    /// Whether the unit appears in the pattern at all.
    pub active: bool,
    /// The signed operand; meaning depends on the flags.
    pub value: i32,
    /// Set the field (`true`) or add to it (`false`).
    pub absolute: bool,
    /// `^` — counted from the period start (week only).
    pub from_begin: bool,
    /// `$` — counted from the period end (day and week only).
    pub from_end: bool,
}

// ── Shift specifications ────────────────────────────────────────────────────

/// A parsed shift pattern: up to eleven per-unit directives.
///
/// Blank (or whitespace-only) patterns produce the identity spec,
/// which returns every timestamp unchanged.
///
/// Specs serialize as their pattern string and deserialize by
/// parsing, so they drop directly into serde-backed configuration.
///
/// # Examples
///
/// ```
/// use calshift::ShiftSpec;
///
/// // 06:00 on the first Sunday of the current month
/// let spec = ShiftSpec::parse("W^1 w0 h6 m0 s0").unwrap();
/// assert_eq!(spec.pattern(), "W^1 w0 h6 m0 s0");
/// assert!(!spec.is_identity());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSpec {
    pattern: String,
    empty: bool,
    pub(crate) year: PartDef,
    pub(crate) month: PartDef,
    pub(crate) day: PartDef,
    pub(crate) week: PartDef,
    pub(crate) weekday: PartDef,
    pub(crate) hour: PartDef,
    pub(crate) minute: PartDef,
    pub(crate) second: PartDef,
    pub(crate) milli: PartDef,
    pub(crate) micro: PartDef,
    pub(crate) nano: PartDef,
}

impl ShiftSpec {
    /// Parse a pattern into a spec.
    ///
    /// The pattern is trimmed first; a blank result is the identity
    /// transform. Otherwise the whole string must be covered by
    /// clauses in the fixed `YMDWwhmslun` unit order, each unit at
    /// most once.
    ///
    /// # Errors
    ///
    /// [`ShiftError::Syntax`] when the clause grammar does not cover
    /// the whole pattern, [`ShiftError::Sequence`] for duplicate or
    /// out-of-order units, [`ShiftError::Anchor`] for misapplied
    /// `^`/`$`, and [`ShiftError::Value`] for out-of-domain
    /// magnitudes. Nothing is built on failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use calshift::{ShiftError, ShiftSpec};
    ///
    /// assert!(ShiftSpec::parse("Y+1 M+2 D$3").is_ok());
    /// assert!(matches!(ShiftSpec::parse("D0"), Err(ShiftError::Value { .. })));
    /// ```
    pub fn parse(pattern: &str) -> Result<Self> {
        let trimmed = pattern.trim();
        let mut spec = ShiftSpec {
            pattern: trimmed.to_string(),
            empty: trimmed.is_empty(),
            year: PartDef::default(),
            month: PartDef::default(),
            day: PartDef::default(),
            week: PartDef::default(),
            weekday: PartDef::default(),
            hour: PartDef::default(),
            minute: PartDef::default(),
            second: PartDef::default(),
            milli: PartDef::default(),
            micro: PartDef::default(),
            nano: PartDef::default(),
        };
        if spec.empty {
            return Ok(spec);
        }

        let mut cursor = 0usize;
        for clause in scan::scan(trimmed)? {
            cursor = advance_cursor(cursor, &clause)?;
            *spec.part_mut(clause.unit) = build_part(&clause)?;
        }
        Ok(spec)
    }

    /// Whether this spec is the identity transform (blank pattern).
    pub fn is_identity(&self) -> bool {
        self.empty
    }

    /// The trimmed source pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The directive stored for `unit`; inactive when the pattern
    /// does not mention that unit.
    pub fn part(&self, unit: Unit) -> &PartDef {
        match unit {
            Unit::Year => &self.year,
            Unit::Month => &self.month,
            Unit::Day => &self.day,
            Unit::Week => &self.week,
            Unit::Weekday => &self.weekday,
            Unit::Hour => &self.hour,
            Unit::Minute => &self.minute,
            Unit::Second => &self.second,
            Unit::Milli => &self.milli,
            Unit::Micro => &self.micro,
            Unit::Nano => &self.nano,
        }
    }

    fn part_mut(&mut self, unit: Unit) -> &mut PartDef {
        match unit {
            Unit::Year => &mut self.year,
            Unit::Month => &mut self.month,
            Unit::Day => &mut self.day,
            Unit::Week => &mut self.week,
            Unit::Weekday => &mut self.weekday,
            Unit::Hour => &mut self.hour,
            Unit::Minute => &mut self.minute,
            Unit::Second => &mut self.second,
            Unit::Milli => &mut self.milli,
            Unit::Micro => &mut self.micro,
            Unit::Nano => &mut self.nano,
        }
    }
}

impl FromStr for ShiftSpec {
    type Err = ShiftError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ShiftSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}

impl Serialize for ShiftSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.pattern)
    }
}

impl<'de> Deserialize<'de> for ShiftSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ── Clause validation ───────────────────────────────────────────────────────

/// Advance the unit-order cursor to `clause`'s unit. A unit not in the
/// remaining order — a duplicate or an out-of-order occurrence — fails
/// with the letters that would still have been admissible.
fn advance_cursor(cursor: usize, clause: &Clause) -> Result<usize> {
    let remaining = &UNIT_ORDER[cursor..];
    match remaining.iter().position(|&u| u == clause.unit) {
        Some(pos) => Ok(cursor + pos + 1),
        None => Err(ShiftError::Sequence {
            clause: clause.text.clone(),
            expected: remaining.iter().map(|u| u.letter()).collect(),
        }),
    }
}

/// Check a clause's anchors and value against its unit's rules and
/// produce the part definition.
fn build_part(clause: &Clause) -> Result<PartDef> {
    let mut part = PartDef {
        active: true,
        value: clause.magnitude,
        absolute: clause.sign.is_none(),
        from_begin: false,
        from_end: false,
    };
    if clause.sign == Some(Sign::Minus) {
        part.value = -part.value;
    }

    for &anchor in &clause.anchors {
        match (anchor, clause.unit) {
            (Anchor::FromBegin, Unit::Week) => part.from_begin = true,
            (Anchor::FromEnd, Unit::Day | Unit::Week) => part.from_end = true,
            _ => {
                return Err(ShiftError::Anchor {
                    clause: clause.text.clone(),
                    reason: format!(
                        "'{}' is not allowed on unit '{}'",
                        anchor.mark(),
                        clause.unit.letter()
                    ),
                });
            }
        }
    }

    if (part.from_begin || part.from_end) && !part.absolute {
        return Err(ShiftError::Anchor {
            clause: clause.text.clone(),
            reason: "an anchor cannot combine with a relative sign".to_string(),
        });
    }
    if part.from_begin && part.from_end {
        return Err(ShiftError::Anchor {
            clause: clause.text.clone(),
            reason: "'^' and '$' cannot combine".to_string(),
        });
    }

    match clause.unit {
        Unit::Month | Unit::Day => {
            if part.absolute && part.value == 0 {
                return Err(value_error(clause, "0 is not a valid field value"));
            }
        }
        // Relative signed week 0 stays legal; it shifts nothing but
        // still routes evaluation through the weekday resolution.
        Unit::Week => {
            if part.absolute && part.value == 0 {
                return Err(value_error(clause, "0 is not a valid week"));
            }
        }
        Unit::Weekday => {
            if !(0..=6).contains(&part.value) {
                return Err(value_error(clause, "weekday must be in 0..=6 (0 = Sunday)"));
            }
        }
        _ => {}
    }

    Ok(part)
}

fn value_error(clause: &Clause, reason: &str) -> ShiftError {
    ShiftError::Value {
        clause: clause.text.clone(),
        reason: reason.to_string(),
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
