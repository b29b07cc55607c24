use std::fmt;
use std::str::FromStr;

use chrono::{Local, Offset};

use crate::error::TypeError;

/// Identity and timestamp recorded on the `author` and `committer` lines of
/// a commit.
///
/// Rendered in git's format: `Name <email> <epoch-seconds> <+HHMM>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// Seconds since the UNIX epoch.
    pub when: i64,
    /// Offset from UTC in minutes, positive east of Greenwich.
    pub offset_minutes: i32,
}

impl Signature {
    /// Create a signature with an explicit timestamp.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        when: i64,
        offset_minutes: i32,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when,
            offset_minutes,
        }
    }

    /// Create a signature stamped with the current wall-clock time and the
    /// local timezone offset.
    pub fn now(name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Local::now();
        let offset_minutes = now.offset().fix().local_minus_utc() / 60;
        Self::new(name, email, now.timestamp(), offset_minutes)
    }

    /// Check that the identity can be rendered unambiguously.
    ///
    /// Names and emails must not contain angle brackets or newlines, and the
    /// offset must fit in `±HHMM`.
    pub fn validate(&self) -> Result<(), TypeError> {
        for (field, value) in [("name", &self.name), ("email", &self.email)] {
            if value.contains(['<', '>', '\n', '\0']) {
                return Err(TypeError::InvalidSignature(format!(
                    "{field} contains a forbidden character: {value:?}"
                )));
            }
        }
        if self.offset_minutes.abs() >= 100 * 60 {
            return Err(TypeError::InvalidSignature(format!(
                "timezone offset out of range: {} minutes",
                self.offset_minutes
            )));
        }
        Ok(())
    }

    /// The offset formatted as `+HHMM` / `-HHMM`.
    pub fn offset_string(&self) -> String {
        let sign = if self.offset_minutes < 0 { '-' } else { '+' };
        let abs = self.offset_minutes.unsigned_abs();
        format!("{sign}{:02}{:02}", abs / 60, abs % 60)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.when,
            self.offset_string()
        )
    }
}

impl FromStr for Signature {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| TypeError::InvalidSignature(format!("{reason}: {s:?}"));

        let open = s.find('<').ok_or_else(|| invalid("missing '<'"))?;
        let close = s.rfind('>').ok_or_else(|| invalid("missing '>'"))?;
        if close < open {
            return Err(invalid("misplaced '>'"));
        }

        let name = s[..open].strip_suffix(' ').unwrap_or(&s[..open]);
        let email = &s[open + 1..close];

        let mut rest = s[close + 1..].split_whitespace();
        let when = rest
            .next()
            .ok_or_else(|| invalid("missing timestamp"))?
            .parse::<i64>()
            .map_err(|_| invalid("bad timestamp"))?;
        let offset = rest.next().ok_or_else(|| invalid("missing timezone"))?;
        if rest.next().is_some() {
            return Err(invalid("trailing data"));
        }

        let offset_minutes = parse_offset(offset).ok_or_else(|| invalid("bad timezone"))?;
        Ok(Self::new(name, email, when, offset_minutes))
    }
}

fn parse_offset(s: &str) -> Option<i32> {
    let (sign, digits) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    Some(sign * (hours * 60 + minutes))
}
