//! Status-line classification.

/// Band a response status falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusClass {
    Informational,
    Success,
    Redirect,
    ClientError,
    ServerError,
    Malformed,
}

impl StatusClass {
    /// Band of a numeric code; anything outside 100-599 is `Malformed`.
    pub fn from_code(code: u16) -> Self {
        match code {
            100..=199 => StatusClass::Informational,
            200..=299 => StatusClass::Success,
            300..=399 => StatusClass::Redirect,
            400..=499 => StatusClass::ClientError,
            500..=599 => StatusClass::ServerError,
            _ => StatusClass::Malformed,
        }
    }
}

/// A classified status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    /// Numeric code, `0` when the line could not be parsed.
    pub code: u16,
    pub class: StatusClass,
}

impl Status {
    const MALFORMED: Status = Status {
        code: 0,
        class: StatusClass::Malformed,
    };

    /// Classify the status line at the start of `head`.
    ///
    /// Only the first line is examined. It must contain `HTTP`, followed by a
    /// space and a decimal code.
    pub fn parse(head: &[u8]) -> Self {
        let line_end = find(head, b"\r\n").unwrap_or(head.len());
        let line = &head[..line_end];

        let Some(marker) = find(line, b"HTTP") else {
            return Self::MALFORMED;
        };
        let after_marker = &line[marker..];
        let Some(space) = after_marker.iter().position(|&b| b == b' ') else {
            return Self::MALFORMED;
        };

        let rest = &after_marker[space..];
        let digits_start = rest.iter().position(|&b| b != b' ').unwrap_or(rest.len());
        let digits = &rest[digits_start..];
        let digits_len = digits.iter().take_while(|b| b.is_ascii_digit()).count();
        if digits_len == 0 || digits_len > 3 {
            return Self::MALFORMED;
        }

        let code = digits[..digits_len]
            .iter()
            .fold(0u16, |acc, &b| acc * 10 + u16::from(b - b'0'));
        match StatusClass::from_code(code) {
            StatusClass::Malformed => Self::MALFORMED,
            class => Status { code, class },
        }
    }
}

/// Position of the first occurrence of `needle` in `haystack`.
pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
