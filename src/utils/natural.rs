//! Natural ("human") string ordering.
//!
//! Basic-block labels and switch case expressions are compared chunk by chunk:
//! runs of ASCII digits compare by numeric value, everything else compares
//! lexically. This yields `B2 < B10` and `-3 < 1 < 20`, which is the order every
//! iteration over a [`Cfg`](crate::analysis::Cfg) is defined in.
//!
//! A `-` directly in front of a digit run is read as a sign when it starts the
//! string or follows a character that is neither alphanumeric nor `_`. That way
//! case expressions such as `"-1"` or `"-1, 4"` order numerically while labels
//! like `bb-2` keep their dash as text.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Text(&'a str),
    Number { negative: bool, digits: &'a str },
}

impl Chunk<'_> {
    fn cmp_number(neg_a: bool, a: &str, neg_b: bool, b: &str) -> Ordering {
        let a = a.trim_start_matches('0');
        let b = b.trim_start_matches('0');
        let magnitude = a.len().cmp(&b.len()).then_with(|| a.cmp(b));

        // -0 and 0 are the same value
        let neg_a = neg_a && !a.is_empty();
        let neg_b = neg_b && !b.is_empty();

        match (neg_a, neg_b) {
            (false, false) => magnitude,
            (true, true) => magnitude.reverse(),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
        }
    }
}

impl Ord for Chunk<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (
                Chunk::Number {
                    negative: na,
                    digits: da,
                },
                Chunk::Number {
                    negative: nb,
                    digits: db,
                },
            ) => Chunk::cmp_number(*na, da, *nb, db),
            // Numbers sort before text
            (Chunk::Number { .. }, Chunk::Text(_)) => Ordering::Less,
            (Chunk::Text(_), Chunk::Number { .. }) => Ordering::Greater,
            (Chunk::Text(a), Chunk::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Chunk<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Iterator splitting a string into text and number chunks.
struct Chunks<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Chunks<'a> {
    fn new(input: &'a str) -> Self {
        Chunks { input, pos: 0 }
    }

    fn sign_allowed(&self, at: usize) -> bool {
        if at == 0 {
            return true;
        }
        self.input[..at]
            .chars()
            .next_back()
            .is_some_and(|c| !c.is_alphanumeric() && c != '_')
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = Chunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let bytes = self.input.as_bytes();
        let start = self.pos;
        if start >= bytes.len() {
            return None;
        }

        let signed = bytes[start] == b'-'
            && bytes.get(start + 1).is_some_and(u8::is_ascii_digit)
            && self.sign_allowed(start);

        if signed || bytes[start].is_ascii_digit() {
            let digits_start = if signed { start + 1 } else { start };
            let mut end = digits_start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            self.pos = end;
            return Some(Chunk::Number {
                negative: signed,
                digits: &self.input[digits_start..end],
            });
        }

        let mut end = start;
        while end < bytes.len() {
            if bytes[end].is_ascii_digit() {
                break;
            }
            if bytes[end] == b'-'
                && end > start
                && bytes.get(end + 1).is_some_and(u8::is_ascii_digit)
                && self.sign_allowed(end)
            {
                break;
            }
            end += 1;
        }
        // Split points are ASCII, so `end` is always a char boundary.
        self.pos = end;
        Some(Chunk::Text(&self.input[start..end]))
    }
}

/// Compares two strings in natural order.
///
/// Digit runs are compared by value, so `"B2"` sorts before `"B10"`. Strings whose
/// chunks compare equal (such as `"B01"` and `"B1"`) fall back to plain byte order,
/// which keeps the ordering total and consistent with `==`.
///
/// # Examples
///
/// ```rust
/// use std::cmp::Ordering;
/// use restructure::utils::natural_cmp;
///
/// assert_eq!(natural_cmp("B2", "B10"), Ordering::Less);
/// assert_eq!(natural_cmp("-1", "0"), Ordering::Less);
/// assert_eq!(natural_cmp("if.end", "if.end"), Ordering::Equal);
/// ```
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => match x.cmp(&y) {
                Ordering::Equal => continue,
                other => return other,
            },
        }
    }
}

/// Sorts a slice of strings in place using [`natural_cmp`].
pub fn natural_sort<S: AsRef<str>>(items: &mut [S]) {
    items.sort_by(|a, b| natural_cmp(a.as_ref(), b.as_ref()));
}
