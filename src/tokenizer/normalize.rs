//! Field normalization applied to every closed field.

use crate::constants::{BYTE_ORDER_MARK, EMPTY_QUOTED_FIELD};
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// Unicode whitespace plus the byte-order mark, which exports often prepend
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\x{FEFF}]+").expect("whitespace pattern is valid"));

static NON_PRINTABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^ -~]+").expect("printable ASCII pattern is valid"));

/// Normalize a raw field value
///
/// Whitespace runs collapse to a single space, characters outside printable
/// ASCII are removed when `filter_non_printable` is set, and the result is
/// trimmed. A field holding exactly a doubled quote becomes empty.
pub fn normalize_field(raw: &str, filter_non_printable: bool) -> String {
    if raw == EMPTY_QUOTED_FIELD {
        return String::new();
    }

    let collapsed = WHITESPACE_RUN.replace_all(raw, " ");
    let filtered: Cow<'_, str> = if filter_non_printable {
        Cow::Owned(NON_PRINTABLE.replace_all(&collapsed, "").into_owned())
    } else {
        collapsed
    };

    filtered.trim_matches(is_blank).to_string()
}

fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == BYTE_ORDER_MARK
}
