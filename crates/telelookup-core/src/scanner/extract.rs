/// Fast positional field extraction from one raw dump line.
///
/// Each line is a dict-literal-like textual record, e.g.
///
/// ```text
/// {'id': 12345678, 'username': 'johndoe', 'phone': '989123456789', 'lang': 'en'}
/// ```
///
/// This is a fixed micro-format, not a grammar: extraction is plain substring
/// search for the three key markers and their delimiters. The identifier
/// value runs from the `'id':` marker to the next comma; username and phone
/// values sit between the next pair of single quotes after their markers.
/// Nothing about the surrounding structure is validated, and any extra
/// fields on the line are ignored.
use crate::model::Record;

const ID_MARKER: &str = "'id':";
const USERNAME_MARKER: &str = "'username':";
const PHONE_MARKER: &str = "'phone':";

/// Extract a [`Record`] from one line, or `None` if any marker or delimiter
/// is missing.
///
/// A `None` is not an error — malformed lines are expected in large dumps
/// and are simply skipped by the scanner. All lookups here are bounds-safe
/// substring searches, so extraction can never panic on hostile input.
pub fn extract(line: &str) -> Option<Record> {
    let identifier = value_until_comma(line, ID_MARKER)?;
    let username = quoted_value(line, USERNAME_MARKER)?;
    let phone = quoted_value(line, PHONE_MARKER)?;
    Some(Record::new(identifier, username, phone))
}

/// Substring after `marker` up to the next comma, whitespace-trimmed.
fn value_until_comma<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = &line[line.find(marker)? + marker.len()..];
    let end = rest.find(',')?;
    Some(rest[..end].trim())
}

/// Substring between the next pair of single quotes after `marker`.
fn quoted_value<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = &line[line.find(marker)? + marker.len()..];
    let open = rest.find('\'')?;
    let rest = &rest[open + 1..];
    let close = rest.find('\'')?;
    Some(&rest[..close])
}
