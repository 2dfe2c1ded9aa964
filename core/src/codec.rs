//! Byte-level encoding of a [`TodoList`].
//!
//! The format is a JSON array of item records. Empty input is "no data yet"
//! and decodes to an empty list, as does a JSON `null`.

use crate::item::Item;
use crate::list::TodoList;

/// Encodes the whole list, including an empty one, as a JSON array
///
/// # Errors
///
/// Returns the serializer error; with the item types in this crate that does
/// not happen in practice.
pub fn encode(list: &TodoList) -> Result<Vec<u8>, serde_json::Error> {
    let mut bytes = serde_json::to_vec_pretty(list)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decodes a list from bytes
///
/// # Errors
///
/// Returns the parser error when the bytes are neither empty nor a JSON array
/// of item records.
pub fn decode(bytes: &[u8]) -> Result<TodoList, serde_json::Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(TodoList::new());
    }
    let items: Option<Vec<Item>> = serde_json::from_slice(bytes)?;
    Ok(TodoList::from_items(items.unwrap_or_default()))
}
