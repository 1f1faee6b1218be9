//! Coercion of decoded XML-RPC values into the types the accessors return.
//!
//! The target type is fixed by the accessor; a value of any other shape is a
//! decode error, never a default.

use rtorrent_types::RTorrentError;

use crate::xmlrpc::Value;

pub(crate) fn into_int(value: Value) -> Result<i64, RTorrentError> {
    match value {
        Value::Int(i) => Ok(i),
        other => Err(unexpected("int", &other)),
    }
}

pub(crate) fn into_string(value: Value) -> Result<String, RTorrentError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(unexpected("string", &other)),
    }
}

pub(crate) fn into_string_list(value: Value) -> Result<Vec<String>, RTorrentError> {
    match value {
        Value::Array(values) => values.into_iter().map(into_string).collect(),
        other => Err(unexpected("array", &other)),
    }
}

/// Pick the string at `index` of a list response.
///
/// Elements may be plain strings or single-column rows as returned by the
/// `*.multicall` commands; a row yields its first column.
pub(crate) fn into_string_at(value: Value, index: usize) -> Result<String, RTorrentError> {
    let mut values = match value {
        Value::Array(values) => values,
        other => return Err(unexpected("array", &other)),
    };
    let len = values.len();
    if index >= len {
        return Err(RTorrentError::IndexOutOfRange { index, len });
    }

    match values.swap_remove(index) {
        Value::String(s) => Ok(s),
        Value::Array(row) => match row.into_iter().next() {
            Some(first) => into_string(first),
            None => Err(RTorrentError::Decode(format!(
                "row {index} of list response is empty"
            ))),
        },
        other => Err(unexpected("string", &other)),
    }
}

fn unexpected(expected: &str, found: &Value) -> RTorrentError {
    RTorrentError::Decode(format!(
        "expected {expected}, found {}",
        found.type_name()
    ))
}
