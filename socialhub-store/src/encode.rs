use chrono::{DateTime, Utc};

pub(crate) fn encode_dt(dt: &DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

pub(crate) fn decode_dt(column: usize, millis: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(column, millis))
}

pub(crate) fn decode_optional_dt(
    column: usize,
    millis: Option<i64>,
) -> rusqlite::Result<Option<DateTime<Utc>>> {
    millis.map(|m| decode_dt(column, m)).transpose()
}

/// Escape `%`, `_` and `\` so user input is matched literally by `LIKE ... ESCAPE '\'`.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}
