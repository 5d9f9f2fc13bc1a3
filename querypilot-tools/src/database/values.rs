//! Conversion of driver rows into JSON rows.
//!
//! Booleans, small integers and finite floats stay JSON-native. 64-bit
//! integers, decimals, temporal values and UUIDs are carried as text. Values
//! that cannot be decoded become `null` rather than raw wire bytes.

use super::client::Row;
use serde_json::Value;
use sqlx::mysql::MySqlRow;
use sqlx::postgres::types::{Oid, PgInterval, PgMoney, PgTimeTz};
use sqlx::postgres::{PgHasArrayType, PgRow, PgTypeInfo, PgTypeKind, PgValueFormat};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};
use std::collections::HashSet;

/// Wide integers, decimals and temporal values are carried as text
pub(crate) fn as_text(value: impl ToString) -> Value {
    Value::String(value.to_string())
}

pub(crate) fn float_value(value: f64) -> Value {
    serde_json::Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(value.to_string()))
}

pub(crate) fn lossy_text(bytes: Vec<u8>) -> Value {
    Value::String(String::from_utf8_lossy(&bytes).into_owned())
}

/// Row keys for the given column names.
///
/// Repeated names get a numeric suffix (`id`, `id_2`) so no value is
/// overwritten when a join selects two columns with the same name.
pub(crate) fn output_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut keys = Vec::new();

    for name in names {
        let mut key = name.to_string();
        let mut suffix = 2;
        while seen.contains(&key) {
            key = format!("{}_{}", name, suffix);
            suffix += 1;
        }
        if key != name {
            tracing::debug!(column = name, renamed = %key, "Duplicate column name in result");
        }
        seen.insert(key.clone());
        keys.push(key);
    }

    keys
}

/// Text form of a binary `NUMERIC`, for values too large for `Decimal`
pub(crate) fn numeric_text(bytes: &[u8]) -> Option<String> {
    let word = |offset: usize| -> Option<i16> {
        let pair = bytes.get(offset..offset + 2)?;
        Some(i16::from_be_bytes([pair[0], pair[1]]))
    };

    let ndigits = word(0)? as u16 as usize;
    let weight = word(2)? as i32;
    let sign = word(4)? as u16;
    let dscale = word(6)? as u16 as usize;

    match sign {
        0x0000 | 0x4000 => {}
        0xC000 => return Some("NaN".to_string()),
        0xD000 => return Some("Infinity".to_string()),
        0xF000 => return Some("-Infinity".to_string()),
        _ => return None,
    }

    let digits: Vec<i16> = (0..ndigits)
        .map(|i| word(8 + 2 * i))
        .collect::<Option<_>>()?;
    // Base-10000 digit at `position`, where position 0 is the most significant
    let digit = |position: i32| -> i16 {
        usize::try_from(position)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut text = String::new();
    if sign == 0x4000 {
        text.push('-');
    }

    if weight < 0 {
        text.push('0');
    } else {
        text.push_str(&digit(0).to_string());
        for position in 1..=weight {
            text.push_str(&format!("{:04}", digit(position)));
        }
    }

    if dscale > 0 {
        let mut fraction = String::new();
        let mut position = weight + 1;
        while fraction.len() < dscale {
            fraction.push_str(&format!("{:04}", digit(position)));
            position += 1;
        }
        fraction.truncate(dscale);
        text.push('.');
        text.push_str(&fraction);
    }

    Some(text)
}

/// Postgres-style rendering such as `1 year 2 mons 3 days 04:05:06.5`
pub(crate) fn interval_text(interval: &PgInterval) -> String {
    fn unit(count: i64, singular: &str, plural: &str) -> String {
        if count.abs() == 1 {
            format!("{} {}", count, singular)
        } else {
            format!("{} {}", count, plural)
        }
    }

    let mut parts = Vec::new();
    let years = i64::from(interval.months / 12);
    let months = i64::from(interval.months % 12);
    if years != 0 {
        parts.push(unit(years, "year", "years"));
    }
    if months != 0 {
        parts.push(unit(months, "mon", "mons"));
    }
    if interval.days != 0 {
        parts.push(unit(i64::from(interval.days), "day", "days"));
    }

    if interval.microseconds != 0 || parts.is_empty() {
        let sign = if interval.microseconds < 0 { "-" } else { "" };
        let micros = interval.microseconds.unsigned_abs();
        let mut time = format!(
            "{}{:02}:{:02}:{:02}",
            sign,
            micros / 3_600_000_000,
            micros / 60_000_000 % 60,
            micros / 1_000_000 % 60
        );
        let fraction = micros % 1_000_000;
        if fraction > 0 {
            time.push_str(format!(".{:06}", fraction).trim_end_matches('0'));
        }
        parts.push(time);
    }

    parts.join(" ")
}

pub(crate) fn pg_rows_to_json(rows: &[PgRow]) -> Vec<Row> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let keys = output_names(first.columns().iter().map(|column| column.name()));

    rows.iter()
        .map(|row| {
            row.columns()
                .iter()
                .zip(&keys)
                .map(|(column, key)| {
                    let value = pg_value(row, column.ordinal(), column.type_info());
                    (key.clone(), value)
                })
                .collect()
        })
        .collect()
}

fn pg_get<'r, T>(row: &'r PgRow, index: usize) -> Option<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<Option<T>, _>(index).ok().flatten()
}

/// One-dimensional array; `NULL` elements stay `null`
fn pg_array<T>(row: &PgRow, index: usize, element: fn(T) -> Value) -> Option<Value>
where
    T: for<'a> sqlx::Decode<'a, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + PgHasArrayType,
{
    let items = pg_get::<Vec<Option<T>>>(row, index)?;
    Some(Value::Array(
        items
            .into_iter()
            .map(|item| item.map(element).unwrap_or(Value::Null))
            .collect(),
    ))
}

/// Falls back to the raw value when `NUMERIC` exceeds `Decimal`'s range
fn pg_numeric_fallback(row: &PgRow, index: usize) -> Option<Value> {
    let raw = row.try_get_raw(index).ok()?;
    if raw.is_null() {
        return None;
    }
    let text = match raw.format() {
        PgValueFormat::Text => raw.as_str().ok()?.to_string(),
        PgValueFormat::Binary => numeric_text(raw.as_bytes().ok()?)?,
    };
    Some(Value::String(text))
}

fn timestamptz_text(value: chrono::DateTime<chrono::Utc>) -> Value {
    Value::String(value.to_rfc3339())
}

fn pg_value(row: &PgRow, index: usize, type_info: &PgTypeInfo) -> Value {
    let value = match type_info.name() {
        "BOOL" => pg_get::<bool>(row, index).map(Value::Bool),
        "INT2" => pg_get::<i16>(row, index).map(Value::from),
        "INT4" => pg_get::<i32>(row, index).map(Value::from),
        "INT8" => pg_get::<i64>(row, index).map(as_text),
        "OID" => pg_get::<Oid>(row, index).map(|oid| Value::from(oid.0)),
        "FLOAT4" => pg_get::<f32>(row, index).map(|v| float_value(v as f64)),
        "FLOAT8" => pg_get::<f64>(row, index).map(float_value),
        "NUMERIC" => pg_get::<rust_decimal::Decimal>(row, index)
            .map(as_text)
            .or_else(|| pg_numeric_fallback(row, index)),
        "MONEY" => pg_get::<PgMoney>(row, index).map(|money| as_text(money.to_decimal(2))),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "UNKNOWN" | "citext" => {
            pg_get::<String>(row, index).map(Value::String)
        }
        "CHAR" => pg_get::<i8>(row, index).map(|c| Value::String((c as u8 as char).to_string())),
        "JSON" | "JSONB" => pg_get::<Value>(row, index),
        "TIMESTAMPTZ" => pg_get::<chrono::DateTime<chrono::Utc>>(row, index).map(timestamptz_text),
        "TIMESTAMP" => pg_get::<chrono::NaiveDateTime>(row, index).map(as_text),
        "DATE" => pg_get::<chrono::NaiveDate>(row, index).map(as_text),
        "TIME" => pg_get::<chrono::NaiveTime>(row, index).map(as_text),
        "TIMETZ" => pg_get::<PgTimeTz<chrono::NaiveTime, chrono::FixedOffset>>(row, index)
            .map(|v| Value::String(format!("{}{}", v.time, v.offset))),
        "INTERVAL" => pg_get::<PgInterval>(row, index).map(|v| Value::String(interval_text(&v))),
        "UUID" => pg_get::<uuid::Uuid>(row, index).map(as_text),
        "BYTEA" => pg_get::<Vec<u8>>(row, index).map(lossy_text),

        "BOOL[]" => pg_array::<bool>(row, index, Value::Bool),
        "INT2[]" => pg_array::<i16>(row, index, Value::from),
        "INT4[]" => pg_array::<i32>(row, index, Value::from),
        "INT8[]" => pg_array::<i64>(row, index, as_text),
        "FLOAT4[]" => pg_array::<f32>(row, index, |v| float_value(v as f64)),
        "FLOAT8[]" => pg_array::<f64>(row, index, float_value),
        "NUMERIC[]" => pg_array::<rust_decimal::Decimal>(row, index, as_text),
        "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "NAME[]" => {
            pg_array::<String>(row, index, Value::String)
        }
        "UUID[]" => pg_array::<uuid::Uuid>(row, index, as_text),
        "DATE[]" => pg_array::<chrono::NaiveDate>(row, index, as_text),
        "TIMESTAMP[]" => pg_array::<chrono::NaiveDateTime>(row, index, as_text),
        "TIMESTAMPTZ[]" => pg_array::<chrono::DateTime<chrono::Utc>>(row, index, timestamptz_text),
        "JSON[]" | "JSONB[]" => pg_array::<Value>(row, index, |v| v),

        // Enum labels travel as text in both wire formats
        _ if matches!(type_info.kind(), PgTypeKind::Enum(_)) => row
            .try_get_unchecked::<Option<String>, _>(index)
            .ok()
            .flatten()
            .map(Value::String),
        _ => pg_get::<String>(row, index).map(Value::String),
    };

    value.unwrap_or(Value::Null)
}

pub(crate) fn mysql_rows_to_json(rows: &[MySqlRow]) -> Vec<Row> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let keys = output_names(first.columns().iter().map(|column| column.name()));

    rows.iter()
        .map(|row| {
            row.columns()
                .iter()
                .zip(&keys)
                .map(|(column, key)| {
                    let value = mysql_value(row, column.ordinal(), column.type_info().name());
                    (key.clone(), value)
                })
                .collect()
        })
        .collect()
}

fn mysql_get<'r, T>(row: &'r MySqlRow, index: usize) -> Option<T>
where
    T: sqlx::Decode<'r, sqlx::MySql> + sqlx::Type<sqlx::MySql>,
{
    row.try_get::<Option<T>, _>(index).ok().flatten()
}

fn mysql_value(row: &MySqlRow, index: usize, type_name: &str) -> Value {
    let value = match type_name {
        "BOOLEAN" => mysql_get::<bool>(row, index).map(Value::Bool),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" => {
            mysql_get::<i64>(row, index).map(Value::from)
        }
        "BIGINT" => mysql_get::<i64>(row, index).map(as_text),
        "TINYINT UNSIGNED" | "SMALLINT UNSIGNED" | "MEDIUMINT UNSIGNED" | "INT UNSIGNED" => {
            mysql_get::<u64>(row, index).map(Value::from)
        }
        "BIGINT UNSIGNED" | "BIT" => mysql_get::<u64>(row, index).map(as_text),
        "YEAR" => mysql_get::<u16>(row, index)
            .map(Value::from)
            .or_else(|| mysql_get::<i16>(row, index).map(Value::from)),
        "FLOAT" => mysql_get::<f32>(row, index).map(|v| float_value(v as f64)),
        "DOUBLE" => mysql_get::<f64>(row, index).map(float_value),
        // DECIMAL is sent as text in both protocols, so the raw string is safe
        // once the value is wider than `Decimal`
        "DECIMAL" => mysql_get::<rust_decimal::Decimal>(row, index)
            .map(as_text)
            .or_else(|| {
                row.try_get_unchecked::<Option<String>, _>(index)
                    .ok()
                    .flatten()
                    .map(Value::String)
            }),
        "CHAR" | "VARCHAR" | "TEXT" | "TINYTEXT" | "MEDIUMTEXT" | "LONGTEXT" | "ENUM" | "SET" => {
            mysql_get::<String>(row, index).map(Value::String)
        }
        "JSON" => mysql_get::<Value>(row, index),
        "TIMESTAMP" => {
            mysql_get::<chrono::DateTime<chrono::Utc>>(row, index).map(timestamptz_text)
        }
        "DATETIME" => mysql_get::<chrono::NaiveDateTime>(row, index).map(as_text),
        "DATE" => mysql_get::<chrono::NaiveDate>(row, index).map(as_text),
        "TIME" => mysql_get::<chrono::NaiveTime>(row, index).map(as_text),
        "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB" => {
            mysql_get::<Vec<u8>>(row, index).map(lossy_text)
        }
        _ => mysql_get::<String>(row, index).map(Value::String),
    };

    value.unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Binary `NUMERIC` with the given header and base-10000 digits
    fn numeric(weight: i16, sign: u16, dscale: u16, digits: &[i16]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(digits.len() as u16).to_be_bytes());
        bytes.extend_from_slice(&weight.to_be_bytes());
        bytes.extend_from_slice(&sign.to_be_bytes());
        bytes.extend_from_slice(&dscale.to_be_bytes());
        for digit in digits {
            bytes.extend_from_slice(&digit.to_be_bytes());
        }
        bytes
    }

    #[test]
    fn test_wide_integers_become_strings() {
        assert_eq!(as_text(9_007_199_254_740_993i64), Value::String("9007199254740993".into()));
        assert_eq!(as_text(u64::MAX), Value::String(u64::MAX.to_string()));
    }

    #[test]
    fn test_non_finite_floats_become_strings() {
        assert_eq!(float_value(1.5), serde_json::json!(1.5));
        assert_eq!(float_value(f64::NAN), Value::String("NaN".into()));
        assert_eq!(float_value(f64::INFINITY), Value::String("inf".into()));
    }

    #[test]
    fn test_binary_is_decoded_lossily() {
        assert_eq!(lossy_text(b"abc".to_vec()), Value::String("abc".into()));
        assert_eq!(
            lossy_text(vec![0x61, 0xff, 0x62]),
            Value::String("a\u{fffd}b".into())
        );
    }

    #[test]
    fn test_duplicate_column_names_are_suffixed() {
        assert_eq!(output_names(["id", "name", "id"]), vec!["id", "name", "id_2"]);
        assert_eq!(
            output_names(["id", "id", "id_2", "id"]),
            vec!["id", "id_2", "id_2_2", "id_3"]
        );
        assert_eq!(output_names(["a", "b"]), vec!["a", "b"]);
    }

    #[test]
    fn test_numeric_text() {
        assert_eq!(numeric_text(&numeric(1, 0, 3, &[1, 2345, 6780])).as_deref(), Some("12345.678"));
        assert_eq!(numeric_text(&numeric(-1, 0, 4, &[5])).as_deref(), Some("0.0005"));
        assert_eq!(numeric_text(&numeric(-2, 0, 8, &[1])).as_deref(), Some("0.00000001"));
        assert_eq!(numeric_text(&numeric(0, 0x4000, 2, &[7, 5000])).as_deref(), Some("-7.50"));
        assert_eq!(numeric_text(&numeric(0, 0, 0, &[])).as_deref(), Some("0"));
        assert_eq!(numeric_text(&numeric(0, 0xC000, 0, &[])).as_deref(), Some("NaN"));
    }

    #[test]
    fn test_numeric_wider_than_decimal() {
        // 12345678901234567890123456789012345
        let bytes = numeric(8, 0, 0, &[123, 4567, 8901, 2345, 6789, 123, 4567, 8901, 2345]);
        assert_eq!(
            numeric_text(&bytes).as_deref(),
            Some("12345678901234567890123456789012345")
        );

        let bytes = numeric(10, 0, 0, &[1]);
        assert_eq!(numeric_text(&bytes), Some(format!("1{}", "0".repeat(40))));
    }

    #[test]
    fn test_truncated_numeric_is_undecodable() {
        assert_eq!(numeric_text(&[0, 1, 0]), None);
        assert_eq!(numeric_text(&numeric(0, 0, 0, &[1])[..9]), None);
    }

    #[test]
    fn test_interval_text() {
        let interval = |months, days, microseconds| PgInterval {
            months,
            days,
            microseconds,
        };

        assert_eq!(interval_text(&interval(0, 2, 0)), "2 days");
        assert_eq!(interval_text(&interval(0, 0, 0)), "00:00:00");
        assert_eq!(
            interval_text(&interval(14, 3, 14_706_500_000)),
            "1 year 2 mons 3 days 04:05:06.5"
        );
        assert_eq!(interval_text(&interval(1, 1, 0)), "1 mon 1 day");
        assert_eq!(interval_text(&interval(0, 0, -90_000_000)), "-00:01:30");
    }
}
