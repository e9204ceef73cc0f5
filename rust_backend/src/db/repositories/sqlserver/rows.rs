//! Decoding of tiberius rows into [`Table`] values.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use tiberius::{ColumnData, FromSql, Row};

use crate::db::repository::{RepositoryError, RepositoryResult};
use crate::models::{Table, Value};

/// Convert one cell. Every SQL type maps to a [`Value`]; NULLs of any type
/// become [`Value::Null`].
pub fn column_value(data: ColumnData<'static>) -> RepositoryResult<Value> {
    let value = match data {
        ColumnData::U8(v) => v.map(|v| Value::Int(v as i64)),
        ColumnData::I16(v) => v.map(|v| Value::Int(v as i64)),
        ColumnData::I32(v) => v.map(|v| Value::Int(v as i64)),
        ColumnData::I64(v) => v.map(Value::Int),
        ColumnData::F32(v) => v.map(|v| Value::Float(v as f64)),
        ColumnData::F64(v) => v.map(Value::Float),
        ColumnData::Bit(v) => v.map(Value::Bool),
        ColumnData::String(v) => v.map(|s| Value::Text(s.into_owned())),
        ColumnData::Guid(v) => v.map(|g| Value::Text(g.to_string())),
        ColumnData::Binary(v) => v.map(|b| Value::Bytes(b.into_owned())),
        ColumnData::Numeric(v) => v.map(|n| Value::Decimal(n.to_string())),
        ColumnData::Xml(v) => v.map(|x| Value::Text(x.into_owned().into_string())),
        ref data @ (ColumnData::DateTime(_)
        | ColumnData::SmallDateTime(_)
        | ColumnData::DateTime2(_)) => NaiveDateTime::from_sql(data)?.map(Value::DateTime),
        ref data @ ColumnData::Date(_) => NaiveDate::from_sql(data)?.map(Value::Date),
        ref data @ ColumnData::Time(_) => NaiveTime::from_sql(data)?.map(Value::Time),
        ref data @ ColumnData::DateTimeOffset(_) => {
            DateTime::<FixedOffset>::from_sql(data)?.map(Value::DateTimeOffset)
        }
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Append every row to `table`, which must already carry the column names.
pub fn append_rows(table: &mut Table, rows: Vec<Row>) -> RepositoryResult<()> {
    for row in rows {
        let values = row
            .into_iter()
            .map(column_value)
            .collect::<RepositoryResult<Vec<_>>>()?;
        table.push_row(values).map_err(|e| {
            RepositoryError::query(format!("row shape does not match result columns: {}", e))
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use tiberius::numeric::Numeric;

    #[test]
    fn test_scalar_types() {
        assert_eq!(column_value(ColumnData::I32(Some(42))).unwrap(), Value::Int(42));
        assert_eq!(column_value(ColumnData::Bit(Some(true))).unwrap(), Value::Bool(true));
        assert_eq!(column_value(ColumnData::F64(Some(1.5))).unwrap(), Value::Float(1.5));
        assert_eq!(
            column_value(ColumnData::String(Some(Cow::Borrowed("UPS")))).unwrap(),
            Value::Text("UPS".to_string())
        );
    }

    #[test]
    fn test_nulls_of_any_type() {
        assert_eq!(column_value(ColumnData::I64(None)).unwrap(), Value::Null);
        assert_eq!(column_value(ColumnData::String(None)).unwrap(), Value::Null);
        assert_eq!(column_value(ColumnData::DateTime2(None)).unwrap(), Value::Null);
    }

    #[test]
    fn test_numeric_keeps_scale() {
        let value = column_value(ColumnData::Numeric(Some(Numeric::new_with_scale(1250, 2))))
            .unwrap();
        assert_eq!(value, Value::Decimal("12.50".to_string()));
        assert_eq!(value.as_f64(), Some(12.5));
    }
}
