//! Storing geometry blobs in SQLite BLOB columns.
//!
//! Reading a column decodes with the [default_registry]; read a `Vec<u8>` and
//! call [decode_with](crate::blob::decode_with) to use another registry.
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::ToSql;

use crate::blob::{decode_with, GeometryBlob};
use crate::registry::default_registry;

impl ToSql for GeometryBlob {
    #[inline]
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.to_bytes().map_err(|e| {
            rusqlite::Error::ToSqlConversionFailure(Box::new(e))
        })?))
    }
}

impl FromSql for GeometryBlob {
    #[inline]
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let bytes = value.as_blob()?;
        decode_with(default_registry(), bytes).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}
