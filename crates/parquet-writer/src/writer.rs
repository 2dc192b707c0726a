//! The batch writer (spec.md §4.8): `open` / repeated `append_row` /
//! `close`, row-buffering with row-group flush cadence, grounded on the
//! teacher's `write_parquet_into` shape (construct once, feed rows,
//! `close()` finalizes) generalized from Arrow batches to shredded rows.

use std::io::{Seek, Write};

use parquet_core::shred::{shred, ColumnData, RowBuffer};
use parquet_core::{CompressionName, Schema, Value};
use parquet_format::{self as format, RowGroup};
use tracing::debug;

use crate::error::{WriterError, WriterResult};
use crate::properties::WriterProperties;

/// A synchronous batch writer over an arbitrary `Write + Seek` sink.
///
/// Owns its output stream exclusively from construction to [`Writer::close`]
/// (spec.md §5's shared-resource policy). `append_row`/`close` after
/// `close` fail with [`WriterError::Closed`].
pub struct Writer<W: Write + Seek> {
    writer: W,
    schema: Schema,
    properties: WriterProperties,
    buffer: RowBuffer,
    row_groups: Vec<RowGroup>,
    total_rows: i64,
    offset: u64,
    closed: bool,
}

impl<W: Write + Seek> Writer<W> {
    /// Opens a writer: emits the header magic immediately (spec.md
    /// §4.8 "After header emission, `appendRow` ...").
    pub fn new(mut writer: W, schema: Schema, properties: WriterProperties) -> WriterResult<Self> {
        let offset = format::write_header(&mut writer)?;
        let buffer = RowBuffer::new(&schema);
        debug!(leaf_count = schema.fields().len(), "opened parquet writer");
        Ok(Writer { writer, schema, properties, buffer, row_groups: Vec::new(), total_rows: 0, offset, closed: false })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn properties(&self) -> &WriterProperties {
        &self.properties
    }

    pub fn row_count(&self) -> i64 {
        self.total_rows + self.buffer.row_count() as i64
    }

    /// Shreds `record` into the current row buffer and flushes it once
    /// the configured row-group size is reached.
    pub fn append_row(&mut self, record: &Value) -> WriterResult<()> {
        if self.closed {
            return Err(WriterError::Closed);
        }
        shred(&self.schema, record, &mut self.buffer)?;
        if self.buffer.row_count() >= self.properties.row_group_size {
            self.flush_row_group()?;
        }
        Ok(())
    }

    fn flush_row_group(&mut self) -> WriterResult<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }

        let num_rows = self.buffer.row_count() as i64;
        let mut columns = Vec::with_capacity(self.schema.fields().len());
        let group_start = self.offset;

        for leaf in self.schema.fields() {
            let empty = ColumnData::default();
            let column = self.buffer.column(&leaf.key).unwrap_or(&empty);

            let mut effective_leaf = leaf.clone();
            effective_leaf.compression = effective_compression(self.properties.compression, leaf.compression);

            let (chunk, bytes_written) = format::write_column_chunk(
                &mut self.writer,
                self.offset,
                &effective_leaf,
                &column.values,
                &column.rlevels,
                &column.dlevels,
                num_rows as usize,
                self.properties.use_data_page_v2,
            )?;
            self.offset += bytes_written;
            columns.push(chunk);
        }

        let total_byte_size = (self.offset - group_start) as i64;
        self.row_groups.push(format::build_row_group(columns, num_rows, total_byte_size));
        self.total_rows += num_rows;
        debug!(rows = num_rows, total_rows = self.total_rows, "flushed row group");
        self.buffer.clear();
        Ok(())
    }

    /// Flushes any residual buffered rows, writes the footer, and
    /// marks the writer closed (spec.md §4.8 `close`). Fails with
    /// [`WriterError::EmptyFile`] if nothing was ever appended or the
    /// schema has no leaves; calling `close` again fails
    /// [`WriterError::Closed`].
    pub fn close(&mut self) -> WriterResult<()> {
        if self.closed {
            return Err(WriterError::Closed);
        }
        self.closed = true;

        self.flush_row_group()?;

        if self.total_rows == 0 || self.schema.fields().is_empty() {
            return Err(WriterError::EmptyFile);
        }

        format::write_footer(
            &mut self.writer,
            &self.schema,
            std::mem::take(&mut self.row_groups),
            self.total_rows,
            self.properties.created_by.clone(),
        )?;
        self.writer.flush()?;
        debug!(total_rows = self.total_rows, "closed parquet writer");
        Ok(())
    }

    /// Releases the underlying stream. Callers that need the bytes
    /// back (e.g. an in-memory `Vec<u8>` sink) call this after
    /// [`Writer::close`].
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Per-column compression override (spec.md §4.8: "per-field
/// `compression` on the schema overrides the file default"). A leaf
/// whose schema build left it at the uncompressed default defers to
/// the writer-level setting; a leaf that explicitly asked for a named
/// compressor keeps it. This can't distinguish "explicitly asked for
/// uncompressed" from "didn't specify" since `parquet-core` resolves
/// both to the same value at schema-build time.
fn effective_compression(file_default: CompressionName, leaf_compression: CompressionName) -> CompressionName {
    if leaf_compression != CompressionName::Uncompressed {
        leaf_compression
    } else {
        file_default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parquet_core::schema::FieldDef as Def;
    use std::io::Cursor;

    fn sample_schema() -> Schema {
        Schema::build(vec![
            Def::leaf("name", "UTF8"),
            Def::leaf("quantity", "INT64").optional(),
            Def::leaf("price", "DOUBLE"),
        ])
        .unwrap()
    }

    fn row(name: &str, quantity: Option<i64>, price: f64) -> Value {
        Value::record([
            ("name".to_string(), Value::from(name)),
            ("quantity".to_string(), quantity.map(Value::Int).unwrap_or(Value::Null)),
            ("price".to_string(), Value::Float(price)),
        ])
    }

    #[test]
    fn round_trips_rows_across_a_row_group_boundary() {
        let schema = sample_schema();
        let properties = WriterProperties::builder().set_row_group_size(2).build();
        let mut writer = Writer::new(Cursor::new(Vec::new()), schema, properties).unwrap();

        writer.append_row(&row("apples", Some(10), 2.6)).unwrap();
        writer.append_row(&row("oranges", Some(20), 2.7)).unwrap();
        writer.append_row(&row("kiwi", None, 4.2)).unwrap();
        writer.close().unwrap();

        let mut reader = writer.into_inner();
        let footer = format::open(&mut reader).unwrap();
        assert_eq!(footer.num_rows, 3);
        assert_eq!(footer.row_groups.len(), 2);
    }

    #[test]
    fn close_fails_on_empty_file() {
        let schema = sample_schema();
        let mut writer = Writer::new(Cursor::new(Vec::new()), schema, WriterProperties::default()).unwrap();
        assert!(matches!(writer.close(), Err(WriterError::EmptyFile)));
    }

    #[test]
    fn append_and_close_fail_after_close() {
        let schema = sample_schema();
        let mut writer = Writer::new(Cursor::new(Vec::new()), schema, WriterProperties::default()).unwrap();
        writer.append_row(&row("apples", Some(10), 2.6)).unwrap();
        writer.close().unwrap();

        assert!(matches!(writer.append_row(&row("oranges", Some(1), 1.0)), Err(WriterError::Closed)));
        assert!(matches!(writer.close(), Err(WriterError::Closed)));
    }
}
