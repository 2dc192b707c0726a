//! Lazy per-row-group cursor (spec.md §4.9 `getCursor(columns?)`):
//! reads one row group, materializes all its records, then hands them
//! out one at a time; advancing past the last row yields `None`.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::io::{Read, Seek};
use std::rc::Rc;

use parquet_core::shred::{ColumnData, RowBuffer};
use parquet_core::{materialize, Schema, Value};
use parquet_format::{self as format, RowGroup};

use crate::error::{ReaderError, ReaderResult};

/// Iterates materialized rows across every row group in append order
/// (spec.md §5 ordering: `row_group_index -> row_index_within_row_group`).
pub struct Cursor<'r, R: Read + Seek> {
    stream: Rc<RefCell<R>>,
    closed: Rc<Cell<bool>>,
    schema: &'r Schema,
    row_groups: &'r [RowGroup],
    selected_keys: Vec<String>,
    next_group: usize,
    pending: VecDeque<Value>,
}

impl<'r, R: Read + Seek> Cursor<'r, R> {
    pub(crate) fn new(
        stream: Rc<RefCell<R>>,
        closed: Rc<Cell<bool>>,
        footer: &'r format::FileFooter,
        columns: Option<&[Vec<String>]>,
    ) -> ReaderResult<Self> {
        let selected_keys = select_leaf_keys(&footer.schema, columns)?;
        Ok(Cursor {
            stream,
            closed,
            schema: &footer.schema,
            row_groups: &footer.row_groups,
            selected_keys,
            next_group: 0,
            pending: VecDeque::new(),
        })
    }

    /// Reads and materializes the next row, or `None` at end of file.
    pub fn next_row(&mut self) -> ReaderResult<Option<Value>> {
        if self.closed.get() {
            return Err(ReaderError::Closed);
        }
        loop {
            if let Some(row) = self.pending.pop_front() {
                return Ok(Some(row));
            }
            if self.next_group >= self.row_groups.len() {
                return Ok(None);
            }
            self.load_row_group(self.next_group)?;
            self.next_group += 1;
        }
    }

    fn load_row_group(&mut self, index: usize) -> ReaderResult<()> {
        let group = &self.row_groups[index];
        let mut columns: HashMap<String, ColumnData> = HashMap::new();
        let mut stream = self.stream.borrow_mut();

        for leaf in self.schema.fields() {
            if !self.selected_keys.contains(&leaf.key) {
                continue;
            }
            let chunk = group
                .columns
                .iter()
                .find(|c| c.meta_data.as_ref().map(|m| &m.path_in_schema) == Some(&leaf.path))
                .ok_or_else(|| ReaderError::UnknownColumn(leaf.path.clone()))?;
            format::check_not_external(chunk)?;
            let metadata = chunk.meta_data.as_ref().ok_or_else(|| ReaderError::UnknownColumn(leaf.path.clone()))?;

            let (values, rlevels, dlevels) = format::read_column_chunk(&mut *stream, leaf, metadata)?;
            columns.insert(leaf.key.clone(), ColumnData { values, rlevels, dlevels });
        }
        drop(stream);

        let buffer = RowBuffer::from_columns(group.num_rows as usize, columns);
        let rows = materialize(self.schema, &buffer)?;
        tracing::debug!(row_group = index, rows = rows.len(), "materialized row group");
        self.pending.extend(rows);
        Ok(())
    }
}

impl<'r, R: Read + Seek> Iterator for Cursor<'r, R> {
    type Item = ReaderResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

/// Resolves a `columns` projection to the set of leaf keys to read: an
/// empty or absent list means every leaf; otherwise a leaf is included
/// if its path matches one of the requested prefixes by array equality
/// or by its comma-joined key (spec.md §4.9).
fn select_leaf_keys(schema: &Schema, columns: Option<&[Vec<String>]>) -> ReaderResult<Vec<String>> {
    let Some(columns) = columns else {
        return Ok(schema.fields().iter().map(|leaf| leaf.key.clone()).collect());
    };
    if columns.is_empty() {
        return Ok(schema.fields().iter().map(|leaf| leaf.key.clone()).collect());
    }

    let mut selected = Vec::new();
    for leaf in schema.fields() {
        let matches = columns.iter().any(|prefix| is_path_prefix(prefix, &leaf.path));
        if matches {
            selected.push(leaf.key.clone());
        }
    }
    if selected.is_empty() {
        return Err(ReaderError::UnknownColumn(columns[0].clone()));
    }
    Ok(selected)
}

fn is_path_prefix(prefix: &[String], path: &[String]) -> bool {
    prefix.len() <= path.len() && prefix.iter().zip(path.iter()).all(|(a, b)| a == b)
}
