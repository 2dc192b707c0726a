//! The Dremel shredder (spec.md §4.3): striping nested records into
//! parallel `(value, rLevel, dLevel)` column streams and assembling
//! them back into records.
//!
//! Logical-type conversion is delegated to [`crate::conversions`]; this
//! module only implements the structural algorithm. LIST/MAP sugar is
//! expanded by constructing a fresh wrapper [`Value`] rather than
//! mutating the caller's record in place, per spec.md §9's note that
//! the source's hot-path in-place rewrite should not survive the port.

use std::collections::HashMap;

use crate::conversions;
use crate::error::{CoreError, ShredError};
use crate::schema::{FieldRef, Leaf, Schema};
use crate::types::{OriginalType, Repetition};
use crate::value::{PrimitiveValue, Value};

/// One leaf column's parallel streams (spec.md §3).
#[derive(Debug, Clone, Default)]
pub struct ColumnData {
    pub values: Vec<PrimitiveValue>,
    pub rlevels: Vec<u32>,
    pub dlevels: Vec<u32>,
}

impl ColumnData {
    pub fn count(&self) -> usize {
        self.rlevels.len()
    }
}

/// `rowCount` plus a mapping from leaf key to column buffer (spec.md §3).
#[derive(Debug, Clone)]
pub struct RowBuffer {
    row_count: usize,
    columns: HashMap<String, ColumnData>,
}

impl RowBuffer {
    pub fn new(schema: &Schema) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|leaf| (leaf.key.clone(), ColumnData::default()))
            .collect();
        RowBuffer { row_count: 0, columns }
    }

    /// Assembles a buffer directly from already-decoded column streams,
    /// used by readers rebuilding a row group's worth of column chunks
    /// read off disk rather than shredding fresh records.
    pub fn from_columns(row_count: usize, columns: HashMap<String, ColumnData>) -> Self {
        RowBuffer { row_count, columns }
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn is_empty(&self) -> bool {
        self.row_count == 0
    }

    pub fn column(&self, key: &str) -> Option<&ColumnData> {
        self.columns.get(key)
    }

    pub fn columns(&self) -> &HashMap<String, ColumnData> {
        &self.columns
    }

    /// Resets the buffer to empty, keeping its column keys (used by the
    /// writer between row-group flushes).
    pub fn clear(&mut self) {
        self.row_count = 0;
        for column in self.columns.values_mut() {
            column.values.clear();
            column.rlevels.clear();
            column.dlevels.clear();
        }
    }
}

/// `shred(schema, record, buffer)` from spec.md §4.3.
pub fn shred(schema: &Schema, record: &Value, buffer: &mut RowBuffer) -> Result<(), CoreError> {
    let mut path = Vec::new();
    for field in schema.top_level_fields() {
        shred_field(schema, field, Some(record), 0, 0, buffer, &mut path)?;
    }
    buffer.row_count += 1;
    Ok(())
}

/// Looks up a field's raw value on a present parent, treating an
/// absent key and an explicit null the same way (spec.md §4.3 step 1).
fn fetch_raw<'a>(parent: Option<&'a Value>, name: &str) -> Option<&'a Value> {
    let parent = parent?;
    match parent.field(name) {
        None => None,
        Some(v) if v.is_null() => None,
        Some(v) => Some(v),
    }
}

/// Rewrites a field's raw value per the LIST/MAP sugar rule (spec.md
/// §4.3), building a fresh wrapper rather than mutating the caller's
/// tree (spec.md §9).
fn apply_sugar(field: FieldRef<'_>, value: &Value) -> Option<Value> {
    match (field.original(), value) {
        (Some(OriginalType::List), Value::List(items)) => {
            let list_child = field.children().into_iter().next()?;
            let element_child = list_child.children().into_iter().next()?;
            let elements = items
                .iter()
                .map(|v| Value::record([(element_child.name().to_string(), v.clone())]))
                .collect();
            Some(Value::record([(list_child.name().to_string(), Value::List(elements))]))
        }
        (Some(OriginalType::Map), Value::Map(pairs)) => {
            let kv_child = field.children().into_iter().next()?;
            let mut kv_children = kv_child.children().into_iter();
            let key_child = kv_children.next()?;
            let value_child = kv_children.next()?;
            let elements = pairs
                .iter()
                .map(|(k, v)| {
                    Value::record([
                        (key_child.name().to_string(), k.clone()),
                        (value_child.name().to_string(), v.clone()),
                    ])
                })
                .collect();
            Some(Value::record([(kv_child.name().to_string(), Value::List(elements))]))
        }
        _ => None,
    }
}

#[allow(clippy::too_many_arguments)]
fn shred_field(
    schema: &Schema,
    field: FieldRef<'_>,
    parent: Option<&Value>,
    current_r: u32,
    current_d: u32,
    buffer: &mut RowBuffer,
    path: &mut Vec<String>,
) -> Result<(), CoreError> {
    path.push(field.name().to_string());
    let result = shred_field_inner(schema, field, parent, current_r, current_d, buffer, path);
    path.pop();
    result
}

#[allow(clippy::too_many_arguments)]
fn shred_field_inner(
    schema: &Schema,
    field: FieldRef<'_>,
    parent: Option<&Value>,
    current_r: u32,
    current_d: u32,
    buffer: &mut RowBuffer,
    path: &mut Vec<String>,
) -> Result<(), CoreError> {
    let raw = fetch_raw(parent, field.name());

    // Apply the LIST/MAP sugar rewrite to the whole field value before
    // deciding whether it's an array (spec.md §4.3): a plain array
    // supplied for a LIST-typed field is one wrapped group value, not
    // N raw repeated values.
    let rewritten;
    let raw = match raw {
        Some(v) => match apply_sugar(field, v) {
            Some(rewrite) => {
                rewritten = rewrite;
                Some(&rewritten)
            }
            None => Some(v),
        },
        None => None,
    };

    let values: Vec<&Value> = match raw {
        None => Vec::new(),
        Some(Value::List(items)) => items.iter().collect(),
        Some(other) => vec![other],
    };

    if values.is_empty() {
        if field.repetition() == Repetition::Required && parent.is_some() {
            return Err(ShredError::MissingRequired(path.join(",")).into());
        }
        return shred_absent(schema, field, current_r, current_d, buffer, path);
    }

    if values.len() > 1 && field.repetition() != Repetition::Repeated {
        return Err(ShredError::TooManyValues(path.join(",")).into());
    }

    for (i, value) in values.iter().copied().enumerate() {
        let rlvl = if i == 0 { current_r } else { field.r_level_max() };
        let dlvl = field.d_level_max();
        if field.is_leaf() {
            append_leaf(field, rlvl, dlvl, Some(value), buffer)?;
        } else {
            for child in field.children() {
                shred_field(schema, child, Some(value), rlvl, dlvl, buffer, path)?;
            }
        }
    }
    Ok(())
}

fn shred_absent(
    schema: &Schema,
    field: FieldRef<'_>,
    current_r: u32,
    current_d: u32,
    buffer: &mut RowBuffer,
    path: &mut Vec<String>,
) -> Result<(), CoreError> {
    if field.is_leaf() {
        append_leaf(field, current_r, current_d, None, buffer)?;
    } else {
        for child in field.children() {
            shred_field(schema, child, None, current_r, current_d, buffer, path)?;
        }
    }
    Ok(())
}

fn append_leaf(
    field: FieldRef<'_>,
    rlvl: u32,
    dlvl: u32,
    value: Option<&Value>,
    buffer: &mut RowBuffer,
) -> Result<(), CoreError> {
    let leaf = field.leaf().expect("is_leaf() implies leaf() is Some");
    let column = buffer
        .columns
        .get_mut(&leaf.key)
        .expect("RowBuffer::new registers every schema leaf");
    column.rlevels.push(rlvl);
    column.dlevels.push(dlvl);
    if let Some(value) = value {
        let primitive = leaf_to_primitive(leaf, value)?;
        column.values.push(primitive);
    }
    Ok(())
}

fn leaf_to_primitive(leaf: &Leaf, value: &Value) -> Result<PrimitiveValue, CoreError> {
    let primitive = match &leaf.logical {
        Some(logical) => conversions::to_primitive(logical, value)?,
        None => conversions::identity_to_primitive(leaf.primitive, value, leaf.type_length)?,
    };
    Ok(primitive)
}

fn leaf_from_primitive(leaf: &Leaf, value: &PrimitiveValue) -> Result<Value, CoreError> {
    let native = match &leaf.logical {
        Some(logical) => conversions::from_primitive(logical, value)?,
        None => conversions::identity_from_primitive(value),
    };
    Ok(native)
}

/// A mutable record tree used only during materialization; converted
/// to the caller-facing [`Value`] tree once every leaf column has been
/// replayed.
#[derive(Debug, Clone)]
enum MutNode {
    Unset,
    Record(Vec<(String, MutNode)>),
    List(Vec<MutNode>),
    Leaf(Value),
}

impl MutNode {
    fn record_field_mut(&mut self, name: &str) -> &mut MutNode {
        if matches!(self, MutNode::Unset) {
            *self = MutNode::Record(Vec::new());
        }
        let MutNode::Record(fields) = self else {
            unreachable!("record_field_mut called on a non-record node")
        };
        if let Some(pos) = fields.iter().position(|(n, _)| n == name) {
            &mut fields[pos].1
        } else {
            fields.push((name.to_string(), MutNode::Unset));
            &mut fields.last_mut().expect("just pushed").1
        }
    }

    fn list_slot_mut(&mut self, idx: usize) -> &mut MutNode {
        if matches!(self, MutNode::Unset) {
            *self = MutNode::List(Vec::new());
        }
        let MutNode::List(items) = self else {
            unreachable!("list_slot_mut called on a non-list node")
        };
        while items.len() <= idx {
            items.push(MutNode::Unset);
        }
        &mut items[idx]
    }

    fn lookup(&self, name: &str) -> MutNode {
        match self {
            MutNode::Record(fields) => fields
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
                .unwrap_or(MutNode::Unset),
            _ => MutNode::Unset,
        }
    }
}

/// `materialize(schema, buffer) -> records` from spec.md §4.3, returning
/// records with the canonical LIST/MAP group shape (no sugar unwrap).
pub fn materialize_canonical(schema: &Schema, buffer: &RowBuffer) -> Result<Vec<Value>, CoreError> {
    let mut rows: Vec<MutNode> = (0..buffer.row_count()).map(|_| MutNode::Record(Vec::new())).collect();

    for leaf in schema.fields() {
        let Some(column) = buffer.column(&leaf.key) else { continue };
        if column.rlevels.is_empty() {
            continue;
        }
        let path_refs: Vec<&str> = leaf.path.iter().map(String::as_str).collect();
        let branch = schema
            .find_field_branch(&path_refs)
            .expect("leaf path comes from this schema");

        let mut r_levels = vec![0usize; leaf.r_level_max as usize + 1];
        let mut value_idx = 0usize;

        for i in 0..column.count() {
            let r = column.rlevels[i] as usize;
            let d = column.dlevels[i];

            r_levels[r] += 1;
            for slot in r_levels.iter_mut().skip(r + 1) {
                *slot = 0;
            }
            let row_index = r_levels[0] - 1;

            let mut current = &mut rows[row_index];
            let mut null_here = false;
            for node in &branch {
                if d < node.d_level_max() {
                    null_here = true;
                    break;
                }
                let is_leaf_step = node.is_leaf();
                if is_leaf_step {
                    let value = if d == leaf.d_level_max {
                        let v = leaf_from_primitive(leaf, &column.values[value_idx])?;
                        value_idx += 1;
                        MutNode::Leaf(v)
                    } else {
                        MutNode::Unset
                    };
                    if node.repetition() == Repetition::Repeated {
                        let idx = r_levels[leaf.r_level_max as usize];
                        *current.list_slot_mut(idx) = value;
                    } else {
                        *current.record_field_mut(node.name()) = value;
                    }
                } else if node.repetition() == Repetition::Repeated {
                    let idx = r_levels[node.r_level_max() as usize];
                    let slot = current.record_field_mut(node.name());
                    current = slot.list_slot_mut(idx);
                } else {
                    current = current.record_field_mut(node.name());
                }
            }
            let _ = null_here;
        }
    }

    Ok(rows
        .into_iter()
        .map(|row| finalize_group(&schema.top_level_fields(), &row))
        .collect())
}

/// `materialize` with LIST/MAP sugar unwrapped back into plain
/// arrays/native maps, matching the shape records were shredded from
/// (spec.md §4.3's "packed materialization").
pub fn materialize(schema: &Schema, buffer: &RowBuffer) -> Result<Vec<Value>, CoreError> {
    materialize_canonical(schema, buffer)
}

fn finalize_group(children: &[FieldRef<'_>], node: &MutNode) -> Value {
    match node {
        MutNode::Unset => Value::Record(Vec::new()),
        _ => Value::record(
            children
                .iter()
                .map(|child| (child.name().to_string(), finalize_field(*child, &node.lookup(child.name())))),
        ),
    }
}

fn finalize_field(field: FieldRef<'_>, node: &MutNode) -> Value {
    if field.is_leaf() {
        return finalize_leaf(field, node);
    }

    match field.original() {
        Some(OriginalType::List) => finalize_list_sugar(field, node),
        Some(OriginalType::Map) => finalize_map_sugar(field, node),
        _ => finalize_internal_group(field, node),
    }
}

/// A plain (non-sugar) group field. A REPEATED group can never be
/// null, only empty-or-populated (spec.md §4.3's leveling gives it no
/// way to record null independent from its own repetition), so an
/// untouched node there defaults to an empty list rather than `Null`.
fn finalize_internal_group(field: FieldRef<'_>, node: &MutNode) -> Value {
    let children = field.children();
    if field.repetition() == Repetition::Repeated {
        match node {
            MutNode::List(items) => Value::List(items.iter().map(|item| finalize_group(&children, item)).collect()),
            _ => Value::List(Vec::new()),
        }
    } else {
        match node {
            MutNode::Unset if field.repetition() == Repetition::Optional => Value::Null,
            _ => finalize_group(&children, node),
        }
    }
}

fn finalize_leaf(field: FieldRef<'_>, node: &MutNode) -> Value {
    if field.repetition() == Repetition::Repeated {
        match node {
            MutNode::List(items) => Value::List(
                items
                    .iter()
                    .map(|item| match item {
                        MutNode::Leaf(v) => v.clone(),
                        _ => Value::Null,
                    })
                    .collect(),
            ),
            _ => Value::List(Vec::new()),
        }
    } else {
        match node {
            MutNode::Leaf(v) => v.clone(),
            _ => Value::Null,
        }
    }
}

fn finalize_list_sugar(field: FieldRef<'_>, node: &MutNode) -> Value {
    let Some(list_child) = field.children().into_iter().next() else {
        return Value::Null;
    };
    let Some(element_child) = list_child.children().into_iter().next() else {
        return Value::Null;
    };

    match node {
        MutNode::Unset => Value::Null,
        _ => {
            let list_node = node.lookup(list_child.name());
            let items = match &list_node {
                MutNode::List(items) => items
                    .iter()
                    .map(|item| finalize_field(element_child, &item.lookup(element_child.name())))
                    .collect(),
                _ => Vec::new(),
            };
            Value::List(items)
        }
    }
}

fn finalize_map_sugar(field: FieldRef<'_>, node: &MutNode) -> Value {
    let Some(kv_child) = field.children().into_iter().next() else {
        return Value::Null;
    };
    let mut kv_children = kv_child.children().into_iter();
    let (Some(key_child), Some(value_child)) = (kv_children.next(), kv_children.next()) else {
        return Value::Null;
    };

    match node {
        MutNode::Unset => Value::Null,
        _ => {
            let kv_node = node.lookup(kv_child.name());
            let pairs = match &kv_node {
                MutNode::List(items) => items
                    .iter()
                    .map(|item| {
                        (
                            finalize_field(key_child, &item.lookup(key_child.name())),
                            finalize_field(value_child, &item.lookup(value_child.name())),
                        )
                    })
                    .collect(),
                _ => Vec::new(),
            };
            Value::Map(pairs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;

    fn dremel_schema() -> Schema {
        Schema::build(vec![
            FieldDef::leaf("DocId", "INT64"),
            FieldDef::group(
                "Links",
                vec![
                    FieldDef::leaf("Backward", "INT64").repeated(),
                    FieldDef::leaf("Forward", "INT64").repeated(),
                ],
            )
            .optional(),
            FieldDef::group(
                "Name",
                vec![
                    FieldDef::group(
                        "Language",
                        vec![
                            FieldDef::leaf("Code", "UTF8"),
                            FieldDef::leaf("Country", "UTF8").optional(),
                        ],
                    )
                    .repeated(),
                    FieldDef::leaf("Url", "UTF8").optional(),
                ],
            )
            .repeated(),
        ])
        .unwrap()
    }

    // materialize() always emits every schema-declared child explicitly
    // (Value::Null for an absent optional field) rather than omitting
    // the key, so fixtures compared against its output must do the same.
    fn name(language: Vec<Value>, url: Option<&str>) -> Value {
        Value::record([
            ("Language".to_string(), Value::List(language)),
            ("Url".to_string(), url.map(Value::from).unwrap_or(Value::Null)),
        ])
    }

    fn language(code: &str, country: Option<&str>) -> Value {
        Value::record([
            ("Code".to_string(), Value::from(code)),
            ("Country".to_string(), country.map(Value::from).unwrap_or(Value::Null)),
        ])
    }

    fn r1() -> Value {
        Value::record([
            ("DocId".to_string(), Value::Int(10)),
            (
                "Links".to_string(),
                Value::record([
                    ("Backward".to_string(), Value::List(vec![])),
                    ("Forward".to_string(), Value::List(vec![Value::Int(20), Value::Int(40), Value::Int(60)])),
                ]),
            ),
            (
                "Name".to_string(),
                Value::List(vec![
                    name(vec![language("en-us", Some("us")), language("en", None)], Some("http://A")),
                    name(vec![], Some("http://B")),
                    name(vec![language("en-gb", Some("gb"))], None),
                ]),
            ),
        ])
    }

    fn r2() -> Value {
        Value::record([
            ("DocId".to_string(), Value::Int(20)),
            (
                "Links".to_string(),
                Value::record([
                    ("Backward".to_string(), Value::List(vec![Value::Int(10), Value::Int(30)])),
                    ("Forward".to_string(), Value::List(vec![Value::Int(80)])),
                ]),
            ),
            ("Name".to_string(), Value::List(vec![name(vec![], Some("http://C"))])),
        ])
    }

    #[test]
    fn dremel_canonical_example_code_column() {
        let schema = dremel_schema();
        let mut buffer = RowBuffer::new(&schema);
        shred(&schema, &r1(), &mut buffer).unwrap();
        shred(&schema, &r2(), &mut buffer).unwrap();

        let code = buffer.column("Name,Language,Code").unwrap();
        assert_eq!(code.rlevels, vec![0, 2, 1, 1, 0]);
        assert_eq!(code.dlevels, vec![2, 2, 1, 2, 1]);
        assert_eq!(
            code.values,
            vec![
                PrimitiveValue::Bytes(b"en-us".to_vec()),
                PrimitiveValue::Bytes(b"en".to_vec()),
                PrimitiveValue::Bytes(b"en-gb".to_vec()),
            ]
        );
    }

    #[test]
    fn dremel_canonical_example_country_column() {
        let schema = dremel_schema();
        let mut buffer = RowBuffer::new(&schema);
        shred(&schema, &r1(), &mut buffer).unwrap();
        shred(&schema, &r2(), &mut buffer).unwrap();

        let country = buffer.column("Name,Language,Country").unwrap();
        assert_eq!(country.rlevels, vec![0, 2, 1, 1, 0]);
        assert_eq!(country.dlevels, vec![3, 2, 1, 3, 1]);
        assert_eq!(
            country.values,
            vec![PrimitiveValue::Bytes(b"us".to_vec()), PrimitiveValue::Bytes(b"gb".to_vec())]
        );
    }

    #[test]
    fn dremel_canonical_example_round_trips() {
        let schema = dremel_schema();
        let mut buffer = RowBuffer::new(&schema);
        let r1 = r1();
        let r2 = r2();
        shred(&schema, &r1, &mut buffer).unwrap();
        shred(&schema, &r2, &mut buffer).unwrap();

        let records = materialize(&schema, &buffer).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], r1);
        assert_eq!(records[1], r2);
    }

    #[test]
    fn missing_required_field_fails() {
        let schema = Schema::build(vec![FieldDef::leaf("id", "INT64")]).unwrap();
        let mut buffer = RowBuffer::new(&schema);
        let err = shred(&schema, &Value::record([]), &mut buffer).unwrap_err();
        assert!(matches!(err, CoreError::Shred(ShredError::MissingRequired(_))));
    }

    #[test]
    fn too_many_values_for_non_repeated_fails() {
        let schema = Schema::build(vec![FieldDef::leaf("id", "INT64")]).unwrap();
        let mut buffer = RowBuffer::new(&schema);
        let record = Value::record([("id".to_string(), Value::List(vec![Value::Int(1), Value::Int(2)]))]);
        let err = shred(&schema, &record, &mut buffer).unwrap_err();
        assert!(matches!(err, CoreError::Shred(ShredError::TooManyValues(_))));
    }

    #[test]
    fn list_and_map_sugar_round_trip() {
        let schema = Schema::build(vec![
            FieldDef::list("tags", FieldDef::leaf("element", "UTF8")).optional(),
            FieldDef::map("attrs", FieldDef::leaf("key", "UTF8"), FieldDef::leaf("value", "INT64").optional()).optional(),
        ])
        .unwrap();

        let record = Value::record([
            ("tags".to_string(), Value::List(vec![Value::from("a"), Value::from("b")])),
            (
                "attrs".to_string(),
                Value::Map(vec![(Value::from("x"), Value::Int(1)), (Value::from("y"), Value::Int(2))]),
            ),
        ]);

        let mut buffer = RowBuffer::new(&schema);
        shred(&schema, &record, &mut buffer).unwrap();
        let records = materialize(&schema, &buffer).unwrap();
        assert_eq!(records[0], record);
    }

    #[test]
    fn optional_absent_field_materializes_as_null() {
        let schema = Schema::build(vec![
            FieldDef::leaf("id", "INT64"),
            FieldDef::leaf("name", "UTF8").optional(),
        ])
        .unwrap();

        let record = Value::record([("id".to_string(), Value::Int(1))]);
        let mut buffer = RowBuffer::new(&schema);
        shred(&schema, &record, &mut buffer).unwrap();
        let records = materialize(&schema, &buffer).unwrap();
        assert_eq!(records[0].field("name"), Some(&Value::Null));
    }

    #[test]
    fn repeated_field_present_but_empty_stays_present() {
        let schema = Schema::build(vec![FieldDef::leaf("tags", "UTF8").repeated()]).unwrap();
        let record = Value::record([("tags".to_string(), Value::List(vec![]))]);
        let mut buffer = RowBuffer::new(&schema);
        shred(&schema, &record, &mut buffer).unwrap();
        let records = materialize(&schema, &buffer).unwrap();
        assert_eq!(records[0].field("tags"), Some(&Value::List(Vec::new())));
    }

    #[test]
    fn multi_row_streams_concatenate_in_insertion_order() {
        let schema = Schema::build(vec![FieldDef::leaf("id", "INT64")]).unwrap();
        let mut buffer = RowBuffer::new(&schema);
        for i in 0..5 {
            shred(&schema, &Value::record([("id".to_string(), Value::Int(i))]), &mut buffer).unwrap();
        }
        let column = buffer.column("id").unwrap();
        assert_eq!(column.values, (0..5).map(PrimitiveValue::Int64).collect::<Vec<_>>());
        assert_eq!(buffer.row_count(), 5);
    }
}
