//! Schema flattening and rebuilding (spec.md §6's "Schema element
//! flattening"): depth-first preorder `Vec<SchemaElement>` with a
//! synthetic `"root"` element, and the reverse.
//!
//! LIST/MAP groups round-trip through their canonical three-level wire
//! shape (spec.md §4.2): a reader doesn't need the sugar constructors
//! to materialize correctly, but detecting the canonical shape lets
//! [`crate::shred`]-adjacent code treat a rebuilt schema the same way
//! as one built fresh from `FieldDef::list`/`FieldDef::map`, so
//! `finalize_list_sugar`/`finalize_map_sugar` still fire on read.

use parquet_core::schema::{FieldDef, FieldKind, FieldRef};
use parquet_core::{OriginalType, Repetition, Schema};
use parquet_format_safe::SchemaElement;

use crate::bridge;
use crate::error::{FormatError, FormatResult};

pub fn schema_to_elements(schema: &Schema) -> Vec<SchemaElement> {
    let top = schema.top_level_fields();
    let mut out = Vec::with_capacity(1 + top.len());
    out.push(root_element(top.len()));
    for field in top {
        write_node(field, &mut out);
    }
    out
}

fn root_element(num_children: usize) -> SchemaElement {
    SchemaElement {
        type_: None,
        type_length: None,
        repetition_type: None,
        name: "root".to_string(),
        num_children: Some(num_children as i32),
        converted_type: None,
        scale: None,
        precision: None,
        field_id: None,
        logical_type: None,
    }
}

fn write_node(field: FieldRef<'_>, out: &mut Vec<SchemaElement>) {
    let repetition_type = Some(bridge::repetition_to_thrift(field.repetition()));
    let converted_type = field.original().map(bridge::original_to_converted);

    if field.is_leaf() {
        let leaf = field.leaf().expect("is_leaf() implies leaf() is Some");
        out.push(SchemaElement {
            type_: Some(bridge::primitive_to_thrift(leaf.primitive)),
            type_length: leaf.type_length,
            repetition_type,
            name: field.name().to_string(),
            num_children: None,
            converted_type,
            scale: decimal_scale(leaf.logical),
            precision: None,
            field_id: None,
            logical_type: None,
        });
    } else {
        let children = field.children();
        out.push(SchemaElement {
            type_: None,
            type_length: None,
            repetition_type,
            name: field.name().to_string(),
            num_children: Some(children.len() as i32),
            converted_type,
            scale: None,
            precision: None,
            field_id: None,
            logical_type: None,
        });
        for child in children {
            write_node(child, out);
        }
    }
}

fn decimal_scale(logical: Option<parquet_core::LogicalType>) -> Option<i32> {
    use parquet_core::LogicalType;
    match logical {
        Some(LogicalType::Decimal32 { scale })
        | Some(LogicalType::Decimal64 { scale })
        | Some(LogicalType::DecimalFixed { scale, .. })
        | Some(LogicalType::DecimalBinary { scale }) => Some(scale),
        _ => None,
    }
}

struct Cursor<'a> {
    elements: &'a [SchemaElement],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn next(&mut self) -> FormatResult<&'a SchemaElement> {
        let element = self
            .elements
            .get(self.pos)
            .ok_or_else(|| FormatError::Truncated("schema element list".to_string()))?;
        self.pos += 1;
        Ok(element)
    }
}

/// Rebuilds a [`Schema`] from the flattened element list, dropping the
/// synthetic root per spec.md §4.9's `open()` step.
pub fn elements_to_schema(elements: &[SchemaElement]) -> FormatResult<Schema> {
    let mut cursor = Cursor { elements, pos: 0 };
    let root = cursor.next()?;
    let num_top = root.num_children.unwrap_or(0).max(0) as usize;
    let mut fields = Vec::with_capacity(num_top);
    for _ in 0..num_top {
        fields.push(read_node(&mut cursor)?);
    }
    Schema::build(fields).map_err(|e| FormatError::Core(e.into()))
}

fn read_node(cursor: &mut Cursor<'_>) -> FormatResult<FieldDef> {
    let element = cursor.next()?;
    let name = element.name.clone();
    let repetition = match element.repetition_type {
        Some(r) => bridge::thrift_to_repetition(r)?,
        None => Repetition::Required,
    };
    let converted_type = element.converted_type;
    let type_length = element.type_length;
    let precision = element.precision;
    let scale = element.scale;
    let physical_type = element.type_;

    let def = if let Some(num_children) = element.num_children {
        let mut children = Vec::with_capacity(num_children.max(0) as usize);
        for _ in 0..num_children.max(0) {
            children.push(read_node(cursor)?);
        }
        build_group(name, converted_type, children)?
    } else {
        let primitive = physical_type
            .ok_or_else(|| FormatError::Thrift(format!("leaf element '{name}' is missing a physical type")))?;
        let primitive = bridge::thrift_to_primitive(primitive)?;
        let type_name = leaf_type_name(primitive, converted_type)?;
        let mut leaf = FieldDef::leaf(name, type_name);
        if let Some(len) = type_length {
            leaf = leaf.with_type_length(len);
        }
        if let (Some(precision), Some(scale)) = (precision, scale) {
            leaf = leaf.with_precision_scale(precision, scale);
        }
        leaf
    };

    Ok(apply_repetition(def, repetition))
}

fn apply_repetition(field: FieldDef, repetition: Repetition) -> FieldDef {
    match repetition {
        Repetition::Optional => field.optional(),
        Repetition::Repeated => field.repeated(),
        Repetition::Required => field,
    }
}

/// Detects the canonical three-level LIST/MAP wire shape and rebuilds
/// it via the sugar constructors so materialization unwraps it the
/// same way it would a schema built fresh with `FieldDef::list`/`map`;
/// anything else becomes a plain group.
fn build_group(
    name: String,
    converted_type: Option<parquet_format_safe::ConvertedType>,
    mut children: Vec<FieldDef>,
) -> FormatResult<FieldDef> {
    use parquet_format_safe::ConvertedType;

    if converted_type == Some(ConvertedType::LIST) && children.len() == 1 {
        if let FieldKind::Group(inner) = &children[0].kind {
            if children[0].repeated && inner.len() == 1 {
                let wrapper = children.remove(0);
                let FieldKind::Group(mut inner) = wrapper.kind else { unreachable!() };
                let element = inner.remove(0);
                let element_name = element.name.clone();
                return Ok(FieldDef::list_named(name, element, element_name));
            }
        }
    }

    if converted_type == Some(ConvertedType::MAP) && children.len() == 1 {
        if let FieldKind::Group(inner) = &children[0].kind {
            if inner.len() == 2 {
                let wrapper = children.remove(0);
                let FieldKind::Group(mut inner) = wrapper.kind else { unreachable!() };
                let value = inner.remove(1);
                let key = inner.remove(0);
                return Ok(FieldDef::map(name, key, value));
            }
        }
    }

    Ok(FieldDef::group(name, children))
}

fn leaf_type_name(primitive: parquet_core::PrimitiveType, converted: Option<parquet_format_safe::ConvertedType>) -> FormatResult<String> {
    match converted {
        None => Ok(bare_primitive_name(primitive).to_string()),
        Some(ct) => Ok(bridge::converted_to_original(ct)?.name().to_string()),
    }
}

fn bare_primitive_name(primitive: parquet_core::PrimitiveType) -> &'static str {
    use parquet_core::PrimitiveType;
    match primitive {
        PrimitiveType::Boolean => "BOOLEAN",
        PrimitiveType::Int32 => "INT32",
        PrimitiveType::Int64 => "INT64",
        PrimitiveType::Int96 => "INT96",
        PrimitiveType::Float => "FLOAT",
        PrimitiveType::Double => "DOUBLE",
        PrimitiveType::ByteArray => "BYTE_ARRAY",
        PrimitiveType::FixedLenByteArray => "FIXED_LEN_BYTE_ARRAY",
    }
}
