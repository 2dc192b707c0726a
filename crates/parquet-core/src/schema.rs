//! The schema tree: parses nested field definitions into a flattened
//! leaf list carrying paths, r/d-level maxima, encodings and
//! compressions (spec.md §4.2).
//!
//! Per spec.md §9's "schema tree with back edges" design note, child
//! nodes live in an arena owned by the `Schema` and branches are
//! indices into it rather than threaded parent pointers, so lookups
//! stay borrow-only.

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::types::{CompressionName, EncodingName, LogicalType, OriginalType, PrimitiveType, Repetition};

/// A user-supplied field definition, before schema construction.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub optional: bool,
    pub repeated: bool,
    pub encoding: Option<String>,
    pub compression: Option<String>,
    pub kind: FieldKind,
}

#[derive(Debug, Clone)]
pub enum FieldKind {
    Group(Vec<FieldDef>),
    List {
        element: Box<FieldDef>,
        element_name: Option<String>,
    },
    Map {
        key: Box<FieldDef>,
        value: Box<FieldDef>,
    },
    Leaf {
        type_name: String,
        type_length: Option<i32>,
        precision: Option<i32>,
        scale: Option<i32>,
    },
}

impl FieldDef {
    pub fn leaf(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        FieldDef {
            name: name.into(),
            optional: false,
            repeated: false,
            encoding: None,
            compression: None,
            kind: FieldKind::Leaf {
                type_name: type_name.into(),
                type_length: None,
                precision: None,
                scale: None,
            },
        }
    }

    pub fn group(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        FieldDef {
            name: name.into(),
            optional: false,
            repeated: false,
            encoding: None,
            compression: None,
            kind: FieldKind::Group(fields),
        }
    }

    pub fn list(name: impl Into<String>, element: FieldDef) -> Self {
        FieldDef {
            name: name.into(),
            optional: false,
            repeated: false,
            encoding: None,
            compression: None,
            kind: FieldKind::List {
                element: Box::new(element),
                element_name: None,
            },
        }
    }

    pub fn list_named(name: impl Into<String>, element: FieldDef, element_name: impl Into<String>) -> Self {
        let mut f = FieldDef::list(name, element);
        if let FieldKind::List { element_name: slot, .. } = &mut f.kind {
            *slot = Some(element_name.into());
        }
        f
    }

    pub fn map(name: impl Into<String>, key: FieldDef, value: FieldDef) -> Self {
        FieldDef {
            name: name.into(),
            optional: false,
            repeated: false,
            encoding: None,
            compression: None,
            kind: FieldKind::Map {
                key: Box::new(key),
                value: Box::new(value),
            },
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }

    pub fn with_type_length(mut self, length: i32) -> Self {
        if let FieldKind::Leaf { type_length, .. } = &mut self.kind {
            *type_length = Some(length);
        }
        self
    }

    pub fn with_precision_scale(mut self, precision: i32, scale: i32) -> Self {
        if let FieldKind::Leaf {
            precision: p, scale: s, ..
        } = &mut self.kind
        {
            *p = Some(precision);
            *s = Some(scale);
        }
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    pub fn with_compression(mut self, compression: impl Into<String>) -> Self {
        self.compression = Some(compression.into());
        self
    }

    fn repetition(&self) -> Repetition {
        if self.repeated {
            Repetition::Repeated
        } else if self.optional {
            Repetition::Optional
        } else {
            Repetition::Required
        }
    }
}

/// A flattened leaf field, computed once at schema-build time.
#[derive(Debug, Clone)]
pub struct Leaf {
    pub path: Vec<String>,
    pub key: String,
    pub repetition: Repetition,
    pub r_level_max: u32,
    pub d_level_max: u32,
    pub primitive: PrimitiveType,
    pub original: Option<OriginalType>,
    pub logical: Option<LogicalType>,
    pub type_length: Option<i32>,
    pub encoding: EncodingName,
    pub compression: CompressionName,
}

struct LeafData {
    primitive: PrimitiveType,
    logical: Option<LogicalType>,
    type_length: Option<i32>,
    encoding: EncodingName,
    compression: CompressionName,
}

struct Node {
    name: String,
    parent: Option<usize>,
    children: Vec<usize>,
    repetition: Repetition,
    /// `converted_type` on the wire; set for LIST/MAP/MAP_KEY_VALUE
    /// groups as well as non-structural leaves.
    original: Option<OriginalType>,
    leaf: Option<LeafData>,
}

/// An immutable, flattened-and-indexed nested schema (spec.md §3).
pub struct Schema {
    nodes: Vec<Node>,
    /// `(r_level_max, d_level_max)` for every node, root included.
    levels: Vec<(u32, u32)>,
    leaves: Vec<Leaf>,
    leaf_node_of: Vec<usize>,
    node_of_leaf: HashMap<usize, usize>,
    path_to_node: HashMap<String, usize>,
}

const ROOT: usize = 0;

pub fn join_path<S: AsRef<str>>(path: &[S]) -> String {
    path.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(",")
}

impl Schema {
    /// `build(defn)` from spec.md §4.2.
    pub fn build(fields: Vec<FieldDef>) -> Result<Schema, SchemaError> {
        let mut nodes = vec![Node {
            name: "root".to_string(),
            parent: None,
            children: vec![],
            repetition: Repetition::Required,
            original: None,
            leaf: None,
        }];

        check_unique_names(&fields)?;
        for field in fields {
            let id = build_node(&mut nodes, ROOT, field)?;
            nodes[ROOT].children.push(id);
        }

        let mut schema = Schema {
            nodes,
            levels: vec![],
            leaves: vec![],
            leaf_node_of: vec![],
            node_of_leaf: HashMap::new(),
            path_to_node: HashMap::new(),
        };
        schema.index()?;
        Ok(schema)
    }

    fn index(&mut self) -> Result<(), SchemaError> {
        self.levels = vec![(0, 0); self.nodes.len()];
        let mut path = Vec::new();
        self.walk(ROOT, 0, 0, &mut path)
    }

    fn walk(&mut self, node_id: usize, r: u32, d: u32, path: &mut Vec<String>) -> Result<(), SchemaError> {
        self.levels[node_id] = (r, d);
        let children = self.nodes[node_id].children.clone();
        for child_id in children {
            let child = &self.nodes[child_id];
            path.push(child.name.clone());
            let new_r = r + u32::from(self.nodes[child_id].repetition == Repetition::Repeated);
            let new_d = d + u32::from(self.nodes[child_id].repetition != Repetition::Required);

            if self.nodes[child_id].leaf.is_some() {
                let key = join_path(path);
                if self.path_to_node.contains_key(&key) {
                    return Err(SchemaError::DuplicatePath(key));
                }
                let leaf_data = self.nodes[child_id].leaf.as_ref().expect("checked above");
                let leaf = Leaf {
                    path: path.clone(),
                    key: key.clone(),
                    repetition: self.nodes[child_id].repetition,
                    r_level_max: new_r,
                    d_level_max: new_d,
                    primitive: leaf_data.primitive,
                    original: self.nodes[child_id].original,
                    logical: leaf_data.logical,
                    type_length: leaf_data.type_length,
                    encoding: leaf_data.encoding,
                    compression: leaf_data.compression,
                };
                self.path_to_node.insert(key, child_id);
                self.node_of_leaf.insert(child_id, self.leaves.len());
                self.leaf_node_of.push(child_id);
                self.leaves.push(leaf);
                self.levels[child_id] = (new_r, new_d);
            } else {
                let key = join_path(path);
                self.path_to_node.insert(key, child_id);
                self.walk(child_id, new_r, new_d, path)?;
            }
            path.pop();
        }
        Ok(())
    }

    /// The flattened leaf list, in depth-first schema order (spec.md §3).
    pub fn fields(&self) -> &[Leaf] {
        &self.leaves
    }

    pub fn leaf_by_key(&self, key: &str) -> Option<&Leaf> {
        let node_id = *self.path_to_node.get(key)?;
        let leaf_idx = *self.node_of_leaf.get(&node_id)?;
        Some(&self.leaves[leaf_idx])
    }

    /// `findField(path)`: the leaf or internal node at `path`.
    pub fn find_field(&self, path: &[&str]) -> Option<FieldRef<'_>> {
        let key = join_path(path);
        let node_id = *self.path_to_node.get(&key)?;
        Some(FieldRef { schema: self, node_id })
    }

    /// Same as [`Schema::find_field`] but accepting a comma-joined path.
    pub fn find_field_str(&self, path: &str) -> Option<FieldRef<'_>> {
        let parts: Vec<&str> = path.split(',').collect();
        self.find_field(&parts)
    }

    /// `findFieldBranch(path)`: the full ancestor list, root-excluded,
    /// inclusive of `path` itself.
    pub fn find_field_branch(&self, path: &[&str]) -> Option<Vec<FieldRef<'_>>> {
        let leaf_ref = self.find_field(path)?;
        let mut branch = Vec::new();
        let mut current = Some(leaf_ref.node_id);
        while let Some(id) = current {
            if id == ROOT {
                break;
            }
            branch.push(FieldRef { schema: self, node_id: id });
            current = self.nodes[id].parent;
        }
        branch.reverse();
        Some(branch)
    }

    fn root_children(&self) -> &[usize] {
        &self.nodes[ROOT].children
    }

    pub fn top_level_fields(&self) -> Vec<FieldRef<'_>> {
        self.root_children()
            .iter()
            .map(|&id| FieldRef { schema: self, node_id: id })
            .collect()
    }
}

/// A borrow-only view of a node (leaf or internal), returned by lookups.
#[derive(Clone, Copy)]
pub struct FieldRef<'a> {
    schema: &'a Schema,
    node_id: usize,
}

impl<'a> FieldRef<'a> {
    pub fn name(&self) -> &'a str {
        &self.schema.nodes[self.node_id].name
    }

    pub fn repetition(&self) -> Repetition {
        self.schema.nodes[self.node_id].repetition
    }

    pub fn original(&self) -> Option<OriginalType> {
        self.schema.nodes[self.node_id].original
    }

    pub fn r_level_max(&self) -> u32 {
        self.schema.levels[self.node_id].0
    }

    pub fn d_level_max(&self) -> u32 {
        self.schema.levels[self.node_id].1
    }

    pub fn is_leaf(&self) -> bool {
        self.schema.nodes[self.node_id].leaf.is_some()
    }

    pub fn children(&self) -> Vec<FieldRef<'a>> {
        self.schema.nodes[self.node_id]
            .children
            .iter()
            .map(|&id| FieldRef { schema: self.schema, node_id: id })
            .collect()
    }

    pub fn leaf(&self) -> Option<&'a Leaf> {
        let idx = *self.schema.node_of_leaf.get(&self.node_id)?;
        Some(&self.schema.leaves[idx])
    }
}

fn check_unique_names(fields: &[FieldDef]) -> Result<(), SchemaError> {
    let mut seen = std::collections::HashSet::new();
    for f in fields {
        if !seen.insert(f.name.clone()) {
            return Err(SchemaError::DuplicatePath(f.name.clone()));
        }
    }
    Ok(())
}

fn alloc(nodes: &mut Vec<Node>, parent: usize, name: String, repetition: Repetition, original: Option<OriginalType>, leaf: Option<LeafData>) -> usize {
    nodes.push(Node {
        name,
        parent: Some(parent),
        children: vec![],
        repetition,
        original,
        leaf,
    });
    nodes.len() - 1
}

fn build_node(nodes: &mut Vec<Node>, parent: usize, field: FieldDef) -> Result<usize, SchemaError> {
    let repetition = field.repetition();
    match field.kind {
        FieldKind::Group(children) => {
            check_unique_names(&children)?;
            let id = alloc(nodes, parent, field.name, repetition, None, None);
            for child in children {
                let cid = build_node(nodes, id, child)?;
                nodes[id].children.push(cid);
            }
            Ok(id)
        }
        FieldKind::List { element, element_name } => {
            let id = alloc(nodes, parent, field.name, repetition, Some(OriginalType::List), None);
            let list_id = alloc(nodes, id, "list".to_string(), Repetition::Repeated, None, None);
            let mut elem = *element;
            elem.name = element_name.unwrap_or_else(|| "element".to_string());
            let elem_id = build_node(nodes, list_id, elem)?;
            nodes[list_id].children.push(elem_id);
            nodes[id].children.push(list_id);
            Ok(id)
        }
        FieldKind::Map { key, value } => {
            let id = alloc(nodes, parent, field.name, repetition, Some(OriginalType::Map), None);
            let kv_id = alloc(nodes, id, "map".to_string(), Repetition::Repeated, Some(OriginalType::MapKeyValue), None);
            let mut key_field = *key;
            key_field.name = "key".to_string();
            key_field.optional = false;
            key_field.repeated = false;
            let key_id = build_node(nodes, kv_id, key_field)?;
            let mut value_field = *value;
            value_field.name = "value".to_string();
            value_field.repeated = false;
            let value_id = build_node(nodes, kv_id, value_field)?;
            nodes[kv_id].children.push(key_id);
            nodes[kv_id].children.push(value_id);
            nodes[id].children.push(kv_id);
            Ok(id)
        }
        FieldKind::Leaf {
            type_name,
            type_length,
            precision,
            scale,
        } => {
            let (primitive, original, type_length) =
                resolve_leaf_type(&type_name, type_length, precision)?;

            if matches!(primitive, PrimitiveType::FixedLenByteArray) && type_length.is_none() {
                return Err(SchemaError::MissingTypeLength(field.name.clone()));
            }

            if let (Some(p), Some(s)) = (precision, scale) {
                if p <= 0 || s < 0 || s > p {
                    return Err(SchemaError::PrecisionScaleOutOfRange { precision: p, scale: s });
                }
            }

            let logical = match original {
                Some(o) => Some(
                    LogicalType::resolve(o, primitive, scale, type_length)
                        .map_err(|_| SchemaError::UnknownType(type_name.clone()))?,
                ),
                None => None,
            };

            let encoding = match &field.encoding {
                Some(name) => EncodingName::parse(name)
                    .ok_or_else(|| SchemaError::UnsupportedEncoding {
                        encoding: name.clone(),
                        logical: type_name.clone(),
                    })?,
                None => EncodingName::Plain,
            };
            if encoding == EncodingName::Rle
                && !matches!(primitive, PrimitiveType::Boolean | PrimitiveType::Int32 | PrimitiveType::Int64)
            {
                return Err(SchemaError::UnsupportedEncoding {
                    encoding: "RLE".to_string(),
                    logical: type_name.clone(),
                });
            }

            let compression = match &field.compression {
                Some(name) => CompressionName::parse(name)
                    .ok_or_else(|| SchemaError::UnsupportedCompression(name.clone()))?,
                None => CompressionName::Uncompressed,
            };

            let leaf_data = LeafData {
                primitive,
                logical,
                type_length,
                encoding,
                compression,
            };
            Ok(alloc(nodes, parent, field.name, repetition, original, Some(leaf_data)))
        }
    }
}

/// Maps a `type` option string (a bare primitive name or a logical
/// name) onto `(primitive, original, effective_type_length)`.
fn resolve_leaf_type(
    type_name: &str,
    type_length: Option<i32>,
    precision: Option<i32>,
) -> Result<(PrimitiveType, Option<OriginalType>, Option<i32>), SchemaError> {
    if let Some(primitive) = parse_primitive(type_name) {
        return Ok((primitive, None, type_length));
    }

    let original = OriginalType::parse(type_name).ok_or_else(|| SchemaError::UnknownType(type_name.to_string()))?;

    Ok(match original {
        OriginalType::Utf8 | OriginalType::Enum | OriginalType::Json => (PrimitiveType::ByteArray, Some(original), type_length),
        OriginalType::Bson => (PrimitiveType::ByteArray, Some(original), type_length),
        OriginalType::Date | OriginalType::TimeMillis => (PrimitiveType::Int32, Some(original), type_length),
        OriginalType::TimeMicros | OriginalType::TimestampMillis | OriginalType::TimestampMicros => {
            (PrimitiveType::Int64, Some(original), type_length)
        }
        OriginalType::Uint8 | OriginalType::Uint16 | OriginalType::Uint32 => (PrimitiveType::Int32, Some(original), type_length),
        OriginalType::Uint64 => (PrimitiveType::Int64, Some(original), type_length),
        OriginalType::Int8 | OriginalType::Int16 | OriginalType::Int32 => (PrimitiveType::Int32, Some(original), type_length),
        OriginalType::Int64 => (PrimitiveType::Int64, Some(original), type_length),
        OriginalType::Interval => (PrimitiveType::FixedLenByteArray, Some(original), Some(12)),
        OriginalType::Decimal => {
            // Open Question (spec.md §4.1 leaves the carrier-selection
            // rule unstated): an explicit typeLength always selects the
            // FIXED-LEN-BYTES carrier; otherwise the carrier is chosen
            // from precision the way the reference Parquet tooling
            // picks a column's decimal physical type. See DESIGN.md.
            if let Some(length) = type_length {
                (PrimitiveType::FixedLenByteArray, Some(original), Some(length))
            } else {
                match precision {
                    Some(p) if p <= 9 => (PrimitiveType::Int32, Some(original), None),
                    Some(p) if p <= 18 => (PrimitiveType::Int64, Some(original), None),
                    _ => (PrimitiveType::ByteArray, Some(original), None),
                }
            }
        }
        OriginalType::List | OriginalType::Map | OriginalType::MapKeyValue => {
            return Err(SchemaError::InternalWithPrimitiveType(type_name.to_string()))
        }
    })
}

fn parse_primitive(name: &str) -> Option<PrimitiveType> {
    Some(match name {
        "BOOLEAN" => PrimitiveType::Boolean,
        "INT32" => PrimitiveType::Int32,
        "INT64" => PrimitiveType::Int64,
        "INT96" => PrimitiveType::Int96,
        "FLOAT" => PrimitiveType::Float,
        "DOUBLE" => PrimitiveType::Double,
        "BYTE_ARRAY" => PrimitiveType::ByteArray,
        "FIXED_LEN_BYTE_ARRAY" => PrimitiveType::FixedLenByteArray,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn dremel_leaf_levels_match_canonical_example() {
        let schema = dremel_schema();
        let code = schema.leaf_by_key("Name,Language,Code").unwrap();
        assert_eq!(code.r_level_max, 2);
        assert_eq!(code.d_level_max, 2);

        let country = schema.leaf_by_key("Name,Language,Country").unwrap();
        assert_eq!(country.r_level_max, 2);
        assert_eq!(country.d_level_max, 3);

        let doc_id = schema.leaf_by_key("DocId").unwrap();
        assert_eq!(doc_id.r_level_max, 0);
        assert_eq!(doc_id.d_level_max, 0);

        let backward = schema.leaf_by_key("Links,Backward").unwrap();
        assert_eq!(backward.r_level_max, 1);
        assert_eq!(backward.d_level_max, 2);
    }

    #[test]
    fn find_field_branch_is_root_to_leaf_inclusive() {
        let schema = dremel_schema();
        let branch = schema.find_field_branch(&["Name", "Language", "Code"]).unwrap();
        let names: Vec<&str> = branch.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["Name", "Language", "Code"]);
    }

    #[test]
    fn fixed_len_byte_array_requires_type_length() {
        let err = Schema::build(vec![FieldDef::leaf("x", "FIXED_LEN_BYTE_ARRAY")]).unwrap_err();
        assert!(matches!(err, SchemaError::MissingTypeLength(_)));
    }

    #[test]
    fn rle_encoding_rejected_for_byte_array() {
        let err = Schema::build(vec![FieldDef::leaf("x", "UTF8").with_encoding("RLE")]).unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedEncoding { .. }));
    }

    #[test]
    fn list_sugar_expands_to_canonical_shape() {
        let schema = Schema::build(vec![FieldDef::list("tags", FieldDef::leaf("element", "UTF8")).optional()]).unwrap();
        let leaf = schema.leaf_by_key("tags,list,element").unwrap();
        assert_eq!(leaf.r_level_max, 1);
        assert_eq!(leaf.d_level_max, 2);
    }

    #[test]
    fn map_sugar_forces_required_key() {
        let schema = Schema::build(vec![FieldDef::map(
            "attrs",
            FieldDef::leaf("key", "UTF8"),
            FieldDef::leaf("value", "UTF8").optional(),
        )
        .optional()])
        .unwrap();
        let key_leaf = schema.leaf_by_key("attrs,map,key").unwrap();
        assert_eq!(key_leaf.repetition, Repetition::Required);
        let value_leaf = schema.leaf_by_key("attrs,map,value").unwrap();
        assert_eq!(value_leaf.repetition, Repetition::Optional);
    }

    #[test]
    fn duplicate_field_names_are_rejected() {
        let err = Schema::build(vec![FieldDef::leaf("a", "INT32"), FieldDef::leaf("a", "INT64")]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicatePath(_)));
    }
}
