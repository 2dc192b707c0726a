//! Writer configuration (spec.md §6 "Writer configuration options"),
//! following the teacher's `WriterProperties::builder()` shape.

use parquet_core::CompressionName;

/// Flush threshold in rows (spec.md §4.8 default 4096).
pub const DEFAULT_ROW_GROUP_SIZE: usize = 4096;

/// Advisory page size in column values (spec.md §4.8 default 8192).
/// This implementation emits exactly one page per column chunk, so the
/// value is carried through but never used to split a chunk's body.
pub const DEFAULT_PAGE_SIZE: usize = 8192;

#[derive(Debug, Clone)]
pub struct WriterProperties {
    pub(crate) row_group_size: usize,
    pub(crate) page_size: usize,
    pub(crate) use_data_page_v2: bool,
    pub(crate) compression: CompressionName,
    pub(crate) created_by: Option<String>,
}

impl Default for WriterProperties {
    fn default() -> Self {
        WriterProperties {
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            page_size: DEFAULT_PAGE_SIZE,
            use_data_page_v2: false,
            compression: CompressionName::Uncompressed,
            created_by: Some(format!("parquet-rs version {}", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl WriterProperties {
    pub fn builder() -> WriterPropertiesBuilder {
        WriterPropertiesBuilder { props: WriterProperties::default() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct WriterPropertiesBuilder {
    props: WriterProperties,
}

impl WriterPropertiesBuilder {
    pub fn set_row_group_size(mut self, rows: usize) -> Self {
        self.props.row_group_size = rows.max(1);
        self
    }

    pub fn set_page_size(mut self, values: usize) -> Self {
        self.props.page_size = values.max(1);
        self
    }

    pub fn set_use_data_page_v2(mut self, use_v2: bool) -> Self {
        self.props.use_data_page_v2 = use_v2;
        self
    }

    pub fn set_compression(mut self, compression: CompressionName) -> Self {
        self.props.compression = compression;
        self
    }

    pub fn set_created_by(mut self, created_by: Option<String>) -> Self {
        self.props.created_by = created_by;
        self
    }

    pub fn build(self) -> WriterProperties {
        self.props
    }
}
