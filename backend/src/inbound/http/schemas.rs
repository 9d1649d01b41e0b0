//! OpenAPI schema definitions for domain types without a `ToSchema` derive.
//!
//! The snapshot column descriptor stays framework-agnostic; this wrapper
//! mirrors its serialised shape for documentation only.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::SnapshotColumn`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SnapshotColumn)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SnapshotColumnSchema {
    /// Column name.
    #[schema(example = "area_funcional_id")]
    name: String,
    /// Declared data type as reported by the catalog.
    #[schema(rename = "type", example = "integer")]
    data_type: String,
    /// Whether the column accepts `NULL`.
    nullable: bool,
}
