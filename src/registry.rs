//! Field registry: which physical table and column owns each logical
//! attribute, plus the fixed descriptors for membership and document
//! attributes.
//!
//! The registry is the single place that knows the storage schema. Any
//! schema customization should be done here.

use lazy_static::lazy_static;
use std::collections::HashMap;

use crate::error::{FilterError, FilterResult};

/// Per-call override of the owning table for individual attributes.
pub type TableLookup = HashMap<String, String>;

/// Reserved document attribute. The bare name addresses the document root;
/// a `.`/`[` suffix addresses into it (`data.name.givenName`, `data[0]`).
pub const DOCUMENT_ATTRIBUTE: &str = "data";

/// A membership relation materialized by a join table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildAttribute {
    pub attribute: &'static str,
    /// Table owning the entity rows the predicate applies to.
    pub owner_table: &'static str,
    /// Primary-key column of the owning entity.
    pub owner_id_column: &'static str,
    pub join_table: &'static str,
    /// Join-table column referencing the owning entity.
    pub join_owner_column: &'static str,
    /// Join-table column holding the related values.
    pub join_value_column: &'static str,
}

lazy_static! {
    /// Logical attribute -> (owning table, physical column).
    static ref FIELD_TABLES: HashMap<&'static str, (&'static str, &'static str)> = {
        let mut fields = HashMap::new();
        fields.insert("id", ("users", "id"));
        fields.insert("userName", ("users", "username"));
        fields.insert("externalId", ("users", "external_id"));
        fields.insert("active", ("users", "active"));
        fields.insert("createdAt", ("users", "created_at"));
        fields.insert("updatedAt", ("users", "updated_at"));
        fields.insert("displayName", ("groups", "display_name"));
        fields.insert(DOCUMENT_ATTRIBUTE, ("users", "data"));
        fields
    };

    static ref CHILD_ATTRIBUTES: HashMap<&'static str, ChildAttribute> = {
        let mut children = HashMap::new();
        children.insert(
            "members",
            ChildAttribute {
                attribute: "members",
                owner_table: "groups",
                owner_id_column: "id",
                join_table: "group_memberships",
                join_owner_column: "group_id",
                join_value_column: "user_id",
            },
        );
        children.insert(
            "groups",
            ChildAttribute {
                attribute: "groups",
                owner_table: "users",
                owner_id_column: "id",
                join_table: "group_memberships",
                join_owner_column: "user_id",
                join_value_column: "group_id",
            },
        );
        children
    };
}

/// Resolve the owning table and physical column for a logical attribute.
///
/// The default table can be re-pointed per call through `overwrite`, e.g.
/// `{"id": "groups"}` when the caller is filtering groups rather than users.
pub fn table_of_field(
    attr: &str,
    overwrite: Option<&TableLookup>,
) -> FilterResult<(String, String)> {
    let (table, column) = FIELD_TABLES.get(attr).copied().ok_or_else(|| {
        FilterError::Internal(format!("no table mapping for attribute '{}'", attr))
    })?;
    let table = overwrite
        .and_then(|lookup| lookup.get(attr))
        .cloned()
        .unwrap_or_else(|| table.to_string());
    Ok((table, column.to_string()))
}

pub fn child_attribute(attr: &str) -> Option<&'static ChildAttribute> {
    CHILD_ATTRIBUTES.get(attr)
}
