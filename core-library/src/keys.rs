//! Physical key layout shared by every repository.
//!
//! | Purpose | Key | Structure |
//! |---|---|---|
//! | one field of one record | `{table}:{id}:{field}` | scalar |
//! | all live ids | `{table}s:all` | sorted set, score 0 |
//! | secondary index | `{table}:idx:{index}` | sorted set |
//! | per-parent children | `{parent}:{parent_id}:{table}s` | sorted set, score 0 |

pub fn field_key(table: &str, id: &str, field: &str) -> String {
    format!("{}:{}:{}", table, id, field)
}

pub fn all_key(table: &str) -> String {
    format!("{}s:all", table)
}

pub fn index_key(table: &str, index: &str) -> String {
    format!("{}:idx:{}", table, index)
}

pub fn children_key(parent_table: &str, parent_id: &str, table: &str) -> String {
    format!("{}:{}:{}s", parent_table, parent_id, table)
}
