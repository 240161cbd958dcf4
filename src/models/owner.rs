use serde::Serialize;

/// Client a half-shift is billed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Owner {
    pub id: i64,
    pub name: String,
}
