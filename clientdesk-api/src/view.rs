use std::collections::BTreeMap;

use serde::{Serialize, Deserialize};

/// the view a path resolved to, for clients that did not ask for html
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct View {
    pub name: String,
    pub view: String,
    pub pattern: String,
    pub requires_auth: bool,
    pub params: BTreeMap<String, String>,
}
