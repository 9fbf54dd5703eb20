use crate::analysis::buffers_in_stmt;
use crate::expr::BufferId;
use crate::stmt::Stmt;
use serde::{Deserialize, Serialize};

/// A scheduled pipeline body together with the symbol its entry function is exported under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub name: String,
    pub body: Stmt,
}

impl Pipeline {
    pub fn new(name: impl Into<String>, body: Stmt) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }

    /// Buffers in entry-parameter order.
    pub fn buffers(&self) -> Vec<BufferId> {
        buffers_in_stmt(&self.body).into_iter().collect()
    }
}
