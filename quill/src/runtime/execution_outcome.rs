//! Control-flow outcome of executing a statement.
//!
//! Every statement executor returns `RuntimeResult<Flow>`. A `return` is an
//! ordinary value travelling outward until the nearest function invocation
//! consumes it; failures ride the `Err` arm. Both leave a scope the same way.

use crate::runtime::values::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Flow {
    /// Execution continues with the next statement; carries the value of the
    /// statement just executed.
    Normal(Value),
    /// A `return` happened and is looking for its function.
    Return(Value),
    Break,
    Continue,
}

impl Flow {
    pub fn unit() -> Self {
        Flow::Normal(Value::Unit)
    }
}
