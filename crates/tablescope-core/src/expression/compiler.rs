//! Query compiler: turns a parsed expression into an execution plan.
//!
//! Compilation type-checks the operator/literal combination and lowers the
//! AST into a [`Condition`] evaluable against items. The plan also records
//! whether the condition could be satisfied by a direct key lookup instead
//! of a scan; the current policy is deliberately conservative and always
//! plans a filtered scan (see [`compile`]).

use tablescope_model::{AttributeValue, TableInfo};
use tracing::trace;

use super::ast::{Expr, Literal, Operator};

/// Errors produced while compiling an expression against a table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// The operator does not accept the literal's type.
    #[error("type mismatch: operator '{op}' requires a {expected} literal, got {actual}")]
    TypeMismatch {
        /// The offending operator.
        op: Operator,
        /// The literal type the operator requires.
        expected: &'static str,
        /// The literal type that was supplied.
        actual: &'static str,
    },
}

/// A compiled, type-checked condition on a single attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    /// The attribute name the condition tests.
    pub name: String,
    /// The test applied to the attribute's value.
    pub test: ConditionTest,
}

/// The test half of a [`Condition`].
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionTest {
    /// The attribute equals the given value.
    Equals(AttributeValue),
    /// The attribute is a string beginning with the given prefix.
    BeginsWith(String),
}

/// How a compiled expression will be executed against the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionPlan {
    /// `true` means the condition can be satisfied by a direct key lookup;
    /// `false` means a full scan with the condition applied as a filter.
    pub can_query: bool,
    /// The compiled condition.
    pub condition: Condition,
}

/// Compile an expression against a table's metadata.
///
/// Every plan currently runs as a scan filter (`can_query = false`), even
/// for equality on the partition key. Recognizing key equality as a direct
/// lookup would change result-completeness and cost characteristics, so it
/// is left as an explicit future extension; `info` is already part of the
/// contract so the signature will not change when it lands.
///
/// # Errors
///
/// Returns [`CompileError::TypeMismatch`] when `^=` is applied to a
/// non-string literal.
pub fn compile(expr: &Expr, info: &TableInfo) -> Result<ExecutionPlan, CompileError> {
    let Expr::BinOp { name, op, value } = expr;
    trace!(table = %info.name, attribute = %name, operator = %op, "compiling filter expression");

    let test = match op {
        Operator::Equals => ConditionTest::Equals(value.to_attribute_value()),
        Operator::BeginsWith => match value {
            Literal::Str(prefix) => ConditionTest::BeginsWith(prefix.clone()),
            other => {
                return Err(CompileError::TypeMismatch {
                    op: *op,
                    expected: "string",
                    actual: other.type_name(),
                });
            }
        },
    };

    Ok(ExecutionPlan {
        can_query: false,
        condition: Condition {
            name: name.clone(),
            test,
        },
    })
}
