//! AST types for the filter language.
//!
//! The AST is produced by the parser and consumed by the query compiler. It
//! carries no table knowledge; semantic checks (operator/literal type
//! compatibility) happen at compile time.

use std::fmt;

use tablescope_model::AttributeValue;

/// A parsed filter expression.
///
/// The grammar currently admits a single comparison; boolean composition is
/// deliberately absent from the language.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Comparison expression: `name op literal`.
    BinOp {
        /// The attribute name on the left-hand side.
        name: String,
        /// The comparison operator.
        op: Operator,
        /// The literal on the right-hand side.
        value: Literal,
    },
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BinOp { name, op, value } => write!(f, "{name} {op} {value}"),
        }
    }
}

/// Comparison operators of the filter language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equality (`=`).
    Equals,
    /// String prefix match (`^=`).
    BeginsWith,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals => write!(f, "="),
            Self::BeginsWith => write!(f, "^="),
        }
    }
}

/// A literal operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// String literal.
    Str(String),
    /// Number literal, carried as its exact textual representation.
    Num(String),
    /// Boolean literal.
    Bool(bool),
}

impl Literal {
    /// The name of this literal's type, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Num(_) => "number",
            Self::Bool(_) => "boolean",
        }
    }

    /// Converts the literal into its attribute-value counterpart.
    #[must_use]
    pub fn to_attribute_value(&self) -> AttributeValue {
        match self {
            Self::Str(s) => AttributeValue::S(s.clone()),
            Self::Num(n) => AttributeValue::N(n.clone()),
            Self::Bool(b) => AttributeValue::Bool(*b),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::Num(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_display_expression() {
        let expr = Expr::BinOp {
            name: "pk".to_owned(),
            op: Operator::BeginsWith,
            value: Literal::Str("abc".to_owned()),
        };
        assert_eq!(expr.to_string(), "pk ^= \"abc\"");
    }

    #[test]
    fn test_should_convert_literals_to_attribute_values() {
        assert_eq!(
            Literal::Str("x".to_owned()).to_attribute_value(),
            AttributeValue::S("x".to_owned())
        );
        assert_eq!(
            Literal::Num("1.5".to_owned()).to_attribute_value(),
            AttributeValue::N("1.5".to_owned())
        );
        assert_eq!(
            Literal::Bool(true).to_attribute_value(),
            AttributeValue::Bool(true)
        );
    }
}
