//! Parameterized SQL fragments and the predicate tree they compose into.
//!
//! An [`Expression`] is a SQL template with positional `?` placeholders plus
//! the ordered arguments bound to them; an argument may itself be a nested
//! fragment, which is how subqueries are embedded as values. A [`Scope`] is
//! the append-only AND/OR tree that translators write into; rendering a scope
//! yields a single expression attachable to a `WHERE` or `HAVING` clause.

use serde_json::Value;

/// Logical combinator joining sibling predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    And,
    Or,
}

impl Combinator {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

/// One positional argument of an [`Expression`].
#[derive(Debug, Clone, PartialEq)]
pub enum SqlArg {
    /// A bind value, surfaced as a `?` placeholder in the built SQL.
    Value(Value),
    /// A nested fragment spliced into the template in place of its `?`.
    Expr(Expression),
}

/// A SQL fragment with positional `?` placeholders and its ordered arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub template: String,
    pub args: Vec<SqlArg>,
}

impl Expression {
    pub fn new(template: impl Into<String>, args: Vec<SqlArg>) -> Self {
        Expression {
            template: template.into(),
            args,
        }
    }

    /// Flatten nested fragments into executable SQL plus the bind values in
    /// placeholder order.
    pub fn build(&self) -> (String, Vec<Value>) {
        let mut sql = String::with_capacity(self.template.len());
        let mut params = Vec::new();
        let mut args = self.args.iter();

        for ch in self.template.chars() {
            if ch != '?' {
                sql.push(ch);
                continue;
            }
            match args.next() {
                Some(SqlArg::Value(value)) => {
                    sql.push('?');
                    params.push(value.clone());
                }
                Some(SqlArg::Expr(inner)) => {
                    let (inner_sql, inner_params) = inner.build();
                    sql.push_str(&inner_sql);
                    params.extend(inner_params);
                }
                None => sql.push('?'),
            }
        }

        (sql, params)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf(Expression),
    Group(Combinator, Vec<Node>),
}

/// Append-only accumulation target for compiled predicates.
///
/// Appending with the combinator of the current group extends it; appending
/// with the other combinator wraps everything accumulated so far into a
/// nested group, which keeps grouping left-associative in written order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    root: Option<Node>,
}

impl Scope {
    pub fn new() -> Self {
        Scope { root: None }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn and(&mut self, expr: Expression) {
        self.combine(expr, Combinator::And);
    }

    pub fn or(&mut self, expr: Expression) {
        self.combine(expr, Combinator::Or);
    }

    /// Append a fragment using the given combinator.
    pub fn combine(&mut self, expr: Expression, combinator: Combinator) {
        self.append(Node::Leaf(expr), combinator);
    }

    /// Fold another scope's contents in, flattening a root group that uses
    /// the same combinator. Used when a leaf's accumulated expressions rejoin
    /// the surrounding scope; equivalent to having written them through
    /// directly.
    pub fn absorb(&mut self, other: Scope, combinator: Combinator) {
        match other.root {
            None => {}
            Some(Node::Group(op, children)) if op == combinator => {
                for child in children {
                    self.append(child, combinator);
                }
            }
            Some(node) => self.append(node, combinator),
        }
    }

    /// Fold another scope in as one isolated unit. A multi-expression group
    /// stays nested, so it renders parenthesized regardless of the
    /// surrounding combinator.
    pub fn push_group(&mut self, other: Scope, combinator: Combinator) {
        if let Some(node) = other.root {
            self.append(node, combinator);
        }
    }

    fn append(&mut self, node: Node, combinator: Combinator) {
        match self.root.take() {
            None => self.root = Some(node),
            Some(Node::Group(op, mut children)) if op == combinator => {
                children.push(node);
                self.root = Some(Node::Group(op, children));
            }
            Some(existing) => {
                self.root = Some(Node::Group(combinator, vec![existing, node]));
            }
        }
    }

    /// Render the accumulated tree into a single expression, or `None` when
    /// nothing has been appended.
    pub fn to_expression(&self) -> Option<Expression> {
        self.root.as_ref().map(render)
    }

    /// Render and flatten in one step.
    pub fn build(&self) -> Option<(String, Vec<Value>)> {
        self.to_expression().map(|expr| expr.build())
    }
}

fn render(node: &Node) -> Expression {
    match node {
        Node::Leaf(expr) => expr.clone(),
        Node::Group(op, children) => {
            let mut template = String::new();
            let mut args = Vec::new();
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    template.push(' ');
                    template.push_str(op.as_sql());
                    template.push(' ');
                }
                let rendered = render(child);
                match child {
                    Node::Group(..) => {
                        template.push('(');
                        template.push_str(&rendered.template);
                        template.push(')');
                    }
                    Node::Leaf(_) => template.push_str(&rendered.template),
                }
                args.extend(rendered.args);
            }
            Expression::new(template, args)
        }
    }
}

/// Build one relational comparison.
///
/// Without `func` the template is `<table>.<column> <operator> ?`; with it,
/// the column reference is wrapped as `func(<table>.<column>[, '<arg>', ...])`.
/// A `null` operand with `=` or `!=` becomes `IS NULL` / `IS NOT NULL` with
/// no bound argument. `IN` / `NOT IN` expand an array operand into one
/// placeholder per element.
pub fn build_comparison(
    table: &str,
    column: &str,
    operator: &str,
    value: &Value,
    func: Option<&str>,
    func_args: &[&str],
) -> Expression {
    let mut column_ref = format!("{}.{}", table, column);
    if let Some(name) = func {
        let mut wrapped = format!("{}({}", name, column_ref);
        for arg in func_args {
            wrapped.push_str(", '");
            wrapped.push_str(&arg.replace('\'', "''"));
            wrapped.push('\'');
        }
        wrapped.push(')');
        column_ref = wrapped;
    }

    if value.is_null() && (operator == "=" || operator == "!=") {
        let null_op = if operator == "=" {
            "IS NULL"
        } else {
            "IS NOT NULL"
        };
        return Expression::new(format!("{} {}", column_ref, null_op), Vec::new());
    }

    if operator == "IN" || operator == "NOT IN" {
        let values = match value {
            Value::Array(items) => items.clone(),
            other => vec![other.clone()],
        };
        let placeholders = vec!["?"; values.len()].join(", ");
        return Expression::new(
            format!("{} {} ({})", column_ref, operator, placeholders),
            values.into_iter().map(SqlArg::Value).collect(),
        );
    }

    Expression::new(
        format!("{} {} ?", column_ref, operator),
        vec![SqlArg::Value(value.clone())],
    )
}

pub fn equals(table: &str, column: &str, value: &Value, func: Option<&str>, func_args: &[&str]) -> Expression {
    build_comparison(table, column, "=", value, func, func_args)
}

pub fn not_equals(table: &str, column: &str, value: &Value, func: Option<&str>, func_args: &[&str]) -> Expression {
    build_comparison(table, column, "!=", value, func, func_args)
}

pub fn like(table: &str, column: &str, value: &Value, func: Option<&str>, func_args: &[&str]) -> Expression {
    build_comparison(table, column, "LIKE", value, func, func_args)
}

pub fn not_like(table: &str, column: &str, value: &Value, func: Option<&str>, func_args: &[&str]) -> Expression {
    build_comparison(table, column, "NOT LIKE", value, func, func_args)
}

pub fn greater_than(table: &str, column: &str, value: &Value, func: Option<&str>, func_args: &[&str]) -> Expression {
    build_comparison(table, column, ">", value, func, func_args)
}

pub fn greater_than_equal(table: &str, column: &str, value: &Value, func: Option<&str>, func_args: &[&str]) -> Expression {
    build_comparison(table, column, ">=", value, func, func_args)
}

pub fn lower_than(table: &str, column: &str, value: &Value, func: Option<&str>, func_args: &[&str]) -> Expression {
    build_comparison(table, column, "<", value, func, func_args)
}

pub fn lower_than_equal(table: &str, column: &str, value: &Value, func: Option<&str>, func_args: &[&str]) -> Expression {
    build_comparison(table, column, "<=", value, func, func_args)
}

pub fn in_values(table: &str, column: &str, value: &Value, func: Option<&str>, func_args: &[&str]) -> Expression {
    build_comparison(table, column, "IN", value, func, func_args)
}

pub fn not_in_values(table: &str, column: &str, value: &Value, func: Option<&str>, func_args: &[&str]) -> Expression {
    build_comparison(table, column, "NOT IN", value, func, func_args)
}
