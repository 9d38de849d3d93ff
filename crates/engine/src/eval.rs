use std::cmp::Ordering;

use cli_common::{DbError, Result};
use parser::ast::{Comparator, Condition};

use crate::storage::{column_position, Row, Table};

/// Decide whether `row` satisfies `condition`. `And`/`Or` short-circuit
/// left to right.
pub fn evaluate(condition: &Condition, row: &Row, columns: &[String]) -> Result<bool> {
    match condition {
        Condition::Comparison {
            attribute,
            op,
            value,
        } => {
            let index = column_position(columns, attribute.as_str())
                .ok_or_else(|| DbError::AttributeNotFound(attribute.value.clone()))?;

            Ok(compare(&row.cells[index], *op, &value.as_cell()))
        }
        Condition::And(left, right) => {
            Ok(evaluate(left, row, columns)? && evaluate(right, row, columns)?)
        }
        Condition::Or(left, right) => {
            Ok(evaluate(left, row, columns)? || evaluate(right, row, columns)?)
        }
    }
}

/// Fail on the first attribute in `condition` the table doesn't have, so
/// that a bad WHERE is rejected even when no row would reach it.
pub fn validate(condition: &Condition, table: &Table) -> Result<()> {
    for attribute in condition.attributes() {
        table.require_column(attribute.as_str())?;
    }

    Ok(())
}

/// Ids of every row in `table` matching `condition`, in row order.
pub fn matching_ids(condition: &Condition, table: &Table) -> Result<Vec<u64>> {
    let mut ids = vec![];

    for row in &table.rows {
        if evaluate(condition, row, &table.columns)? {
            ids.push(row.id);
        }
    }

    Ok(ids)
}

pub fn compare(cell: &str, op: Comparator, literal: &str) -> bool {
    match op {
        Comparator::Equal => cell == literal,
        Comparator::NotEqual => cell != literal,
        Comparator::Like => cell.to_lowercase().contains(&literal.to_lowercase()),
        Comparator::GreaterThan => order(cell, literal) == Some(Ordering::Greater),
        Comparator::LessThan => order(cell, literal) == Some(Ordering::Less),
        Comparator::GreaterThanOrEqual => matches!(
            order(cell, literal),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Comparator::LessThanOrEqual => {
            matches!(order(cell, literal), Some(Ordering::Less | Ordering::Equal))
        }
    }
}

// Numeric when both sides are numbers, lexical otherwise
fn order(cell: &str, literal: &str) -> Option<Ordering> {
    match (as_number(cell), as_number(literal)) {
        (Some(a), Some(b)) => a.partial_cmp(&b),
        _ => Some(cell.cmp(literal)),
    }
}

fn as_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
