use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use cli_common::{DbError, Result};
use parser::ast::{
    AlterBody, AlterationType, Command, CreateTableBody, DeleteBody, Identifier, InsertBody,
    JoinBody, SelectBody, SelectItemList, UpdateBody,
};

use crate::engine::{ResultSet, StatementResult};
use crate::eval;
use crate::sequence::SequenceRegistry;
use crate::session::SessionContext;
use crate::storage::{self, Row, Table};
use crate::ID_COLUMN;

/// Everything one command may touch.
pub struct ExecutionContext<'a> {
    pub root: &'a Path,
    pub sequences: &'a SequenceRegistry,
    pub session: &'a mut SessionContext,
}

pub fn execute(command: &Command, ctx: &mut ExecutionContext) -> Result<StatementResult> {
    match command {
        Command::Use(name) => use_database(ctx, name),
        Command::CreateDatabase(name) => create_database(ctx, name),
        Command::DropDatabase(name) => drop_database(ctx, name),
        Command::CreateTable(body) => create_table(ctx, body),
        Command::DropTable(name) => drop_table(ctx, name),
        Command::Alter(body) => alter_table(ctx, body),
        Command::Insert(body) => insert(ctx, body),
        Command::Select(body) => select(ctx, body),
        Command::Update(body) => update(ctx, body),
        Command::Delete(body) => delete(ctx, body),
        Command::Join(body) => join(ctx, body),
    }
}

fn use_database(ctx: &mut ExecutionContext, name: &Identifier) -> Result<StatementResult> {
    let dir = storage::find_database(ctx.root, name.as_str())?
        .ok_or_else(|| DbError::DatabaseNotFound(name.value.clone()))?;

    let stored_name = directory_name(&dir);
    log::info!("Using database {stored_name}");
    ctx.session.active_database = Some(stored_name);

    Ok(StatementResult::default())
}

fn create_database(ctx: &mut ExecutionContext, name: &Identifier) -> Result<StatementResult> {
    if storage::database_exists(ctx.root, name.as_str())? {
        return Err(DbError::DatabaseAlreadyExists(name.value.clone()));
    }

    fs::create_dir_all(ctx.root.join(name.as_str()))?;
    log::info!("Created database {name}");

    Ok(StatementResult::default())
}

fn drop_database(ctx: &mut ExecutionContext, name: &Identifier) -> Result<StatementResult> {
    let dir = storage::find_database(ctx.root, name.as_str())?
        .ok_or_else(|| DbError::DatabaseNotFound(name.value.clone()))?;

    fs::remove_dir_all(&dir)?;
    log::info!("Dropped database {}", dir.display());

    let was_active = ctx
        .session
        .active_database
        .as_deref()
        .is_some_and(|active| active.eq_ignore_ascii_case(name.as_str()));

    if was_active {
        ctx.session.active_database = None;
    }

    Ok(StatementResult::default())
}

fn create_table(ctx: &mut ExecutionContext, body: &CreateTableBody) -> Result<StatementResult> {
    let db_dir = active_database(ctx)?;
    let table_name = body.table_name.as_str();

    if storage::table_exists(&db_dir, table_name)? {
        return Err(DbError::TableAlreadyExists(table_name.to_string()));
    }

    let mut columns: Vec<String> = Vec::with_capacity(body.column_list.len());
    for column in &body.column_list {
        check_not_id(column)?;

        if storage::column_position(&columns, column.as_str()).is_some() {
            return Err(DbError::AttributeExists(column.value.clone()));
        }

        columns.push(column.value.clone());
    }

    let table = Table::new(table_name, storage::table_path(&db_dir, table_name), &columns);
    storage::write_table(&table)?;
    log::info!("Created table {table_name} with columns {:?}", table.columns);

    Ok(StatementResult::default())
}

fn drop_table(ctx: &mut ExecutionContext, name: &Identifier) -> Result<StatementResult> {
    let db_dir = active_database(ctx)?;

    let path = storage::find_table(&db_dir, name.as_str())?
        .ok_or_else(|| DbError::TableNotFound(name.value.clone()))?;

    fs::remove_file(&path)?;
    log::info!("Dropped table {}", path.display());

    Ok(StatementResult::default())
}

fn alter_table(ctx: &mut ExecutionContext, body: &AlterBody) -> Result<StatementResult> {
    let db_dir = active_database(ctx)?;
    let mut table = load_table(&db_dir, &body.table_name)?;
    let column = &body.column_name;

    check_not_id(column)?;

    match body.alteration {
        AlterationType::Add => {
            if table.column_index(column.as_str()).is_some() {
                return Err(DbError::AttributeExists(column.value.clone()));
            }

            table.add_column(column.as_str());
        }
        AlterationType::Drop => {
            let index = table.require_column(column.as_str())?;
            table.drop_column(index);
        }
    }

    storage::write_table(&table)?;
    log::info!("Altered table {}: {} {column}", table.name, body.alteration);

    Ok(StatementResult::default())
}

fn insert(ctx: &mut ExecutionContext, body: &InsertBody) -> Result<StatementResult> {
    let db_dir = active_database(ctx)?;
    let mut table = load_table(&db_dir, &body.table_name)?;

    let expected = table.columns.len() - 1;
    if body.values.len() != expected {
        return Err(DbError::AttributeCountMismatch {
            expected,
            actual: body.values.len(),
        });
    }

    let id = ctx
        .sequences
        .allocate(&directory_name(&db_dir), &table.name)?;

    let values = body.values.iter().map(|v| v.as_cell()).collect();
    table.push_row(Row::new(id, values));

    storage::write_table(&table)?;
    log::info!("Inserted row {id} into {}", table.name);

    Ok(StatementResult::default())
}

fn select(ctx: &mut ExecutionContext, body: &SelectBody) -> Result<StatementResult> {
    let db_dir = active_database(ctx)?;
    let table = load_table(&db_dir, &body.table_name)?;

    let projection: Vec<usize> = match &body.select_item_list {
        SelectItemList::Wildcard => (0..table.columns.len()).collect(),
        SelectItemList::Columns(columns) => columns
            .iter()
            .map(|c| table.require_column(c.as_str()))
            .collect::<Result<_>>()?,
    };

    if let Some(condition) = &body.where_clause {
        eval::validate(condition, &table)?;
    }

    let mut rows = vec![];
    for row in &table.rows {
        let keep = match &body.where_clause {
            Some(condition) => eval::evaluate(condition, row, &table.columns)?,
            None => true,
        };

        if keep {
            rows.push(projection.iter().map(|&i| row.cells[i].clone()).collect());
        }
    }

    log::debug!("Selected {} of {} rows from {}", rows.len(), table.rows.len(), table.name);

    Ok(StatementResult::with_rows(ResultSet {
        columns: projection.iter().map(|&i| table.columns[i].clone()).collect(),
        rows,
    }))
}

fn update(ctx: &mut ExecutionContext, body: &UpdateBody) -> Result<StatementResult> {
    let db_dir = active_database(ctx)?;
    let mut table = load_table(&db_dir, &body.table_name)?;

    let mut assignments = Vec::with_capacity(body.assignments.len());
    for assignment in &body.assignments {
        check_not_id(&assignment.column_name)?;
        let index = table.require_column(assignment.column_name.as_str())?;
        assignments.push((index, assignment.value.as_cell()));
    }

    eval::validate(&body.where_clause, &table)?;
    let matched: HashSet<u64> = eval::matching_ids(&body.where_clause, &table)?
        .into_iter()
        .collect();

    if matched.is_empty() {
        return Ok(StatementResult::default());
    }

    for row in table.rows.iter_mut().filter(|r| matched.contains(&r.id)) {
        for (index, cell) in &assignments {
            row.cells[*index] = cell.clone();
        }
    }

    storage::write_table(&table)?;
    log::info!("Updated {} rows in {}", matched.len(), table.name);

    Ok(StatementResult::default())
}

fn delete(ctx: &mut ExecutionContext, body: &DeleteBody) -> Result<StatementResult> {
    let db_dir = active_database(ctx)?;
    let mut table = load_table(&db_dir, &body.table_name)?;

    eval::validate(&body.where_clause, &table)?;
    let matched: HashSet<u64> = eval::matching_ids(&body.where_clause, &table)?
        .into_iter()
        .collect();

    if matched.is_empty() {
        return Ok(StatementResult::default());
    }

    let before = table.rows.len();
    table.rows.retain(|r| !matched.contains(&r.id));

    storage::write_table(&table)?;
    log::info!("Deleted {} rows from {}", before - table.rows.len(), table.name);

    Ok(StatementResult::default())
}

/// Inner equi-join on string equality. Result rows get fresh ids from 1 and
/// carry every non-id, non-key column of the left table then the right, each
/// prefixed with its table name.
fn join(ctx: &mut ExecutionContext, body: &JoinBody) -> Result<StatementResult> {
    let db_dir = active_database(ctx)?;
    let left = load_table(&db_dir, &body.left_table)?;
    let right = load_table(&db_dir, &body.right_table)?;

    let left_key = left.require_column(body.left_attribute.as_str())?;
    let right_key = right.require_column(body.right_attribute.as_str())?;

    let left_carried = carried_columns(&left, left_key);
    let right_carried = carried_columns(&right, right_key);

    let mut columns = vec![String::from(ID_COLUMN)];
    columns.extend(left_carried.iter().map(|&i| qualified(&left, i)));
    columns.extend(right_carried.iter().map(|&i| qualified(&right, i)));

    let mut rows = vec![];
    for left_row in &left.rows {
        for right_row in &right.rows {
            if left_row.cells[left_key] != right_row.cells[right_key] {
                continue;
            }

            let mut cells = vec![(rows.len() + 1).to_string()];
            cells.extend(left_carried.iter().map(|&i| left_row.cells[i].clone()));
            cells.extend(right_carried.iter().map(|&i| right_row.cells[i].clone()));
            rows.push(cells);
        }
    }

    log::debug!("Joined {} and {} into {} rows", left.name, right.name, rows.len());

    Ok(StatementResult::with_rows(ResultSet { columns, rows }))
}

fn carried_columns(table: &Table, key: usize) -> Vec<usize> {
    (1..table.columns.len()).filter(|&i| i != key).collect()
}

fn qualified(table: &Table, index: usize) -> String {
    format!("{}.{}", table.name, table.columns[index])
}

/// Directory of the session's database, which must still exist.
fn active_database(ctx: &ExecutionContext) -> Result<PathBuf> {
    let name = ctx
        .session
        .active_database
        .as_deref()
        .ok_or(DbError::DatabaseNotSelected)?;

    storage::find_database(ctx.root, name)?.ok_or_else(|| DbError::DatabaseNotFound(name.to_string()))
}

fn load_table(db_dir: &Path, name: &Identifier) -> Result<Table> {
    let path = storage::find_table(db_dir, name.as_str())?
        .ok_or_else(|| DbError::TableNotFound(name.value.clone()))?;

    Ok(storage::read_table(&storage::table_name(&path), &path)?)
}

fn check_not_id(column: &Identifier) -> Result<()> {
    match column.as_str().eq_ignore_ascii_case(ID_COLUMN) {
        true => Err(DbError::ProtectedAttribute(column.value.clone())),
        false => Ok(()),
    }
}

fn directory_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
