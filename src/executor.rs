/*
Validates a parsed SELECT against the schema, chooses between the indexed
and full-scan paths, and projects matching rows into pipe-delimited
output lines (spec §4.8).
*/

use anyhow::{Context, Result};
use itertools::Itertools;
use log::debug;

use crate::btree::{collect_table_leaf_cells, find_rowids, get_rows_by_rowids};
use crate::cell::TableLeafCell;
use crate::error::EngineError;
use crate::pager::Pager;
use crate::schema::Schema;
use crate::sql::{ColumnDef, ColumnRef, CreateIndexStmt, CreateTableStmt, Lexer, Parser, SelectStmt, Statement};
use crate::value::Value;

pub enum QueryOutput {
    Count(usize),
    Rows(Vec<String>),
}

pub fn execute(pager: &Pager, schema: &Schema, sql: &str) -> Result<QueryOutput> {
    let statement = parse_statement(sql)?;

    let select = match statement {
        Statement::Select(select) => select,
        _ => return Err(EngineError::Sql("only SELECT queries can be executed".to_string()).into()),
    };

    let table_info = schema
        .table(&select.table)
        .ok_or_else(|| EngineError::Semantic(format!("unknown table '{}'", select.table)))?;

    let table_def = parse_create_table(&table_info.sql)?;
    let primary_key_index = table_def.columns.iter().position(|c| c.is_primary_key);

    validate_count_star_alone(&select)?;
    let columns_to_retrieve = columns_to_retrieve(&select)?;
    for name in &columns_to_retrieve {
        find_column_index(&table_def.columns, name)
            .ok_or_else(|| EngineError::Semantic(format!("unknown column '{name}'")))?;
    }

    let cells = if let Some(where_clause) = &select.where_clause {
        match indexed_path(pager, schema, &select.table, where_clause)? {
            Some(rowids) => {
                debug!("using index path for column '{}': {} row-ids", where_clause.column, rowids.len());
                get_rows_by_rowids(pager, table_info.root_page, &rowids)?
            }
            None => {
                debug!("no usable index for column '{}', falling back to full scan", where_clause.column);
                let column_index = find_column_index(&table_def.columns, &where_clause.column)
                    .ok_or_else(|| EngineError::Semantic(format!("unknown column '{}'", where_clause.column)))?;
                collect_table_leaf_cells(pager, table_info.root_page)?
                    .into_iter()
                    .filter(|cell| row_value(cell, column_index, primary_key_index) == where_clause.value)
                    .collect()
            }
        }
    } else {
        collect_table_leaf_cells(pager, table_info.root_page)?
    };

    if select.columns.iter().any(|c| c == &ColumnRef::CountStar) {
        return Ok(QueryOutput::Count(cells.len()));
    }

    let column_indexes = select
        .columns
        .iter()
        .map(|c| match c {
            ColumnRef::Name(name) => find_column_index(&table_def.columns, name)
                .ok_or_else(|| EngineError::Semantic(format!("unknown column '{name}'")).into()),
            ColumnRef::CountStar => unreachable!("count(*) validated to be alone in projection"),
        })
        .collect::<Result<Vec<usize>>>()?;

    let rows = cells
        .iter()
        .map(|cell| {
            column_indexes
                .iter()
                .map(|&idx| row_value(cell, idx, primary_key_index).to_string())
                .join("|")
        })
        .collect();

    Ok(QueryOutput::Rows(rows))
}

fn parse_statement(sql: &str) -> Result<Statement> {
    let tokens = Lexer::new(sql)
        .tokenize()
        .map_err(|e| EngineError::Sql(e.to_string()))?;
    Parser::new(tokens)
        .parse_statement()
        .map_err(|e| EngineError::Sql(e.to_string()).into())
}

fn parse_create_table(sql: &str) -> Result<CreateTableStmt> {
    match parse_statement(sql).with_context(|| format!("parsing stored schema text {sql:?}"))? {
        Statement::CreateTable(stmt) => Ok(stmt),
        _ => Err(EngineError::Format(format!("schema sql is not a CREATE TABLE statement: {sql:?}")).into()),
    }
}

fn parse_create_index(sql: &str) -> Result<CreateIndexStmt> {
    match parse_statement(sql).with_context(|| format!("parsing stored schema text {sql:?}"))? {
        Statement::CreateIndex(stmt) => Ok(stmt),
        _ => Err(EngineError::Format(format!("schema sql is not a CREATE INDEX statement: {sql:?}")).into()),
    }
}

fn validate_count_star_alone(select: &SelectStmt) -> Result<()> {
    let has_count = select.columns.iter().any(|c| c == &ColumnRef::CountStar);
    if has_count && select.columns.len() > 1 {
        return Err(EngineError::Semantic("count(*) must be the only projected column".to_string()).into());
    }
    Ok(())
}

fn columns_to_retrieve(select: &SelectStmt) -> Result<Vec<String>> {
    let mut names: Vec<String> = select
        .columns
        .iter()
        .filter_map(|c| match c {
            ColumnRef::Name(name) => Some(name.clone()),
            ColumnRef::CountStar => None,
        })
        .collect();
    if let Some(where_clause) = &select.where_clause {
        names.push(where_clause.column.clone());
    }
    Ok(names)
}

fn find_column_index(columns: &[ColumnDef], name: &str) -> Option<usize> {
    columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
}

// resolves step 6: if an index exists on this table whose first indexed
// column is the WHERE column, walk it and return its row-ids; otherwise
// `None`, signaling the caller to fall back to a full scan.
fn indexed_path(
    pager: &Pager,
    schema: &Schema,
    table_name: &str,
    where_clause: &crate::sql::WhereClause,
) -> Result<Option<Vec<i64>>> {
    for index_info in schema.indexes_for_table(table_name) {
        let index_def = parse_create_index(&index_info.sql)?;
        let Some(first_column) = index_def.columns.first() else {
            continue;
        };
        if first_column.eq_ignore_ascii_case(&where_clause.column) {
            let rowids = find_rowids(pager, index_info.root_page, &[where_clause.value.clone()])?;
            return Ok(Some(rowids));
        }
    }
    Ok(None)
}

// substitutes the cell's row-id for the INTEGER PRIMARY KEY column, since
// that column's value is not stored in the record body (spec §3 Row).
fn row_value(cell: &TableLeafCell, column_index: usize, primary_key_index: Option<usize>) -> Value {
    if Some(column_index) == primary_key_index {
        Value::Integer(cell.rowid)
    } else {
        cell.record
            .values
            .get(column_index)
            .cloned()
            .unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn make_table_def(sql: &str) -> CreateTableStmt {
        parse_create_table(sql).unwrap()
    }

    #[test]
    fn primary_key_column_is_detected() {
        let table = make_table_def("CREATE TABLE apples (id integer primary key, name text, color text)");
        assert_eq!(table.columns.iter().position(|c| c.is_primary_key), Some(0));
    }

    #[test]
    fn row_value_substitutes_rowid_for_primary_key() {
        let cell = TableLeafCell {
            rowid: 7,
            record: Record {
                values: vec![Value::Null, Value::Text("Fuji".to_string())],
            },
        };
        assert_eq!(row_value(&cell, 0, Some(0)), Value::Integer(7));
        assert_eq!(row_value(&cell, 1, Some(0)), Value::Text("Fuji".to_string()));
    }

    #[test]
    fn count_star_must_be_alone() {
        let select = SelectStmt {
            columns: vec![ColumnRef::CountStar, ColumnRef::Name("name".to_string())],
            table: "apples".to_string(),
            where_clause: None,
        };
        assert!(validate_count_star_alone(&select).is_err());
    }

    #[test]
    fn columns_to_retrieve_includes_where_column() {
        let select = SelectStmt {
            columns: vec![ColumnRef::Name("id".to_string())],
            table: "apples".to_string(),
            where_clause: Some(crate::sql::WhereClause {
                column: "color".to_string(),
                value: Value::Text("Red".to_string()),
            }),
        };
        let names = columns_to_retrieve(&select).unwrap();
        assert_eq!(names, vec!["id".to_string(), "color".to_string()]);
    }
}
