/*
A hand-rolled tokenizer and recursive-descent parser for the tiny SQL
subset this engine understands: CREATE TABLE, CREATE INDEX, and
SELECT ... [WHERE col = literal]. No joins, subqueries, booleans,
floats, ORDER BY/GROUP BY/LIMIT, or aggregates other than count(*).
*/

pub mod lexer;
pub mod parser;

pub use lexer::{Lexer, Token};
pub use parser::{ColumnDef, ColumnRef, CreateIndexStmt, CreateTableStmt, Parser, SelectStmt, Statement, WhereClause};
