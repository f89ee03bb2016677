/*
Recursive descent over a token window with single-token lookahead, plus a
two-token check for `PRIMARY KEY`:

  stmt        := select | create
  select      := SELECT col (',' col)* FROM IDENT (WHERE where)?
  col         := IDENT | STRING | IDENT '(' '*' ')'     -- only count(*) recognized
  where       := IDENT '=' (NUMBER | STRING)
  create      := CREATE (TABLE table_def | INDEX index_def)
  table_def   := IDENT '(' col_def (',' col_def)* ')'   -- trailing tokens past ')' ignored
  col_def     := IDENT <any tokens until ',' or ')'>    -- records isPrimaryKey if it saw PRIMARY KEY
  index_def   := IDENT ON IDENT '(' IDENT (',' IDENT)* ')'
*/

use anyhow::{bail, Result};

use super::lexer::Token;
use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnRef {
    Name(String),
    CountStar,
}

#[derive(Debug, Clone)]
pub struct WhereClause {
    pub column: String,
    pub value: Value,
}

#[derive(Debug, Clone)]
pub struct SelectStmt {
    pub columns: Vec<ColumnRef>,
    pub table: String,
    pub where_clause: Option<WhereClause>,
}

#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub name: String,
    pub is_primary_key: bool,
}

#[derive(Debug, Clone)]
pub struct CreateTableStmt {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

#[derive(Debug, Clone)]
pub struct CreateIndexStmt {
    pub name: String,
    pub table: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Select(SelectStmt),
    CreateTable(CreateTableStmt),
    CreateIndex(CreateIndexStmt),
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser { tokens, position: 0 }
    }

    pub fn parse_statement(&mut self) -> Result<Statement> {
        match self.peek() {
            Token::Select => self.parse_select(),
            Token::Create => self.parse_create(),
            other => bail!("expected SELECT or CREATE, found {other:?}"),
        }
    }

    fn peek(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&Token::Eof)
    }

    fn peek_next(&self) -> &Token {
        self.tokens.get(self.position + 1).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens.get(self.position).cloned().unwrap_or(Token::Eof);
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }

    fn expect(&mut self, expected: &Token) -> Result<()> {
        let token = self.advance();
        if &token == expected {
            Ok(())
        } else {
            bail!("expected {expected:?}, found {token:?}")
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        match self.advance() {
            Token::Identifier(name) => Ok(name),
            other => bail!("expected identifier, found {other:?}"),
        }
    }

    fn parse_select(&mut self) -> Result<Statement> {
        self.expect(&Token::Select)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_ref()?);
            if self.peek() == &Token::Comma {
                self.advance();
                continue;
            }
            break;
        }

        self.expect(&Token::From)?;
        let table = self.expect_identifier()?;

        let where_clause = if self.peek() == &Token::Where {
            self.advance();
            Some(self.parse_where()?)
        } else {
            None
        };

        Ok(Statement::Select(SelectStmt {
            columns,
            table,
            where_clause,
        }))
    }

    fn parse_column_ref(&mut self) -> Result<ColumnRef> {
        match self.advance() {
            Token::StringLiteral(name) => Ok(ColumnRef::Name(name)),
            Token::Identifier(name) => {
                if name.eq_ignore_ascii_case("count") && self.peek() == &Token::LParen {
                    self.advance();
                    self.expect(&Token::Star)?;
                    self.expect(&Token::RParen)?;
                    Ok(ColumnRef::CountStar)
                } else {
                    Ok(ColumnRef::Name(name))
                }
            }
            other => bail!("expected a column reference, found {other:?}"),
        }
    }

    fn parse_where(&mut self) -> Result<WhereClause> {
        let column = self.expect_identifier()?;
        self.expect(&Token::Equals)?;
        let value = match self.advance() {
            Token::Number(n) => Value::Integer(n),
            Token::StringLiteral(s) => Value::Text(s),
            other => bail!("expected a literal after '=', found {other:?}"),
        };
        Ok(WhereClause { column, value })
    }

    fn parse_create(&mut self) -> Result<Statement> {
        self.expect(&Token::Create)?;
        match self.peek() {
            Token::Table => self.parse_create_table(),
            Token::Index => self.parse_create_index(),
            other => bail!("expected TABLE or INDEX after CREATE, found {other:?}"),
        }
    }

    fn parse_create_table(&mut self) -> Result<Statement> {
        self.expect(&Token::Table)?;
        let name = self.expect_identifier()?;
        self.expect(&Token::LParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.parse_column_def()?);
            if self.peek() == &Token::Comma {
                self.advance();
                continue;
            }
            break;
        }
        self.expect(&Token::RParen)?;
        // trailing tokens past ')' (table-level constraints, WITHOUT ROWID,
        // stray semicolons) are ignored rather than rejected.

        Ok(Statement::CreateTable(CreateTableStmt { name, columns }))
    }

    fn parse_column_def(&mut self) -> Result<ColumnDef> {
        let name = self.expect_identifier()?;
        let mut is_primary_key = false;

        loop {
            match self.peek() {
                Token::Comma | Token::RParen => break,
                Token::Eof => bail!("unexpected end of input in column definition for '{name}'"),
                Token::Primary if self.peek_next() == &Token::Key => {
                    is_primary_key = true;
                    self.advance();
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }

        Ok(ColumnDef { name, is_primary_key })
    }

    fn parse_create_index(&mut self) -> Result<Statement> {
        self.expect(&Token::Index)?;
        let name = self.expect_identifier()?;
        self.expect(&Token::On)?;
        let table = self.expect_identifier()?;
        self.expect(&Token::LParen)?;

        let mut columns = Vec::new();
        loop {
            columns.push(self.expect_identifier()?);
            if self.peek() == &Token::Comma {
                self.advance();
                continue;
            }
            break;
        }
        self.expect(&Token::RParen)?;

        Ok(Statement::CreateIndex(CreateIndexStmt { name, table, columns }))
    }
}
