use crate::database::Database;
use crate::error::{PrepareError, Result};
use crate::row::Row;

#[derive(Debug, PartialEq, Eq)]
pub enum Statement {
    Insert(Row),
    Select,
}

/// What a successfully executed statement produced.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    Rows(Vec<Row>),
}

impl Statement {
    /// Parses one input line, e.g. `insert 1 user1 person1@example.com` or `select`.
    pub fn prepare(input: &str) -> std::result::Result<Self, PrepareError> {
        let tokens: Vec<&str> = input.split_whitespace().collect();
        match tokens.as_slice() {
            ["insert", args @ ..] => Self::prepare_insert(args),
            ["select"] => Ok(Statement::Select),
            ["select", ..] => Err(PrepareError::Syntax),
            _ => Err(PrepareError::Unrecognized(input.to_string())),
        }
    }

    fn prepare_insert(args: &[&str]) -> std::result::Result<Self, PrepareError> {
        let [id, username, email] = args else {
            return Err(PrepareError::Syntax);
        };
        let id: i64 = id.parse().map_err(|_| PrepareError::Syntax)?;
        if id < 0 {
            return Err(PrepareError::NegativeId);
        }
        let id = u32::try_from(id).map_err(|_| PrepareError::Syntax)?;

        Ok(Statement::Insert(Row::new(id, username, email)?))
    }

    pub fn execute(&self, db: &mut Database) -> Result<Outcome> {
        match self {
            Statement::Insert(row) => {
                db.insert(row)?;
                Ok(Outcome::Inserted)
            }
            Statement::Select => Ok(Outcome::Rows(db.select_all()?)),
        }
    }
}
