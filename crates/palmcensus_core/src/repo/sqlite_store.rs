//! SQLite-backed record store.
//!
//! # Responsibility
//! - Persist and query census records over a migrated connection.
//! - Map constraint violations to `RepoError::Conflict`.
//!
//! # Invariants
//! - Timestamps are stored as UTC epoch milliseconds.
//! - `companies.singleton_key` keeps at most one company row.

use crate::db::migrations::latest_version;
use crate::model::census::{CensusData, CensusOperation, CensusType};
use crate::model::company::Company;
use crate::model::tree::{PalmTree, Productivity, TreeStatus};
use crate::repo::record_store::{EnsuredCompany, RecordStore, RepoError, RepoResult};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, ErrorCode, Row, Transaction, TransactionBehavior};

const DATE_FORMAT: &str = "%Y-%m-%d";

const COMPANY_SELECT_SQL: &str = "SELECT
    name,
    area_hectares,
    location,
    established_date,
    created_at
FROM companies";

const OPERATION_SELECT_SQL: &str = "SELECT
    operation_id,
    date,
    entity,
    census_type,
    tree_image_url,
    hectare_covered,
    prediction_result,
    action_recommendation,
    created_at
FROM census_operations";

const MEASUREMENT_SELECT_SQL: &str = "SELECT
    operation_id,
    male_flower,
    female_flower,
    purse_flower,
    red_fruit,
    black_fruit,
    total_palm_trees,
    productive_trees,
    unproductive_trees,
    land_area_census,
    created_at
FROM census_data";

const TREE_SELECT_SQL: &str = "SELECT
    tree_id,
    latitude,
    longitude,
    status,
    productivity,
    health_score,
    last_census_date,
    created_at
FROM palm_trees";

/// Record store over a connection returned by `open_db`/`open_db_in_memory`.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a connection, rejecting one whose schema is not fully migrated.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if version != latest_version() {
            return Err(RepoError::InvalidData(format!(
                "connection schema version {version} does not match expected {}",
                latest_version()
            )));
        }
        Ok(Self { conn })
    }

    fn count(&self, sql: &str) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        non_negative(count, "count")
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn company(&self) -> RepoResult<Option<Company>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{COMPANY_SELECT_SQL} ORDER BY id ASC LIMIT 1;"))?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_company_row(row)?)),
            None => Ok(None),
        }
    }

    fn ensure_company(&self, candidate: &Company) -> RepoResult<EnsuredCompany> {
        candidate.validate()?;

        let inserted = self
            .conn
            .execute(
                "INSERT INTO companies (
                    name,
                    area_hectares,
                    location,
                    established_date,
                    created_at,
                    singleton_key
                ) VALUES (?1, ?2, ?3, ?4, ?5, 1)
                ON CONFLICT(singleton_key) DO NOTHING;",
                params![
                    candidate.name.as_str(),
                    candidate.area_hectares,
                    candidate.location.as_deref(),
                    candidate
                        .established_date
                        .map(|date| date.format(DATE_FORMAT).to_string()),
                    candidate.created_at.timestamp_millis(),
                ],
            )
            .map_err(|err| map_write_error(err, "company"))?;

        let company = self.company()?.ok_or_else(|| {
            RepoError::InvalidData("company row missing after upsert".to_string())
        })?;
        Ok(EnsuredCompany {
            company,
            created: inserted == 1,
        })
    }

    fn count_companies(&self) -> RepoResult<u64> {
        self.count("SELECT COUNT(*) FROM companies;")
    }

    fn insert_operation(&self, operation: &CensusOperation) -> RepoResult<()> {
        operation.validate()?;

        self.conn
            .execute(
                "INSERT INTO census_operations (
                    operation_id,
                    date,
                    entity,
                    census_type,
                    tree_image_url,
                    hectare_covered,
                    prediction_result,
                    action_recommendation,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
                params![
                    operation.operation_id.as_str(),
                    operation.date.timestamp_millis(),
                    operation.entity.as_str(),
                    operation.census_type.as_str(),
                    operation.tree_image_url.as_deref(),
                    operation.hectare_covered,
                    operation.prediction_result.as_deref(),
                    operation.action_recommendation.as_deref(),
                    operation.created_at.timestamp_millis(),
                ],
            )
            .map_err(|err| map_write_error(err, &operation.operation_id))?;
        Ok(())
    }

    fn recent_operations(&self, limit: u32) -> RepoResult<Vec<CensusOperation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OPERATION_SELECT_SQL} ORDER BY date DESC, id ASC LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([i64::from(limit)])?;
        let mut operations = Vec::new();
        while let Some(row) = rows.next()? {
            operations.push(parse_operation_row(row)?);
        }
        Ok(operations)
    }

    fn count_operations(&self) -> RepoResult<u64> {
        self.count("SELECT COUNT(*) FROM census_operations;")
    }

    fn insert_measurement(&self, data: &CensusData) -> RepoResult<()> {
        data.validate()?;

        self.conn
            .execute(
                "INSERT INTO census_data (
                    operation_id,
                    male_flower,
                    female_flower,
                    purse_flower,
                    red_fruit,
                    black_fruit,
                    total_palm_trees,
                    productive_trees,
                    unproductive_trees,
                    land_area_census,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11);",
                params![
                    data.operation_id.as_str(),
                    data.male_flower,
                    data.female_flower,
                    data.purse_flower,
                    data.red_fruit,
                    data.black_fruit,
                    data.total_palm_trees,
                    data.productive_trees,
                    data.unproductive_trees,
                    data.land_area_census,
                    data.created_at.timestamp_millis(),
                ],
            )
            .map_err(|err| map_write_error(err, &data.operation_id))?;
        Ok(())
    }

    fn measurement_for_operation(&self, operation_id: &str) -> RepoResult<Option<CensusData>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEASUREMENT_SELECT_SQL} WHERE operation_id = ?1 ORDER BY id ASC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([operation_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_measurement_row(row)?)),
            None => Ok(None),
        }
    }

    fn latest_measurement(&self) -> RepoResult<Option<CensusData>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEASUREMENT_SELECT_SQL} ORDER BY created_at DESC, id DESC LIMIT 1;"
        ))?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_measurement_row(row)?)),
            None => Ok(None),
        }
    }

    fn count_measurements(&self) -> RepoResult<u64> {
        self.count("SELECT COUNT(*) FROM census_data;")
    }

    fn insert_tree(&self, tree: &PalmTree) -> RepoResult<()> {
        tree.validate()?;

        self.conn
            .execute(
                "INSERT INTO palm_trees (
                    tree_id,
                    latitude,
                    longitude,
                    status,
                    productivity,
                    health_score,
                    last_census_date,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    tree.tree_id.as_str(),
                    tree.latitude,
                    tree.longitude,
                    tree.status.as_str(),
                    tree.productivity.as_str(),
                    tree.health_score,
                    tree.last_census_date.map(|date| date.timestamp_millis()),
                    tree.created_at.timestamp_millis(),
                ],
            )
            .map_err(|err| map_write_error(err, &tree.tree_id))?;
        Ok(())
    }

    fn list_trees(&self) -> RepoResult<Vec<PalmTree>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TREE_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut trees = Vec::new();
        while let Some(row) = rows.next()? {
            trees.push(parse_tree_row(row)?);
        }
        Ok(trees)
    }

    fn count_trees(&self, productivity: Option<Productivity>) -> RepoResult<u64> {
        let count: i64 = match productivity {
            Some(productivity) => self.conn.query_row(
                "SELECT COUNT(*) FROM palm_trees WHERE productivity = ?1;",
                [productivity.as_str()],
                |row| row.get(0),
            )?,
            None => self
                .conn
                .query_row("SELECT COUNT(*) FROM palm_trees;", [], |row| row.get(0))?,
        };
        non_negative(count, "palm_trees count")
    }

    fn in_exclusive_transaction<T, F>(&self, work: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        // IMMEDIATE takes the write lock up front so check-then-insert
        // sequences from other connections wait on the busy timeout.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let value = work(self)?;
        tx.commit()?;
        Ok(value)
    }
}

fn map_write_error(err: rusqlite::Error, key: &str) -> RepoError {
    if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        return RepoError::Conflict(format!("`{key}`: {err}"));
    }
    err.into()
}

fn parse_company_row(row: &Row<'_>) -> RepoResult<Company> {
    let established_date = match row.get::<_, Option<String>>("established_date")? {
        Some(text) => Some(NaiveDate::parse_from_str(&text, DATE_FORMAT).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid date `{text}` in companies.established_date"
            ))
        })?),
        None => None,
    };

    let company = Company {
        name: row.get("name")?,
        area_hectares: row.get("area_hectares")?,
        location: row.get("location")?,
        established_date,
        created_at: parse_timestamp(row.get("created_at")?, "companies.created_at")?,
    };
    company.validate()?;
    Ok(company)
}

fn parse_operation_row(row: &Row<'_>) -> RepoResult<CensusOperation> {
    let type_text: String = row.get("census_type")?;
    let census_type = CensusType::parse(&type_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid census type `{type_text}` in census_operations.census_type"
        ))
    })?;

    let operation = CensusOperation {
        operation_id: row.get("operation_id")?,
        date: parse_timestamp(row.get("date")?, "census_operations.date")?,
        entity: row.get("entity")?,
        census_type,
        tree_image_url: row.get("tree_image_url")?,
        hectare_covered: row.get("hectare_covered")?,
        prediction_result: row.get("prediction_result")?,
        action_recommendation: row.get("action_recommendation")?,
        created_at: parse_timestamp(row.get("created_at")?, "census_operations.created_at")?,
    };
    operation.validate()?;
    Ok(operation)
}

fn parse_measurement_row(row: &Row<'_>) -> RepoResult<CensusData> {
    let count = |column: &'static str| -> RepoResult<u32> {
        let value: i64 = row.get(column)?;
        u32::try_from(value).map_err(|_| {
            RepoError::InvalidData(format!("invalid count `{value}` in census_data.{column}"))
        })
    };

    let data = CensusData {
        operation_id: row.get("operation_id")?,
        male_flower: count("male_flower")?,
        female_flower: count("female_flower")?,
        purse_flower: count("purse_flower")?,
        red_fruit: count("red_fruit")?,
        black_fruit: count("black_fruit")?,
        total_palm_trees: count("total_palm_trees")?,
        productive_trees: count("productive_trees")?,
        unproductive_trees: count("unproductive_trees")?,
        land_area_census: row.get("land_area_census")?,
        created_at: parse_timestamp(row.get("created_at")?, "census_data.created_at")?,
    };
    data.validate()?;
    Ok(data)
}

fn parse_tree_row(row: &Row<'_>) -> RepoResult<PalmTree> {
    let status_text: String = row.get("status")?;
    let status = TreeStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid status `{status_text}` in palm_trees.status"
        ))
    })?;

    let productivity_text: String = row.get("productivity")?;
    let productivity = Productivity::parse(&productivity_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid productivity `{productivity_text}` in palm_trees.productivity"
        ))
    })?;

    let last_census_date = row
        .get::<_, Option<i64>>("last_census_date")?
        .map(|millis| parse_timestamp(millis, "palm_trees.last_census_date"))
        .transpose()?;

    let tree = PalmTree {
        tree_id: row.get("tree_id")?,
        latitude: row.get("latitude")?,
        longitude: row.get("longitude")?,
        status,
        productivity,
        health_score: row.get("health_score")?,
        last_census_date,
        created_at: parse_timestamp(row.get("created_at")?, "palm_trees.created_at")?,
    };
    tree.validate()?;
    Ok(tree)
}

fn parse_timestamp(millis: i64, column: &str) -> RepoResult<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid timestamp `{millis}` in {column}"))
    })
}

fn non_negative(value: i64, what: &str) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("negative {what}: {value}")))
}

