use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::Database;
use crate::error::{StoreError, StoreResult};
use crate::models::{CreateSchoolInput, School, SchoolFilter};
use crate::validate::Validate;

/// Outcome of replacing the school catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub deleted: usize,
    pub inserted: usize,
    pub by_conference: BTreeMap<String, usize>,
}

impl Database {
    pub fn create_school(&self, input: CreateSchoolInput) -> StoreResult<School> {
        let input = input.normalized();
        input.validate()?;
        let school = School::new(input);
        self.transaction(|tx| school.insert(tx))?;
        tracing::info!(school = %school.name, "school created");
        Ok(school)
    }

    pub fn list_schools(&self, filter: &SchoolFilter) -> StoreResult<Vec<School>> {
        self.with_connection(|conn| School::list(conn, filter))
    }

    pub fn get_school(&self, name: &str) -> StoreResult<Option<School>> {
        self.with_connection(|conn| School::find_by_name(conn, name))
    }

    pub fn schools_by_conference(&self, conference: &str) -> StoreResult<Vec<School>> {
        self.with_connection(|conn| School::list_active_by_conference(conn, conference))
    }

    pub fn schools_by_state(&self, state: &str) -> StoreResult<Vec<School>> {
        self.with_connection(|conn| School::list_active_by_state(conn, state))
    }

    pub fn conferences(&self) -> StoreResult<Vec<String>> {
        self.with_connection(|conn| School::active_conferences(conn))
    }

    /// Full records for the active schools named in `name`'s rival list, or
    /// `None` when there is no such school.
    pub fn school_rivals(&self, name: &str) -> StoreResult<Option<Vec<School>>> {
        self.with_connection(|conn| {
            let Some(school) = School::find_by_name(conn, name)? else {
                return Ok(None);
            };
            School::list_active_named(conn, &school.rivals).map(Some)
        })
    }

    /// Replaces the whole catalog with `schools` in one transaction.
    ///
    /// Schools whose name survives the reseed keep their id so coach
    /// references stay valid. Dropping a school a coach still points at fails
    /// the commit and leaves the old catalog in place.
    pub fn seed_schools(&self, schools: Vec<CreateSchoolInput>) -> StoreResult<SeedReport> {
        let schools: Vec<School> = schools
            .into_iter()
            .map(|input| {
                let input = input.normalized();
                input.validate()?;
                Ok(School::new(input))
            })
            .collect::<StoreResult<_>>()?;

        let result = self.transaction(|tx| {
            let existing: HashMap<String, uuid::Uuid> = School::list(tx, &SchoolFilter::default())?
                .into_iter()
                .map(|school| (school.name, school.id))
                .collect();

            let mut report = SeedReport {
                deleted: School::delete_all(tx)?,
                ..SeedReport::default()
            };
            for mut school in schools {
                if let Some(id) = existing.get(&school.name) {
                    school.id = *id;
                }
                school.insert(tx)?;
                report.inserted += 1;
                *report
                    .by_conference
                    .entry(school.conference.as_str().to_string())
                    .or_default() += 1;
            }
            Ok(report)
        });

        match result {
            Ok(report) => {
                tracing::info!(deleted = report.deleted, inserted = report.inserted, "school catalog seeded");
                Ok(report)
            }
            Err(StoreError::Sqlite(err)) if is_foreign_key_violation(&err) => Err(StoreError::conflict(
                "Seed would remove schools that coaches still reference",
            )),
            Err(err) => Err(err),
        }
    }
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}
