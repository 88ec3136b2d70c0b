use rusqlite::Connection;
use uuid::Uuid;

use super::Database;
use crate::error::{StoreError, StoreResult, ValidationErrors};
use crate::models::{Coach, CreateCoachInput, School, UpdateCoachInput};
use crate::validate::Validate;

impl Database {
    /// Creates a playthrough's coach; fails with a conflict if the playthrough
    /// already has one. The returned coach has its schools resolved.
    pub fn create_coach(&self, input: CreateCoachInput) -> StoreResult<Coach> {
        let coach = Coach::new(input);
        coach.validate()?;

        let coach = self.transaction(|tx| {
            if Coach::find_by_playthrough_id(tx, &coach.playthrough_id)?.is_some() {
                return Err(StoreError::conflict("Playthrough already exists for this ID"));
            }
            ensure_schools_exist(tx, &coach)?;
            coach.insert(tx)?;
            coach.clone().populate(tx)
        })?;

        tracing::info!(playthrough_id = %coach.playthrough_id, "coach created");
        Ok(coach)
    }

    pub fn get_coach(&self, playthrough_id: &str) -> StoreResult<Option<Coach>> {
        self.with_connection(|conn| {
            Coach::find_by_playthrough_id(conn, playthrough_id)?
                .map(|coach| coach.populate(conn))
                .transpose()
        })
    }

    /// Applies a partial update; `None` when the playthrough has no coach.
    pub fn update_coach(&self, playthrough_id: &str, input: UpdateCoachInput) -> StoreResult<Option<Coach>> {
        self.transaction(|tx| {
            let Some(mut coach) = Coach::find_by_playthrough_id(tx, playthrough_id)? else {
                return Ok(None);
            };
            coach.apply(input);
            coach.validate()?;
            ensure_schools_exist(tx, &coach)?;
            coach.update(tx)?;
            coach.populate(tx).map(Some)
        })
    }

    /// Every coach, newest first, with schools resolved.
    pub fn list_coaches(&self) -> StoreResult<Vec<Coach>> {
        self.with_connection(|conn| {
            Coach::list(conn)?
                .into_iter()
                .map(|coach| coach.populate(conn))
                .collect()
        })
    }

    pub fn most_recent_coach(&self) -> StoreResult<Option<Coach>> {
        self.with_connection(|conn| {
            Coach::most_recently_updated(conn)?
                .map(|coach| coach.populate(conn))
                .transpose()
        })
    }
}

fn ensure_schools_exist(conn: &Connection, coach: &Coach) -> StoreResult<()> {
    let mut errors = ValidationErrors::default();
    if !school_exists(conn, coach.selected_team.id())? {
        errors.extend(ValidationErrors::single(
            "selectedTeam",
            "Selected team must reference an existing school",
            coach.selected_team.id(),
        ));
    }
    if !school_exists(conn, coach.alma_mater.id())? {
        errors.extend(ValidationErrors::single(
            "almaMater",
            "Alma mater must reference an existing school",
            coach.alma_mater.id(),
        ));
    }
    errors.into_result().map_err(StoreError::from)
}

fn school_exists(conn: &Connection, id: Uuid) -> StoreResult<bool> {
    Ok(School::find_by_id(conn, &id)?.is_some())
}
