use rusqlite::Connection;

use super::Database;
use crate::error::{StoreError, StoreResult};
use crate::models::{
    CreateScheduleInput, Game, GameUpdate, Schedule, ScheduleStats, UpdateScheduleInput,
};

impl Database {
    pub fn create_schedule(&self, input: CreateScheduleInput) -> StoreResult<Schedule> {
        let mut schedule = Schedule::new(input);
        schedule.prepare_for_save()?;

        self.transaction(|tx| {
            if Schedule::find(tx, &schedule.playthrough_id, schedule.year)?.is_some() {
                return Err(StoreError::conflict(
                    "Schedule already exists for this playthrough and year",
                ));
            }
            schedule.insert(tx)
        })?;

        tracing::info!(
            playthrough_id = %schedule.playthrough_id,
            year = schedule.year,
            games = schedule.games.len(),
            "schedule created"
        );
        Ok(schedule)
    }

    pub fn list_schedules(&self) -> StoreResult<Vec<Schedule>> {
        self.with_connection(|conn| Schedule::list(conn))
    }

    pub fn schedules_by_playthrough(&self, playthrough_id: &str) -> StoreResult<Vec<Schedule>> {
        self.with_connection(|conn| Schedule::list_by_playthrough(conn, playthrough_id))
    }

    pub fn schedules_by_year(&self, year: i32) -> StoreResult<Vec<Schedule>> {
        self.with_connection(|conn| Schedule::list_by_year(conn, year))
    }

    pub fn schedules_by_team(&self, team_name: &str) -> StoreResult<Vec<Schedule>> {
        self.with_connection(|conn| Schedule::list_by_team(conn, team_name))
    }

    pub fn get_schedule(&self, playthrough_id: &str, year: i32) -> StoreResult<Option<Schedule>> {
        self.with_connection(|conn| Schedule::find(conn, playthrough_id, year))
    }

    pub fn schedule_stats(&self, playthrough_id: &str, year: i32) -> StoreResult<Option<ScheduleStats>> {
        Ok(self.get_schedule(playthrough_id, year)?.map(|schedule| schedule.stats()))
    }

    /// Replaces the team name, games and/or metadata of an existing schedule.
    pub fn update_schedule(
        &self,
        playthrough_id: &str,
        year: i32,
        input: UpdateScheduleInput,
    ) -> StoreResult<Schedule> {
        self.modify_schedule(playthrough_id, year, |schedule| {
            schedule.apply(input);
            schedule.prepare_for_save().map(|()| true)
        })
    }

    pub fn add_game(&self, playthrough_id: &str, year: i32, game: Game) -> StoreResult<Schedule> {
        self.modify_schedule(playthrough_id, year, |schedule| schedule.add_game(game).map(|()| true))
    }

    pub fn update_game(
        &self,
        playthrough_id: &str,
        year: i32,
        week: i32,
        update: GameUpdate,
    ) -> StoreResult<Schedule> {
        self.modify_schedule(playthrough_id, year, |schedule| {
            schedule.update_game(week, update).map(|()| true)
        })
    }

    /// Removes a week's game. Missing weeks are a no-op and nothing is
    /// written; removing the last game fails and the stored schedule is
    /// unchanged.
    pub fn remove_game(&self, playthrough_id: &str, year: i32, week: i32) -> StoreResult<Schedule> {
        self.modify_schedule(playthrough_id, year, |schedule| schedule.remove_game(week))
    }

    pub fn delete_schedule(&self, playthrough_id: &str, year: i32) -> StoreResult<bool> {
        let deleted = self.transaction(|tx| Schedule::delete(tx, playthrough_id, year))?;
        if deleted {
            tracing::info!(playthrough_id, year, "schedule deleted");
        }
        Ok(deleted)
    }

    /// Creates the season's schedule, or replaces its team name and games if
    /// one already exists.
    pub fn export_schedule(
        &self,
        playthrough_id: &str,
        year: i32,
        team_name: &str,
        games: Vec<Game>,
    ) -> StoreResult<Schedule> {
        self.transaction(|tx| match Schedule::find(tx, playthrough_id, year)? {
            Some(mut schedule) => {
                schedule.apply(UpdateScheduleInput {
                    team_name: Some(team_name.to_string()),
                    games: Some(games),
                    metadata: None,
                });
                schedule.prepare_for_save()?;
                schedule.save(tx)?;
                Ok(schedule)
            }
            None => {
                let mut schedule = Schedule::new(CreateScheduleInput {
                    playthrough_id: playthrough_id.to_string(),
                    year,
                    team_name: team_name.to_string(),
                    games,
                    metadata: None,
                });
                schedule.prepare_for_save()?;
                schedule.insert(tx)?;
                Ok(schedule)
            }
        })
    }

    /// Loads a schedule, mutates it and writes it back in one transaction.
    /// `change` returns whether it modified the schedule; nothing is written
    /// when it fails or reports no change.
    fn modify_schedule(
        &self,
        playthrough_id: &str,
        year: i32,
        change: impl FnOnce(&mut Schedule) -> StoreResult<bool>,
    ) -> StoreResult<Schedule> {
        self.transaction(|tx| {
            let mut schedule = load(tx, playthrough_id, year)?;
            if change(&mut schedule)? {
                schedule.save(tx)?;
            }
            Ok(schedule)
        })
    }
}

fn load(conn: &Connection, playthrough_id: &str, year: i32) -> StoreResult<Schedule> {
    Schedule::find(conn, playthrough_id, year)?
        .ok_or_else(|| StoreError::not_found("Schedule not found"))
}
