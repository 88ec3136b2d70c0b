//! Season schedule aggregate.
//!
//! A schedule is one team's season for one playthrough and year. It owns its
//! games outright: games have no identity outside their schedule and are
//! addressed by week number.
//!
//! # Invariants
//! - `(playthrough_id, year)` is unique across schedules.
//! - A persisted schedule has at least one game.
//! - Week numbers are unique within a schedule.
//! - Games are stored sorted ascending by week.
//!
//! Every write path goes through [`Schedule::prepare_for_save`], which checks
//! the rules above and re-sorts the games. Counts and win/loss results are
//! derived on demand and never stored.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use super::{from_db_time, parse_uuid, to_db_time};
use crate::error::{InvariantError, StoreError, StoreResult, ValidationErrors};
use crate::validate::{Checker, Validate};

pub const MIN_WEEK: i32 = 0;
pub const MAX_WEEK: i32 = 15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Location {
    Home,
    Away,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Away => "Away",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Home" => Some(Self::Home),
            "Away" => Some(Self::Away),
            _ => None,
        }
    }
}

/// Outcome of a game from the schedule owner's point of view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
    Tie,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    pub wins: Option<i32>,
    pub losses: Option<i32>,
}

/// Denormalized copy of the opposing school, frozen at scheduling time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Opponent {
    pub name: String,
    pub logo: Option<String>,
    pub rank: Option<i32>,
    pub record: Option<TeamRecord>,
    #[serde(default)]
    pub is_rivalry: bool,
}

/// Final score; a missing side counts as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    #[serde(default)]
    pub home: i32,
    #[serde(default)]
    pub away: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub week: i32,
    pub location: Location,
    #[serde(default)]
    pub opponent: Option<Opponent>,
    #[serde(default)]
    pub is_bye_week: bool,
    #[serde(default)]
    pub is_conference_game: bool,
    #[serde(default)]
    pub score: Option<Score>,
    #[serde(default)]
    pub went_to_overtime: bool,
}

impl Game {
    /// Result for this game, or `None` for bye weeks and unscored games.
    ///
    /// Equal scores are a tie whether or not the game went to overtime.
    pub fn result(&self) -> Option<GameResult> {
        if self.is_bye_week {
            return None;
        }
        let score = self.score?;
        let (ours, theirs) = match self.location {
            Location::Home => (score.home, score.away),
            Location::Away => (score.away, score.home),
        };
        Some(match ours.cmp(&theirs) {
            std::cmp::Ordering::Greater => GameResult::Win,
            std::cmp::Ordering::Less => GameResult::Loss,
            std::cmp::Ordering::Equal => GameResult::Tie,
        })
    }

    /// Shallow merge: fields left out of `update` keep their current values.
    pub fn apply(&mut self, update: GameUpdate) {
        if let Some(week) = update.week {
            self.week = week;
        }
        if let Some(location) = update.location {
            self.location = location;
        }
        if let Some(opponent) = update.opponent {
            self.opponent = opponent;
        }
        if let Some(is_bye_week) = update.is_bye_week {
            self.is_bye_week = is_bye_week;
        }
        if let Some(is_conference_game) = update.is_conference_game {
            self.is_conference_game = is_conference_game;
        }
        if let Some(score) = update.score {
            self.score = score;
        }
        if let Some(went_to_overtime) = update.went_to_overtime {
            self.went_to_overtime = went_to_overtime;
        }
    }

    fn trim_opponent(&mut self) {
        if let Some(opponent) = &mut self.opponent {
            opponent.name = opponent.name.trim().to_string();
            if let Some(logo) = &mut opponent.logo {
                *logo = logo.trim().to_string();
            }
        }
    }
}

impl Validate for Game {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::new();
        check.range("week", "Week", self.week, MIN_WEEK, MAX_WEEK);
        if let Some(opponent) = &self.opponent {
            check.required("opponent.name", "Opponent name", &opponent.name, 100);
            if let Some(logo) = &opponent.logo {
                check.max_len("opponent.logo", "Logo URL", logo, 500);
            }
            if let Some(rank) = opponent.rank {
                check.range("opponent.rank", "Rank", rank, 1, 25);
            }
            if let Some(record) = opponent.record {
                if let Some(wins) = record.wins {
                    check.range("opponent.record.wins", "Wins", wins, 0, 15);
                }
                if let Some(losses) = record.losses {
                    check.range("opponent.record.losses", "Losses", losses, 0, 15);
                }
            }
        }
        if let Some(score) = self.score {
            if score.home < 0 {
                check.fail("score.home", "Home score cannot be negative", score.home);
            }
            if score.away < 0 {
                check.fail("score.away", "Away score cannot be negative", score.away);
            }
        }
        check.finish()
    }
}

/// Partial game update keyed by the week in the request path.
///
/// `opponent` and `score` distinguish an omitted field (`None`) from an
/// explicit `null` (`Some(None)`), which clears the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameUpdate {
    pub week: Option<i32>,
    pub location: Option<Location>,
    #[serde(default, deserialize_with = "super::double_option", skip_serializing_if = "Option::is_none")]
    pub opponent: Option<Option<Opponent>>,
    pub is_bye_week: Option<bool>,
    pub is_conference_game: Option<bool>,
    #[serde(default, deserialize_with = "super::double_option", skip_serializing_if = "Option::is_none")]
    pub score: Option<Option<Score>>,
    pub went_to_overtime: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub id: Uuid,
    pub playthrough_id: String,
    pub year: i32,
    pub team_name: String,
    pub games: Vec<Game>,
    pub metadata: Option<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleInput {
    pub playthrough_id: String,
    pub year: i32,
    pub team_name: String,
    #[serde(default)]
    pub games: Vec<Game>,
    pub metadata: Option<BTreeMap<String, String>>,
}

/// Whole-document update; the composite key cannot change and is ignored if sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleInput {
    pub team_name: Option<String>,
    pub games: Option<Vec<Game>>,
    /// `Some(None)` clears the stored metadata.
    #[serde(default, deserialize_with = "super::double_option", skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Option<BTreeMap<String, String>>>,
}

/// Game counts derived from the games list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameCounts {
    pub total_games: usize,
    pub home_games: usize,
    pub away_games: usize,
    pub bye_weeks: usize,
    pub conference_games: usize,
    pub non_conference_games: usize,
    pub overtime_games: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub wins: usize,
    pub losses: usize,
    pub ties: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleStats {
    #[serde(flatten)]
    pub counts: GameCounts,
    #[serde(flatten)]
    pub record: SeasonRecord,
    pub team_name: String,
    pub year: i32,
    pub playthrough_id: String,
}

impl Validate for Schedule {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::new();
        check
            .required("playthroughId", "Playthrough ID", &self.playthrough_id, 100)
            .range("year", "Year", self.year, 1900, 2100)
            .required("teamName", "Team name", &self.team_name, 100);
        for (i, game) in self.games.iter().enumerate() {
            check.merge(&format!("games[{i}]"), game.validate());
        }
        check.finish()
    }
}

impl Schedule {
    pub fn new(input: CreateScheduleInput) -> Self {
        let now = super::now();
        Self {
            id: Uuid::new_v4(),
            playthrough_id: input.playthrough_id.trim().to_string(),
            year: input.year,
            team_name: input.team_name.trim().to_string(),
            games: input.games,
            metadata: input.metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks the games-list rules without touching the schedule.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.games.is_empty() {
            return Err(InvariantError::EmptyGames);
        }
        let mut seen = HashSet::with_capacity(self.games.len());
        for game in &self.games {
            if !seen.insert(game.week) {
                return Err(InvariantError::DuplicateWeek(game.week));
            }
        }
        Ok(())
    }

    /// Trims opponent text, validates fields and invariants, then sorts games
    /// by week.
    ///
    /// Must succeed before any insert or update reaches the database.
    pub fn prepare_for_save(&mut self) -> StoreResult<()> {
        self.games.iter_mut().for_each(Game::trim_opponent);
        self.validate()?;
        self.check_invariants()?;
        self.games.sort_by_key(|game| game.week);
        Ok(())
    }

    pub fn game_by_week(&self, week: i32) -> Option<&Game> {
        self.games.iter().find(|game| game.week == week)
    }

    /// Non-bye games played at `location`.
    pub fn games_by_location(&self, location: Location) -> Vec<&Game> {
        self.games
            .iter()
            .filter(|game| game.location == location && !game.is_bye_week)
            .collect()
    }

    pub fn add_game(&mut self, game: Game) -> StoreResult<()> {
        if self.game_by_week(game.week).is_some() {
            return Err(StoreError::conflict("Game for this week already exists"));
        }
        self.games.push(game);
        self.prepare_for_save()
    }

    pub fn update_game(&mut self, week: i32, update: GameUpdate) -> StoreResult<()> {
        let game = self
            .games
            .iter_mut()
            .find(|game| game.week == week)
            .ok_or_else(|| StoreError::not_found(format!("Game for week {week} not found")))?;
        game.apply(update);
        self.prepare_for_save()
    }

    /// Removes the game for `week` if there is one.
    ///
    /// Removing the last remaining game is rejected and leaves the schedule
    /// untouched; delete the schedule itself instead.
    pub fn remove_game(&mut self, week: i32) -> StoreResult<bool> {
        let Some(index) = self.games.iter().position(|game| game.week == week) else {
            return Ok(false);
        };
        if self.games.len() == 1 {
            return Err(InvariantError::EmptyGames.into());
        }
        self.games.remove(index);
        self.prepare_for_save()?;
        Ok(true)
    }

    pub fn apply(&mut self, update: UpdateScheduleInput) {
        if let Some(team_name) = update.team_name {
            self.team_name = team_name.trim().to_string();
        }
        if let Some(games) = update.games {
            self.games = games;
        }
        if let Some(metadata) = update.metadata {
            self.metadata = metadata;
        }
    }

    pub fn result_for_week(&self, week: i32) -> Option<GameResult> {
        self.game_by_week(week).and_then(Game::result)
    }

    pub fn counts(&self) -> GameCounts {
        let mut counts = GameCounts::default();
        for game in &self.games {
            if game.went_to_overtime {
                counts.overtime_games += 1;
            }
            if game.is_bye_week {
                counts.bye_weeks += 1;
                continue;
            }
            counts.total_games += 1;
            match game.location {
                Location::Home => counts.home_games += 1,
                Location::Away => counts.away_games += 1,
            }
            if game.is_conference_game {
                counts.conference_games += 1;
            } else {
                counts.non_conference_games += 1;
            }
        }
        counts
    }

    /// Win/loss/tie totals, re-derived from every scored game on each call.
    pub fn record(&self) -> SeasonRecord {
        let mut record = SeasonRecord::default();
        for result in self.games.iter().filter_map(Game::result) {
            match result {
                GameResult::Win => record.wins += 1,
                GameResult::Loss => record.losses += 1,
                GameResult::Tie => record.ties += 1,
            }
        }
        record
    }

    pub fn stats(&self) -> ScheduleStats {
        ScheduleStats {
            counts: self.counts(),
            record: self.record(),
            team_name: self.team_name.clone(),
            year: self.year,
            playthrough_id: self.playthrough_id.clone(),
        }
    }
}

impl Serialize for Schedule {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct ScheduleJson<'a> {
            id: &'a Uuid,
            playthrough_id: &'a str,
            year: i32,
            team_name: &'a str,
            games: &'a [Game],
            #[serde(skip_serializing_if = "Option::is_none")]
            metadata: Option<&'a BTreeMap<String, String>>,
            #[serde(flatten)]
            counts: GameCounts,
            created_at: &'a DateTime<Utc>,
            updated_at: &'a DateTime<Utc>,
        }

        ScheduleJson {
            id: &self.id,
            playthrough_id: &self.playthrough_id,
            year: self.year,
            team_name: &self.team_name,
            games: &self.games,
            metadata: self.metadata.as_ref(),
            counts: self.counts(),
            created_at: &self.created_at,
            updated_at: &self.updated_at,
        }
        .serialize(serializer)
    }
}

// --- Persistence ---

const SCHEDULE_SELECT_SQL: &str = "SELECT
    id, playthrough_id, year, team_name, games, metadata, created_at, updated_at
FROM schedules";

impl Schedule {
    /// Inserts a new schedule. Callers run [`Schedule::prepare_for_save`] first.
    pub fn insert(&self, conn: &Connection) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO schedules (id, playthrough_id, year, team_name, games, metadata, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                self.id.to_string(),
                self.playthrough_id,
                self.year,
                self.team_name,
                serde_json::to_string(&self.games)?,
                self.metadata.as_ref().map(serde_json::to_string).transpose()?,
                to_db_time(&self.created_at),
                to_db_time(&self.updated_at),
            ],
        )
        .map_err(|e| {
            StoreError::on_unique_violation(e, "Schedule already exists for this playthrough and year")
        })?;
        Ok(())
    }

    /// Writes the current state back and bumps `updated_at`.
    pub fn save(&mut self, conn: &Connection) -> StoreResult<bool> {
        self.updated_at = super::now();
        let changed = conn.execute(
            "UPDATE schedules
             SET team_name = ?1, games = ?2, metadata = ?3, updated_at = ?4
             WHERE id = ?5",
            params![
                self.team_name,
                serde_json::to_string(&self.games)?,
                self.metadata.as_ref().map(serde_json::to_string).transpose()?,
                to_db_time(&self.updated_at),
                self.id.to_string(),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn find(conn: &Connection, playthrough_id: &str, year: i32) -> StoreResult<Option<Schedule>> {
        conn.query_row(
            &format!("{SCHEDULE_SELECT_SQL} WHERE playthrough_id = ?1 AND year = ?2"),
            params![playthrough_id, year],
            raw_schedule,
        )
        .optional()?
        .map(RawSchedule::into_schedule)
        .transpose()
    }

    /// Every schedule, newest first.
    pub fn list(conn: &Connection) -> StoreResult<Vec<Schedule>> {
        query_schedules(conn, &format!("{SCHEDULE_SELECT_SQL} ORDER BY created_at DESC"), params![])
    }

    /// A playthrough's seasons, latest year first.
    pub fn list_by_playthrough(conn: &Connection, playthrough_id: &str) -> StoreResult<Vec<Schedule>> {
        query_schedules(
            conn,
            &format!("{SCHEDULE_SELECT_SQL} WHERE playthrough_id = ?1 ORDER BY year DESC"),
            params![playthrough_id],
        )
    }

    pub fn list_by_year(conn: &Connection, year: i32) -> StoreResult<Vec<Schedule>> {
        query_schedules(
            conn,
            &format!("{SCHEDULE_SELECT_SQL} WHERE year = ?1 ORDER BY created_at ASC"),
            params![year],
        )
    }

    pub fn list_by_team(conn: &Connection, team_name: &str) -> StoreResult<Vec<Schedule>> {
        query_schedules(
            conn,
            &format!("{SCHEDULE_SELECT_SQL} WHERE team_name = ?1 ORDER BY created_at ASC"),
            params![team_name],
        )
    }

    pub fn delete(conn: &Connection, playthrough_id: &str, year: i32) -> StoreResult<bool> {
        let changed = conn.execute(
            "DELETE FROM schedules WHERE playthrough_id = ?1 AND year = ?2",
            params![playthrough_id, year],
        )?;
        Ok(changed > 0)
    }
}

fn query_schedules(
    conn: &Connection,
    sql: &str,
    binds: &[&dyn rusqlite::ToSql],
) -> StoreResult<Vec<Schedule>> {
    let mut stmt = conn.prepare(sql)?;
    let schedules = stmt
        .query_map(binds, raw_schedule)?
        .map(|row| row.map_err(StoreError::from).and_then(RawSchedule::into_schedule))
        .collect();
    schedules
}

struct RawSchedule {
    id: String,
    playthrough_id: String,
    year: i32,
    team_name: String,
    games: String,
    metadata: Option<String>,
    created_at: String,
    updated_at: String,
}

fn raw_schedule(row: &Row<'_>) -> rusqlite::Result<RawSchedule> {
    Ok(RawSchedule {
        id: row.get(0)?,
        playthrough_id: row.get(1)?,
        year: row.get(2)?,
        team_name: row.get(3)?,
        games: row.get(4)?,
        metadata: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

impl RawSchedule {
    fn into_schedule(self) -> StoreResult<Schedule> {
        Ok(Schedule {
            id: parse_uuid(&self.id)?,
            playthrough_id: self.playthrough_id,
            year: self.year,
            team_name: self.team_name,
            games: serde_json::from_str(&self.games)?,
            metadata: self.metadata.as_deref().map(serde_json::from_str).transpose()?,
            created_at: from_db_time(&self.created_at)?,
            updated_at: from_db_time(&self.updated_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(week: i32, location: Location) -> Game {
        Game {
            week,
            location,
            opponent: Some(Opponent {
                name: format!("Opponent {week}"),
                logo: None,
                rank: None,
                record: None,
                is_rivalry: false,
            }),
            is_bye_week: false,
            is_conference_game: false,
            score: None,
            went_to_overtime: false,
        }
    }

    fn bye(week: i32) -> Game {
        Game {
            week,
            location: Location::Home,
            opponent: None,
            is_bye_week: true,
            is_conference_game: false,
            score: None,
            went_to_overtime: false,
        }
    }

    fn scored(week: i32, location: Location, home: i32, away: i32) -> Game {
        Game {
            score: Some(Score { home, away }),
            ..game(week, location)
        }
    }

    fn schedule(games: Vec<Game>) -> Schedule {
        Schedule::new(CreateScheduleInput {
            playthrough_id: "P1".into(),
            year: 2024,
            team_name: "Tigers".into(),
            games,
            metadata: None,
        })
    }

    #[test]
    fn home_tie_and_away_win() {
        assert_eq!(scored(1, Location::Home, 24, 24).result(), Some(GameResult::Tie));
        assert_eq!(scored(1, Location::Away, 10, 20).result(), Some(GameResult::Win));
        assert_eq!(scored(1, Location::Away, 20, 10).result(), Some(GameResult::Loss));
        assert_eq!(scored(1, Location::Home, 0, 0).result(), Some(GameResult::Tie));
    }

    #[test]
    fn overtime_does_not_break_ties() {
        let mut g = scored(3, Location::Home, 31, 31);
        g.went_to_overtime = true;
        assert_eq!(g.result(), Some(GameResult::Tie));
    }

    #[test]
    fn bye_and_unscored_games_have_no_result() {
        let mut b = bye(4);
        b.score = Some(Score { home: 30, away: 0 });
        assert_eq!(b.result(), None);
        assert_eq!(game(5, Location::Home).result(), None);
    }

    #[test]
    fn result_is_stable_across_calls() {
        let s = schedule(vec![scored(2, Location::Home, 14, 7)]);
        assert_eq!(s.result_for_week(2), s.result_for_week(2));
        assert_eq!(s.result_for_week(9), None);
    }

    #[test]
    fn prepare_sorts_games_by_week() {
        let mut s = schedule(vec![game(7, Location::Home), bye(0), game(3, Location::Away)]);
        s.prepare_for_save().unwrap();
        let weeks: Vec<_> = s.games.iter().map(|g| g.week).collect();
        assert_eq!(weeks, vec![0, 3, 7]);
    }

    #[test]
    fn prepare_rejects_empty_and_duplicate_weeks() {
        let mut empty = schedule(vec![]);
        assert!(matches!(
            empty.prepare_for_save(),
            Err(StoreError::Invariant(InvariantError::EmptyGames))
        ));

        let mut dup = schedule(vec![game(2, Location::Home), game(2, Location::Away)]);
        assert!(matches!(
            dup.prepare_for_save(),
            Err(StoreError::Invariant(InvariantError::DuplicateWeek(2)))
        ));
    }

    #[test]
    fn prepare_reports_field_errors_with_game_index() {
        let mut s = schedule(vec![game(16, Location::Home)]);
        s.year = 1850;
        let Err(StoreError::Validation(errors)) = s.prepare_for_save() else {
            panic!("expected validation failure");
        };
        let fields: Vec<_> = errors.0.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["year", "games[0].week"]);
    }

    #[test]
    fn add_game_for_taken_week_conflicts_and_leaves_games_alone() {
        let mut s = schedule(vec![game(1, Location::Home)]);
        let before = s.games.clone();
        assert!(matches!(
            s.add_game(game(1, Location::Away)),
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(s.games, before);
    }

    #[test]
    fn update_game_merges_and_resorts() {
        let mut s = schedule(vec![game(1, Location::Home), game(2, Location::Home)]);
        s.update_game(
            1,
            GameUpdate {
                week: Some(5),
                score: Some(Some(Score { home: 3, away: 0 })),
                ..Default::default()
            },
        )
        .unwrap();

        let weeks: Vec<_> = s.games.iter().map(|g| g.week).collect();
        assert_eq!(weeks, vec![2, 5]);
        let moved = s.game_by_week(5).unwrap();
        assert_eq!(moved.location, Location::Home);
        assert_eq!(moved.opponent.as_ref().unwrap().name, "Opponent 1");
        assert_eq!(moved.result(), Some(GameResult::Win));
    }

    #[test]
    fn update_game_into_taken_week_is_rejected() {
        let mut s = schedule(vec![game(1, Location::Home), game(2, Location::Home)]);
        let result = s.update_game(
            1,
            GameUpdate {
                week: Some(2),
                ..Default::default()
            },
        );
        assert!(matches!(
            result,
            Err(StoreError::Invariant(InvariantError::DuplicateWeek(2)))
        ));
    }

    #[test]
    fn update_missing_week_is_not_found() {
        let mut s = schedule(vec![game(1, Location::Home)]);
        assert!(matches!(
            s.update_game(9, GameUpdate::default()),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn remove_is_idempotent_but_keeps_last_game() {
        let mut s = schedule(vec![game(1, Location::Home), game(2, Location::Away)]);
        assert!(s.remove_game(1).unwrap());
        assert!(!s.remove_game(1).unwrap());
        assert!(matches!(
            s.remove_game(2),
            Err(StoreError::Invariant(InvariantError::EmptyGames))
        ));
        assert_eq!(s.games.len(), 1);
    }

    #[test]
    fn counts_and_record() {
        let mut conference_win = scored(1, Location::Home, 28, 14);
        conference_win.is_conference_game = true;
        let mut overtime_loss = scored(2, Location::Away, 31, 28);
        overtime_loss.went_to_overtime = true;
        let s = schedule(vec![
            bye(0),
            conference_win,
            overtime_loss,
            scored(3, Location::Home, 10, 10),
            game(4, Location::Away),
        ]);

        let counts = s.counts();
        assert_eq!(counts.total_games, 4);
        assert_eq!(counts.home_games, 2);
        assert_eq!(counts.away_games, 2);
        assert_eq!(counts.bye_weeks, 1);
        assert_eq!(counts.conference_games, 1);
        assert_eq!(counts.non_conference_games, 3);
        assert_eq!(counts.overtime_games, 1);
        assert_eq!(s.record(), SeasonRecord { wins: 1, losses: 1, ties: 1 });
        assert_eq!(s.games_by_location(Location::Away).len(), 2);
    }

    #[test]
    fn serialized_schedule_carries_derived_counts() {
        let s = schedule(vec![bye(0), game(1, Location::Away)]);
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["totalGames"], 1);
        assert_eq!(json["awayGames"], 1);
        assert_eq!(json["byeWeeks"], 1);
        assert_eq!(json["games"][0]["isByeWeek"], true);
        assert!(json.get("metadata").is_none());

        let back: Schedule = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn stats_flatten_counts_and_record() {
        let s = schedule(vec![scored(1, Location::Home, 21, 3)]);
        let json = serde_json::to_value(s.stats()).unwrap();
        assert_eq!(json["totalGames"], 1);
        assert_eq!(json["wins"], 1);
        assert_eq!(json["teamName"], "Tigers");
        assert_eq!(json["playthroughId"], "P1");
    }

    #[test]
    fn game_update_tells_null_from_omitted() {
        let cleared: GameUpdate = serde_json::from_str(r#"{"score": null}"#).unwrap();
        assert!(matches!(cleared.score, Some(None)));
        assert!(cleared.opponent.is_none());

        let omitted: GameUpdate = serde_json::from_str(r#"{"wentToOvertime": true}"#).unwrap();
        assert!(omitted.score.is_none());

        let json = serde_json::to_value(&omitted).unwrap();
        assert!(json.get("score").is_none());
        assert!(json.get("opponent").is_none());
    }

    #[test]
    fn explicit_null_unscores_a_game() {
        let mut s = schedule(vec![scored(1, Location::Home, 21, 7), game(2, Location::Away)]);
        let update: GameUpdate = serde_json::from_str(r#"{"score": null}"#).unwrap();
        s.update_game(1, update).unwrap();

        let g = s.game_by_week(1).unwrap();
        assert_eq!(g.score, None);
        assert_eq!(g.result(), None);
        assert_eq!(s.record(), SeasonRecord::default());
    }

    #[test]
    fn opponent_text_is_trimmed_before_save() {
        let mut padded = game(3, Location::Home);
        if let Some(opponent) = &mut padded.opponent {
            opponent.name = "  Rivals U ".into();
            opponent.logo = Some(" https://cdn.example.test/rivals.png ".into());
        }
        let mut s = schedule(vec![padded]);
        s.prepare_for_save().unwrap();

        let opponent = s.game_by_week(3).unwrap().opponent.as_ref().unwrap();
        assert_eq!(opponent.name, "Rivals U");
        assert_eq!(opponent.logo.as_deref(), Some("https://cdn.example.test/rivals.png"));
    }
}
