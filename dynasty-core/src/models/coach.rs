use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use super::{from_db_time, parse_uuid, to_db_time, School};
use crate::error::{StoreError, StoreResult, ValidationErrors};
use crate::validate::{Checker, Validate};

/// A coach playthrough: one save-game session and its team selections.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    pub id: Uuid,
    pub playthrough_id: String,
    pub first_name: String,
    pub last_name: String,
    pub style: CoachStyle,
    pub selected_team: SchoolRef,
    pub alma_mater: SchoolRef,
    pub pipeline: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CoachStyle {
    Motivator,
    Recruiter,
    Tactician,
}

impl CoachStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Motivator => "Motivator",
            Self::Recruiter => "Recruiter",
            Self::Tactician => "Tactician",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Motivator" => Some(Self::Motivator),
            "Recruiter" => Some(Self::Recruiter),
            "Tactician" => Some(Self::Tactician),
            _ => None,
        }
    }
}

/// A school reference that is either a bare id (as stored) or the full record
/// (as returned to callers).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchoolRef {
    Resolved(Box<School>),
    Reference(Uuid),
}

impl SchoolRef {
    pub fn id(&self) -> Uuid {
        match self {
            Self::Resolved(school) => school.id,
            Self::Reference(id) => *id,
        }
    }

    pub fn school(&self) -> Option<&School> {
        match self {
            Self::Resolved(school) => Some(school),
            Self::Reference(_) => None,
        }
    }

    fn resolve(self, conn: &Connection) -> StoreResult<Self> {
        match self {
            Self::Reference(id) => Ok(School::find_by_id(conn, &id)?
                .map(|school| Self::Resolved(Box::new(school)))
                .unwrap_or(Self::Reference(id))),
            resolved => Ok(resolved),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoachInput {
    pub playthrough_id: String,
    pub first_name: String,
    pub last_name: String,
    pub style: CoachStyle,
    pub selected_team: Uuid,
    pub alma_mater: Uuid,
    pub pipeline: String,
}

/// Partial coach update; `playthroughId` is not accepted here and is ignored if sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCoachInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub style: Option<CoachStyle>,
    pub selected_team: Option<Uuid>,
    pub alma_mater: Option<Uuid>,
    pub pipeline: Option<String>,
}

impl Validate for Coach {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::new();
        check
            .required("playthroughId", "Playthrough ID", &self.playthrough_id, 100)
            .required("firstName", "First name", &self.first_name, 50)
            .required("lastName", "Last name", &self.last_name, 50)
            .required("pipeline", "Pipeline description", &self.pipeline, 500);
        check.finish()
    }
}

const COACH_SELECT_SQL: &str = "SELECT
    id, playthrough_id, first_name, last_name, style, selected_team, alma_mater, pipeline, created_at, updated_at
FROM coaches";

impl Coach {
    pub fn new(input: CreateCoachInput) -> Self {
        let now = super::now();
        Self {
            id: Uuid::new_v4(),
            playthrough_id: input.playthrough_id.trim().to_string(),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            style: input.style,
            selected_team: SchoolRef::Reference(input.selected_team),
            alma_mater: SchoolRef::Reference(input.alma_mater),
            pipeline: input.pipeline.trim().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Merges the provided fields and bumps `updated_at`.
    pub fn apply(&mut self, input: UpdateCoachInput) {
        if let Some(first_name) = input.first_name {
            self.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = input.last_name {
            self.last_name = last_name.trim().to_string();
        }
        if let Some(style) = input.style {
            self.style = style;
        }
        if let Some(id) = input.selected_team {
            self.selected_team = SchoolRef::Reference(id);
        }
        if let Some(id) = input.alma_mater {
            self.alma_mater = SchoolRef::Reference(id);
        }
        if let Some(pipeline) = input.pipeline {
            self.pipeline = pipeline.trim().to_string();
        }
        self.updated_at = super::now();
    }

    /// Replaces both school references with full school records.
    pub fn populate(mut self, conn: &Connection) -> StoreResult<Self> {
        self.selected_team = self.selected_team.resolve(conn)?;
        self.alma_mater = self.alma_mater.resolve(conn)?;
        Ok(self)
    }

    pub fn insert(&self, conn: &Connection) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO coaches (id, playthrough_id, first_name, last_name, style, selected_team, alma_mater, pipeline, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                self.id.to_string(),
                self.playthrough_id,
                self.first_name,
                self.last_name,
                self.style.as_str(),
                self.selected_team.id().to_string(),
                self.alma_mater.id().to_string(),
                self.pipeline,
                to_db_time(&self.created_at),
                to_db_time(&self.updated_at),
            ],
        )
        .map_err(|e| StoreError::on_unique_violation(e, "Playthrough already exists for this ID"))?;
        Ok(())
    }

    pub fn update(&self, conn: &Connection) -> StoreResult<bool> {
        let changed = conn.execute(
            "UPDATE coaches
             SET first_name = ?1, last_name = ?2, style = ?3, selected_team = ?4,
                 alma_mater = ?5, pipeline = ?6, updated_at = ?7
             WHERE id = ?8",
            params![
                self.first_name,
                self.last_name,
                self.style.as_str(),
                self.selected_team.id().to_string(),
                self.alma_mater.id().to_string(),
                self.pipeline,
                to_db_time(&self.updated_at),
                self.id.to_string(),
            ],
        )?;
        Ok(changed > 0)
    }

    pub fn find_by_playthrough_id(conn: &Connection, playthrough_id: &str) -> StoreResult<Option<Coach>> {
        conn.query_row(
            &format!("{COACH_SELECT_SQL} WHERE playthrough_id = ?1"),
            params![playthrough_id],
            raw_coach,
        )
        .optional()?
        .map(RawCoach::into_coach)
        .transpose()
    }

    /// Every coach, newest first.
    pub fn list(conn: &Connection) -> StoreResult<Vec<Coach>> {
        let mut stmt = conn.prepare(&format!("{COACH_SELECT_SQL} ORDER BY created_at DESC, id ASC"))?;
        let coaches = stmt
            .query_map([], raw_coach)?
            .map(|row| row.map_err(StoreError::from).and_then(RawCoach::into_coach))
            .collect();
        coaches
    }

    pub fn most_recently_updated(conn: &Connection) -> StoreResult<Option<Coach>> {
        conn.query_row(
            &format!("{COACH_SELECT_SQL} ORDER BY updated_at DESC, id ASC LIMIT 1"),
            [],
            raw_coach,
        )
        .optional()?
        .map(RawCoach::into_coach)
        .transpose()
    }
}

impl Serialize for Coach {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct CoachJson<'a> {
            id: &'a Uuid,
            playthrough_id: &'a str,
            first_name: &'a str,
            last_name: &'a str,
            full_name: String,
            style: CoachStyle,
            selected_team: &'a SchoolRef,
            alma_mater: &'a SchoolRef,
            pipeline: &'a str,
            created_at: &'a DateTime<Utc>,
            updated_at: &'a DateTime<Utc>,
        }

        CoachJson {
            id: &self.id,
            playthrough_id: &self.playthrough_id,
            first_name: &self.first_name,
            last_name: &self.last_name,
            full_name: self.full_name(),
            style: self.style,
            selected_team: &self.selected_team,
            alma_mater: &self.alma_mater,
            pipeline: &self.pipeline,
            created_at: &self.created_at,
            updated_at: &self.updated_at,
        }
        .serialize(serializer)
    }
}

struct RawCoach {
    id: String,
    playthrough_id: String,
    first_name: String,
    last_name: String,
    style: String,
    selected_team: String,
    alma_mater: String,
    pipeline: String,
    created_at: String,
    updated_at: String,
}

fn raw_coach(row: &Row<'_>) -> rusqlite::Result<RawCoach> {
    Ok(RawCoach {
        id: row.get(0)?,
        playthrough_id: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        style: row.get(4)?,
        selected_team: row.get(5)?,
        alma_mater: row.get(6)?,
        pipeline: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

impl RawCoach {
    fn into_coach(self) -> StoreResult<Coach> {
        let style = CoachStyle::from_str(&self.style)
            .ok_or_else(|| StoreError::InvalidData(format!("unknown coach style '{}'", self.style)))?;
        Ok(Coach {
            id: parse_uuid(&self.id)?,
            playthrough_id: self.playthrough_id,
            first_name: self.first_name,
            last_name: self.last_name,
            style,
            selected_team: SchoolRef::Reference(parse_uuid(&self.selected_team)?),
            alma_mater: SchoolRef::Reference(parse_uuid(&self.alma_mater)?),
            pipeline: self.pipeline,
            created_at: from_db_time(&self.created_at)?,
            updated_at: from_db_time(&self.updated_at)?,
        })
    }
}
