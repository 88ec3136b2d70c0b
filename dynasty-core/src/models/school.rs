use chrono::{DateTime, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use super::{from_db_time, parse_uuid, to_db_time};
use crate::error::{StoreError, StoreResult, ValidationErrors};
use crate::validate::{Checker, Validate};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct School {
    pub id: Uuid,
    pub name: String,
    pub icon: String,
    pub conference: Conference,
    pub city: String,
    pub state: String,
    pub colors: Vec<String>,
    pub mascot: Option<String>,
    pub rivals: Vec<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Conference {
    #[serde(rename = "SEC")]
    Sec,
    #[serde(rename = "Big Ten")]
    BigTen,
    #[serde(rename = "Big 12")]
    Big12,
    #[serde(rename = "ACC")]
    Acc,
    #[serde(rename = "Pac-12")]
    Pac12,
    #[serde(rename = "AAC")]
    Aac,
    #[serde(rename = "C-USA")]
    ConferenceUsa,
    #[serde(rename = "MAC")]
    Mac,
    #[serde(rename = "Mountain West")]
    MountainWest,
    #[serde(rename = "Sun Belt")]
    SunBelt,
    Independent,
    Other,
}

impl Conference {
    pub const ALL: [Conference; 12] = [
        Self::Sec,
        Self::BigTen,
        Self::Big12,
        Self::Acc,
        Self::Pac12,
        Self::Aac,
        Self::ConferenceUsa,
        Self::Mac,
        Self::MountainWest,
        Self::SunBelt,
        Self::Independent,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sec => "SEC",
            Self::BigTen => "Big Ten",
            Self::Big12 => "Big 12",
            Self::Acc => "ACC",
            Self::Pac12 => "Pac-12",
            Self::Aac => "AAC",
            Self::ConferenceUsa => "C-USA",
            Self::Mac => "MAC",
            Self::MountainWest => "Mountain West",
            Self::SunBelt => "Sun Belt",
            Self::Independent => "Independent",
            Self::Other => "Other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == s)
    }
}

/// Input for creating a school, either from the API or the seed catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSchoolInput {
    pub name: String,
    pub icon: String,
    pub conference: Conference,
    pub city: String,
    pub state: String,
    #[serde(default)]
    pub colors: Vec<String>,
    pub mascot: Option<String>,
    #[serde(default)]
    pub rivals: Vec<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CreateSchoolInput {
    /// Trims every free-text field, rival names included.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.icon = self.icon.trim().to_string();
        self.city = self.city.trim().to_string();
        self.state = self.state.trim().to_string();
        self.mascot = self.mascot.map(|m| m.trim().to_string());
        self.rivals = self.rivals.iter().map(|r| r.trim().to_string()).collect();
        self
    }
}

impl Validate for CreateSchoolInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut check = Checker::new();
        check
            .required("name", "School name", &self.name, 100)
            .required("icon", "School icon/logo URL", &self.icon, 500)
            .required("city", "City", &self.city, 100)
            .required("state", "State", &self.state, 50);
        if let Some(mascot) = &self.mascot {
            check.max_len("mascot", "Mascot name", mascot, 100);
        }
        for (i, color) in self.colors.iter().enumerate() {
            check.hex_color(&format!("colors[{i}]"), color);
        }
        check.finish()
    }
}

/// Optional filters for listing the catalog.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchoolFilter {
    pub conference: Option<String>,
    pub state: Option<String>,
    pub is_active: Option<bool>,
}

const SCHOOL_SELECT_SQL: &str = "SELECT
    id, name, icon, conference, city, state, colors, mascot, rivals, is_active, created_at, updated_at
FROM schools";

impl School {
    pub fn new(input: CreateSchoolInput) -> Self {
        let input = input.normalized();
        let now = super::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            icon: input.icon,
            conference: input.conference,
            city: input.city,
            state: input.state,
            colors: input.colors,
            mascot: input.mascot,
            rivals: input.rivals,
            is_active: input.is_active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_location(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }

    pub fn insert(&self, conn: &Connection) -> StoreResult<()> {
        conn.execute(
            "INSERT INTO schools (id, name, icon, conference, city, state, colors, mascot, rivals, is_active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                self.id.to_string(),
                self.name,
                self.icon,
                self.conference.as_str(),
                self.city,
                self.state,
                serde_json::to_string(&self.colors)?,
                self.mascot,
                serde_json::to_string(&self.rivals)?,
                self.is_active,
                to_db_time(&self.created_at),
                to_db_time(&self.updated_at),
            ],
        )
        .map_err(|e| {
            StoreError::on_unique_violation(e, &format!("School '{}' already exists", self.name))
        })?;
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &Uuid) -> StoreResult<Option<School>> {
        conn.query_row(
            &format!("{SCHOOL_SELECT_SQL} WHERE id = ?1"),
            params![id.to_string()],
            raw_school,
        )
        .optional()?
        .map(RawSchool::into_school)
        .transpose()
    }

    pub fn find_by_name(conn: &Connection, name: &str) -> StoreResult<Option<School>> {
        conn.query_row(
            &format!("{SCHOOL_SELECT_SQL} WHERE name = ?1"),
            params![name],
            raw_school,
        )
        .optional()?
        .map(RawSchool::into_school)
        .transpose()
    }

    /// All schools matching `filter`, ordered by conference then name.
    pub fn list(conn: &Connection, filter: &SchoolFilter) -> StoreResult<Vec<School>> {
        let mut sql = format!("{SCHOOL_SELECT_SQL} WHERE 1 = 1");
        let mut binds: Vec<SqlValue> = Vec::new();

        if let Some(conference) = &filter.conference {
            binds.push(SqlValue::Text(conference.clone()));
            sql.push_str(&format!(" AND conference = ?{}", binds.len()));
        }
        if let Some(state) = &filter.state {
            binds.push(SqlValue::Text(state.clone()));
            sql.push_str(&format!(" AND state = ?{}", binds.len()));
        }
        if let Some(active) = filter.is_active {
            binds.push(SqlValue::Integer(i64::from(active)));
            sql.push_str(&format!(" AND is_active = ?{}", binds.len()));
        }
        sql.push_str(" ORDER BY conference ASC, name ASC");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(binds), raw_school)?;
        collect_schools(rows)
    }

    pub fn list_active_by_conference(conn: &Connection, conference: &str) -> StoreResult<Vec<School>> {
        let mut stmt = conn.prepare(&format!(
            "{SCHOOL_SELECT_SQL} WHERE conference = ?1 AND is_active = 1 ORDER BY name ASC"
        ))?;
        let rows = stmt.query_map(params![conference], raw_school)?;
        collect_schools(rows)
    }

    pub fn list_active_by_state(conn: &Connection, state: &str) -> StoreResult<Vec<School>> {
        let mut stmt = conn.prepare(&format!(
            "{SCHOOL_SELECT_SQL} WHERE state = ?1 AND is_active = 1 ORDER BY name ASC"
        ))?;
        let rows = stmt.query_map(params![state], raw_school)?;
        collect_schools(rows)
    }

    /// Distinct conferences that have at least one active school, sorted by name.
    pub fn active_conferences(conn: &Connection) -> StoreResult<Vec<String>> {
        let mut stmt = conn.prepare(
            "SELECT DISTINCT conference FROM schools WHERE is_active = 1 ORDER BY conference ASC",
        )?;
        let conferences = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(conferences)
    }

    /// Active schools whose names appear in `names`, ordered by name.
    pub fn list_active_named(conn: &Connection, names: &[String]) -> StoreResult<Vec<School>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = (1..=names.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let mut stmt = conn.prepare(&format!(
            "{SCHOOL_SELECT_SQL} WHERE name IN ({placeholders}) AND is_active = 1 ORDER BY name ASC"
        ))?;
        let rows = stmt.query_map(params_from_iter(names.iter()), raw_school)?;
        collect_schools(rows)
    }

    pub fn delete_all(conn: &Connection) -> StoreResult<usize> {
        Ok(conn.execute("DELETE FROM schools", [])?)
    }

    pub fn count(conn: &Connection) -> StoreResult<usize> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM schools", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

impl Serialize for School {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct SchoolJson<'a> {
            id: &'a Uuid,
            name: &'a str,
            icon: &'a str,
            conference: Conference,
            city: &'a str,
            state: &'a str,
            full_location: String,
            colors: &'a [String],
            mascot: Option<&'a str>,
            rivals: &'a [String],
            is_active: bool,
            created_at: &'a DateTime<Utc>,
            updated_at: &'a DateTime<Utc>,
        }

        SchoolJson {
            id: &self.id,
            name: &self.name,
            icon: &self.icon,
            conference: self.conference,
            city: &self.city,
            state: &self.state,
            full_location: self.full_location(),
            colors: &self.colors,
            mascot: self.mascot.as_deref(),
            rivals: &self.rivals,
            is_active: self.is_active,
            created_at: &self.created_at,
            updated_at: &self.updated_at,
        }
        .serialize(serializer)
    }
}

/// Column values as stored; JSON columns and enums are decoded afterwards so
/// decoding failures surface as store errors rather than SQLite errors.
struct RawSchool {
    id: String,
    name: String,
    icon: String,
    conference: String,
    city: String,
    state: String,
    colors: String,
    mascot: Option<String>,
    rivals: String,
    is_active: bool,
    created_at: String,
    updated_at: String,
}

fn raw_school(row: &Row<'_>) -> rusqlite::Result<RawSchool> {
    Ok(RawSchool {
        id: row.get(0)?,
        name: row.get(1)?,
        icon: row.get(2)?,
        conference: row.get(3)?,
        city: row.get(4)?,
        state: row.get(5)?,
        colors: row.get(6)?,
        mascot: row.get(7)?,
        rivals: row.get(8)?,
        is_active: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

impl RawSchool {
    fn into_school(self) -> StoreResult<School> {
        let conference = Conference::from_str(&self.conference).ok_or_else(|| {
            StoreError::InvalidData(format!("unknown conference '{}'", self.conference))
        })?;
        Ok(School {
            id: parse_uuid(&self.id)?,
            name: self.name,
            icon: self.icon,
            conference,
            city: self.city,
            state: self.state,
            colors: serde_json::from_str(&self.colors)?,
            mascot: self.mascot,
            rivals: serde_json::from_str(&self.rivals)?,
            is_active: self.is_active,
            created_at: from_db_time(&self.created_at)?,
            updated_at: from_db_time(&self.updated_at)?,
        })
    }
}

fn collect_schools(
    rows: impl Iterator<Item = rusqlite::Result<RawSchool>>,
) -> StoreResult<Vec<School>> {
    rows.map(|row| row.map_err(StoreError::from).and_then(RawSchool::into_school))
        .collect()
}
