//! Bundled FBS school catalog used to seed a fresh database.

use crate::error::StoreResult;
use crate::models::CreateSchoolInput;

const SCHOOLS_JSON: &str = include_str!("../data/schools.json");

pub fn bundled_schools() -> StoreResult<Vec<CreateSchoolInput>> {
    Ok(serde_json::from_str(SCHOOLS_JSON)?)
}
