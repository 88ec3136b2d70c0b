pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS schools (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    icon TEXT NOT NULL,
    conference TEXT NOT NULL CHECK (conference IN (
        'SEC', 'Big Ten', 'Big 12', 'ACC', 'Pac-12', 'AAC', 'C-USA', 'MAC',
        'Mountain West', 'Sun Belt', 'Independent', 'Other'
    )),
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    colors JSON NOT NULL DEFAULT '[]',
    mascot TEXT,
    rivals JSON NOT NULL DEFAULT '[]',
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

-- School references are checked at commit so the catalog can be re-seeded
-- inside one transaction while coaches point at it.
CREATE TABLE IF NOT EXISTS coaches (
    id TEXT PRIMARY KEY,
    playthrough_id TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    style TEXT NOT NULL CHECK (style IN ('Motivator', 'Recruiter', 'Tactician')),
    selected_team TEXT NOT NULL REFERENCES schools(id) DEFERRABLE INITIALLY DEFERRED,
    alma_mater TEXT NOT NULL REFERENCES schools(id) DEFERRABLE INITIALLY DEFERRED,
    pipeline TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schedules (
    id TEXT PRIMARY KEY,
    playthrough_id TEXT NOT NULL,
    year INTEGER NOT NULL CHECK (year BETWEEN 1900 AND 2100),
    team_name TEXT NOT NULL,
    games JSON NOT NULL,
    metadata JSON,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_schools_conference ON schools(conference);
CREATE INDEX IF NOT EXISTS idx_schools_state ON schools(state);
CREATE INDEX IF NOT EXISTS idx_schools_active ON schools(is_active);
CREATE INDEX IF NOT EXISTS idx_coaches_selected_team ON coaches(selected_team);
CREATE INDEX IF NOT EXISTS idx_coaches_alma_mater ON coaches(alma_mater);
CREATE INDEX IF NOT EXISTS idx_coaches_updated ON coaches(updated_at);
CREATE INDEX IF NOT EXISTS idx_schedules_year ON schedules(year);
CREATE INDEX IF NOT EXISTS idx_schedules_team ON schedules(team_name);

-- One schedule per playthrough season
CREATE UNIQUE INDEX IF NOT EXISTS idx_schedules_playthrough_year
    ON schedules(playthrough_id, year);
"#;
