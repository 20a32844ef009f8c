//! SQLite schema shared by storage modules.

/// Schema script executed once at startup by [`super::Connection::initialize`].
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS paste(
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    author      TEXT NOT NULL,
    filename    TEXT NOT NULL,
    language    TEXT NOT NULL,
    code        TEXT NOT NULL,
    created_at  INTEGER NOT NULL,
    expires_at  INTEGER NOT NULL,
    visible     INTEGER NOT NULL DEFAULT 0,
    CHECK (expires_at > created_at)
);

CREATE INDEX IF NOT EXISTS paste_expires_at ON paste(expires_at);
CREATE INDEX IF NOT EXISTS paste_created_at ON paste(created_at);

CREATE TABLE IF NOT EXISTS image(
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    author      TEXT NOT NULL,
    filename    TEXT NOT NULL,
    data        BLOB NOT NULL,
    created_at  INTEGER NOT NULL,
    expires_at  INTEGER NOT NULL,
    visible     INTEGER NOT NULL DEFAULT 0,
    CHECK (expires_at > created_at)
);

CREATE INDEX IF NOT EXISTS image_expires_at ON image(expires_at);
CREATE INDEX IF NOT EXISTS image_created_at ON image(created_at);
"#;
