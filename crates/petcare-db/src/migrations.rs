use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            login_id        TEXT PRIMARY KEY,
            password        TEXT NOT NULL,
            nickname        TEXT NOT NULL UNIQUE,
            pet_type        TEXT NOT NULL DEFAULT '',
            pet_name        TEXT NOT NULL DEFAULT '',
            pet_age         TEXT NOT NULL DEFAULT '',
            bio             TEXT NOT NULL DEFAULT '',
            profile_image   TEXT NOT NULL DEFAULT 'default.jpg',
            created_at      TEXT NOT NULL
        );

        -- AUTOINCREMENT: a deleted post's id is never handed out again
        CREATE TABLE IF NOT EXISTS posts (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            title               TEXT NOT NULL,
            content             TEXT NOT NULL,
            category            TEXT NOT NULL,
            author              TEXT NOT NULL,
            next_comment_id     INTEGER NOT NULL DEFAULT 1,
            created_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_posts_author
            ON posts(author);

        CREATE TABLE IF NOT EXISTS comments (
            post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            id          INTEGER NOT NULL,
            content     TEXT NOT NULL,
            author      TEXT NOT NULL,
            created_at  TEXT NOT NULL,
            PRIMARY KEY (post_id, id)
        );

        CREATE INDEX IF NOT EXISTS idx_comments_author
            ON comments(author);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
