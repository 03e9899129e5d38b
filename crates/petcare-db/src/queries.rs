use crate::Database;
use crate::models::{DeleteOutcome, ProfileUpdate, UserInsert, UserRow};
use anyhow::Result;
use chrono::{DateTime, Utc};
use petcare_types::models::{Comment, Post, PostSummary};
use rusqlite::{Connection, params};

impl Database {
    // -- Users --

    /// Inserts a new account unless the login id or nickname is already
    /// taken. The checks and the insert share one lock.
    pub fn create_user(
        &self,
        login_id: &str,
        password_hash: &str,
        nickname: &str,
        now: DateTime<Utc>,
    ) -> Result<UserInsert> {
        self.with_conn_mut(|conn| {
            if query_login_id_exists(conn, login_id)? {
                return Ok(UserInsert::LoginIdTaken);
            }
            if query_nickname_exists(conn, nickname)? {
                return Ok(UserInsert::NicknameTaken);
            }
            conn.execute(
                "INSERT INTO users (login_id, password, nickname, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![login_id, password_hash, nickname, now],
            )?;
            Ok(UserInsert::Created)
        })
    }

    pub fn login_id_exists(&self, login_id: &str) -> Result<bool> {
        self.with_conn(|conn| query_login_id_exists(conn, login_id))
    }

    pub fn nickname_exists(&self, nickname: &str) -> Result<bool> {
        self.with_conn(|conn| query_nickname_exists(conn, nickname))
    }

    pub fn get_user(&self, login_id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, login_id))
    }

    pub fn find_login_ids_by_nickname(&self, nickname: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT login_id FROM users WHERE nickname = ?1 ORDER BY login_id")?;
            let ids = stmt
                .query_map([nickname], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(ids)
        })
    }

    /// Returns false when the account does not exist.
    pub fn update_password(&self, login_id: &str, password_hash: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET password = ?1 WHERE login_id = ?2",
                params![password_hash, login_id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn update_profile(&self, login_id: &str, update: &ProfileUpdate) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET pet_type = ?1, pet_name = ?2, pet_age = ?3, bio = ?4 WHERE login_id = ?5",
                params![update.pet_type, update.pet_name, update.pet_age, update.bio, login_id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn set_profile_image(&self, login_id: &str, image: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let changed = conn.execute(
                "UPDATE users SET profile_image = ?1 WHERE login_id = ?2",
                params![image, login_id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn count_posts_by_author(&self, author: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row("SELECT COUNT(*) FROM posts WHERE author = ?1", [author], |row| {
                row.get(0)
            })?;
            Ok(n)
        })
    }

    pub fn count_comments_by_author(&self, author: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row(
                "SELECT COUNT(*) FROM comments WHERE author = ?1",
                [author],
                |row| row.get(0),
            )?;
            Ok(n)
        })
    }

    // -- Posts --

    /// Returns the new post's id.
    pub fn insert_post(
        &self,
        title: &str,
        content: &str,
        category: &str,
        author: &str,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO posts (title, content, category, author, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![title, content, category, author, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn count_posts(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let n = conn.query_row("SELECT COUNT(*) FROM posts", [], |row| row.get(0))?;
            Ok(n)
        })
    }

    /// Newest id first.
    pub fn list_posts(&self, limit: i64, offset: i64) -> Result<Vec<PostSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.title, p.category, p.author, p.created_at,
                        (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id)
                 FROM posts p
                 ORDER BY p.id DESC
                 LIMIT ?1 OFFSET ?2",
            )?;

            let rows = stmt
                .query_map(params![limit, offset], |row| {
                    Ok(PostSummary {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        category: row.get(2)?,
                        author: row.get(3)?,
                        created_at: row.get(4)?,
                        comment_count: row.get(5)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Loads a post together with its comments in id order.
    pub fn get_post(&self, id: i64) -> Result<Option<Post>> {
        self.with_conn(|conn| {
            let post = conn
                .query_row(
                    "SELECT id, title, content, category, author, created_at FROM posts WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(Post {
                            id: row.get(0)?,
                            title: row.get(1)?,
                            content: row.get(2)?,
                            category: row.get(3)?,
                            author: row.get(4)?,
                            created_at: row.get(5)?,
                            comments: Vec::new(),
                        })
                    },
                )
                .optional()?;

            let Some(mut post) = post else {
                return Ok(None);
            };
            post.comments = query_comments(conn, id)?;
            Ok(Some(post))
        })
    }

    pub fn post_exists(&self, id: i64) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT id FROM posts WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Deletes the post (and its comments) only when `author` wrote it.
    pub fn delete_post(&self, id: i64, author: &str) -> Result<DeleteOutcome> {
        self.with_conn_mut(|conn| {
            let recorded: Option<String> = conn
                .query_row("SELECT author FROM posts WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;

            match recorded {
                None => Ok(DeleteOutcome::NotFound),
                Some(recorded) if recorded != author => Ok(DeleteOutcome::NotAuthor),
                Some(_) => {
                    conn.execute("DELETE FROM posts WHERE id = ?1", [id])?;
                    Ok(DeleteOutcome::Deleted)
                }
            }
        })
    }

    // -- Comments --

    /// Appends a comment and returns its per-post id, or `None` when the
    /// post does not exist. Ids come from the post's counter, so they keep
    /// increasing even after deletions.
    pub fn insert_comment(
        &self,
        post_id: i64,
        content: &str,
        author: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let next: Option<i64> = tx
                .query_row(
                    "SELECT next_comment_id FROM posts WHERE id = ?1",
                    [post_id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(comment_id) = next else {
                return Ok(None);
            };

            tx.execute(
                "INSERT INTO comments (post_id, id, content, author, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![post_id, comment_id, content, author, now],
            )?;
            tx.execute(
                "UPDATE posts SET next_comment_id = ?1 WHERE id = ?2",
                params![comment_id + 1, post_id],
            )?;
            tx.commit()?;

            Ok(Some(comment_id))
        })
    }

    /// `None` when the parent post does not exist.
    pub fn delete_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        author: &str,
    ) -> Result<Option<DeleteOutcome>> {
        self.with_conn_mut(|conn| {
            let post: Option<i64> = conn
                .query_row("SELECT id FROM posts WHERE id = ?1", [post_id], |row| row.get(0))
                .optional()?;
            if post.is_none() {
                return Ok(None);
            }

            let recorded: Option<String> = conn
                .query_row(
                    "SELECT author FROM comments WHERE post_id = ?1 AND id = ?2",
                    [post_id, comment_id],
                    |row| row.get(0),
                )
                .optional()?;

            let outcome = match recorded {
                None => DeleteOutcome::NotFound,
                Some(recorded) if recorded != author => DeleteOutcome::NotAuthor,
                Some(_) => {
                    conn.execute(
                        "DELETE FROM comments WHERE post_id = ?1 AND id = ?2",
                        [post_id, comment_id],
                    )?;
                    DeleteOutcome::Deleted
                }
            };
            Ok(Some(outcome))
        })
    }
}

fn query_login_id_exists(conn: &Connection, login_id: &str) -> Result<bool> {
    let found: Option<String> = conn
        .query_row("SELECT login_id FROM users WHERE login_id = ?1", [login_id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn query_nickname_exists(conn: &Connection, nickname: &str) -> Result<bool> {
    let found: Option<String> = conn
        .query_row("SELECT login_id FROM users WHERE nickname = ?1", [nickname], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn query_user(conn: &Connection, login_id: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT login_id, password, nickname, pet_type, pet_name, pet_age, bio, profile_image, created_at
         FROM users WHERE login_id = ?1",
    )?;

    let row = stmt
        .query_row([login_id], |row| {
            Ok(UserRow {
                login_id: row.get(0)?,
                password: row.get(1)?,
                nickname: row.get(2)?,
                pet_type: row.get(3)?,
                pet_name: row.get(4)?,
                pet_age: row.get(5)?,
                bio: row.get(6)?,
                profile_image: row.get(7)?,
                created_at: row.get(8)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_comments(conn: &Connection, post_id: i64) -> Result<Vec<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT id, post_id, content, author, created_at
         FROM comments
         WHERE post_id = ?1
         ORDER BY id ASC",
    )?;

    let rows = stmt
        .query_map([post_id], |row| {
            Ok(Comment {
                id: row.get(0)?,
                post_id: row.get(1)?,
                content: row.get(2)?,
                author: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
