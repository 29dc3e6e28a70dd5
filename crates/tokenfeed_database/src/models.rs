//! Diesel models for the posts table.

use crate::schema::posts;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tokenfeed_core::{NewPost, Post};
use tokenfeed_error::{DatabaseError, DatabaseErrorKind};

/// Database row for the posts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostRow {
    pub id: i64,
    pub nickname: String,
    pub token: String,
    pub numbers: Vec<i32>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for the posts table.
///
/// `id` and `created_at` come from column defaults.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPostRow {
    pub nickname: String,
    pub token: String,
    pub numbers: Vec<i32>,
}

impl From<NewPost> for NewPostRow {
    fn from(post: NewPost) -> Self {
        Self {
            nickname: post.nickname().clone(),
            token: post.token().clone(),
            numbers: post.numbers().iter().map(|&n| i32::from(n)).collect(),
        }
    }
}

impl TryFrom<PostRow> for Post {
    type Error = DatabaseError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let numbers = row
            .numbers
            .iter()
            .map(|&n| u16::try_from(n))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                DatabaseError::new(DatabaseErrorKind::InvalidRow(
                    row.id,
                    format!("number out of range: {}", e),
                ))
            })?;

        Ok(Post::new(
            row.id,
            row.nickname,
            row.token,
            numbers,
            row.created_at,
        ))
    }
}
