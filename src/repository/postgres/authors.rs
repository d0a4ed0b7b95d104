//! Author queries

use super::PgTx;
use crate::{
    error::{AppError, AppResult},
    models::{business_key, Author},
};

impl PgTx {
    pub(super) async fn author_by_id(&mut self, id: i32) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>("SELECT id, name FROM authors WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?;
        Ok(author)
    }

    pub(super) async fn author_by_name(&mut self, name: &str) -> AppResult<Option<Author>> {
        let author = sqlx::query_as::<_, Author>(
            "SELECT id, name FROM authors WHERE lower(name) = $1 ORDER BY id LIMIT 1",
        )
        .bind(business_key(name))
        .fetch_optional(&mut *self.tx)
        .await?;
        Ok(author)
    }

    pub(super) async fn authors_list(&mut self) -> AppResult<Vec<Author>> {
        let authors = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY name")
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(authors)
    }

    pub(super) async fn author_insert(&mut self, name: &str) -> AppResult<Author> {
        let author = sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(author)
    }

    pub(super) async fn author_update(&mut self, author: &Author) -> AppResult<()> {
        let result = sqlx::query("UPDATE authors SET name = $1 WHERE id = $2")
            .bind(&author.name)
            .bind(author.id)
            .execute(&mut *self.tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::Internal(format!("Author {} vanished", author.id)));
        }
        Ok(())
    }

    pub(super) async fn author_delete(&mut self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM authors WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }
}
