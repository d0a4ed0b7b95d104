//! Material queries (books and periodicals share the `materials` table)

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::PgTx;
use crate::{
    error::{AppError, AppResult},
    models::{business_key, material::NewMaterial, Material, MaterialDetails, MaterialKind},
};

const MATERIAL_COLUMNS: &str = "id, kind, title, total, available, isbn, publication_year, \
                                edition_number, recurrence, created_at";

#[derive(FromRow)]
struct MaterialRow {
    id: i32,
    kind: String,
    title: String,
    total: Option<i32>,
    available: Option<i32>,
    isbn: Option<String>,
    publication_year: Option<i32>,
    edition_number: Option<i32>,
    recurrence: Option<String>,
    created_at: DateTime<Utc>,
}

impl MaterialRow {
    fn into_material(self, author_ids: Vec<i32>) -> AppResult<Material> {
        let kind = self
            .kind
            .parse::<MaterialKind>()
            .map_err(|e| AppError::Internal(format!("Material {}: {}", self.id, e)))?;

        let details = match kind {
            MaterialKind::Book => MaterialDetails::Book {
                isbn: self.isbn.unwrap_or_default(),
                publication_year: self.publication_year.unwrap_or_default(),
                author_ids,
            },
            MaterialKind::Periodical => MaterialDetails::Periodical {
                edition_number: self.edition_number.unwrap_or_default(),
                recurrence: self.recurrence.unwrap_or_default(),
            },
        };

        Ok(Material {
            id: self.id,
            title: self.title,
            total: self.total,
            available: self.available,
            created_at: self.created_at,
            details,
        })
    }
}

/// Column values for the variant-specific fields
fn variant_columns(details: &MaterialDetails) -> (Option<&str>, Option<i32>, Option<i32>, Option<&str>) {
    match details {
        MaterialDetails::Book {
            isbn,
            publication_year,
            ..
        } => (Some(isbn.as_str()), Some(*publication_year), None, None),
        MaterialDetails::Periodical {
            edition_number,
            recurrence,
        } => (None, None, Some(*edition_number), Some(recurrence.as_str())),
    }
}

impl PgTx {
    /// Attach author ids to book rows
    async fn hydrate_materials(&mut self, rows: Vec<MaterialRow>) -> AppResult<Vec<Material>> {
        let book_ids: Vec<i32> = rows
            .iter()
            .filter(|r| r.kind == MaterialKind::Book.as_str())
            .map(|r| r.id)
            .collect();

        let mut authors: HashMap<i32, Vec<i32>> = HashMap::new();
        if !book_ids.is_empty() {
            let links: Vec<(i32, i32)> = sqlx::query_as(
                "SELECT material_id, author_id FROM book_authors \
                 WHERE material_id = ANY($1) ORDER BY material_id, position",
            )
            .bind(&book_ids[..])
            .fetch_all(&mut *self.tx)
            .await?;

            for (material_id, author_id) in links {
                authors.entry(material_id).or_default().push(author_id);
            }
        }

        rows.into_iter()
            .map(|row| {
                let author_ids = authors.remove(&row.id).unwrap_or_default();
                row.into_material(author_ids)
            })
            .collect()
    }

    async fn fetch_one_locked(&mut self, query: &str, bind: LookupKey<'_>) -> AppResult<Option<Material>> {
        let q = sqlx::query_as::<_, MaterialRow>(query);
        let q = match bind {
            LookupKey::Id(id) => q.bind(id),
            LookupKey::Text(text) => q.bind(text),
        };
        let row = q.fetch_optional(&mut *self.tx).await?;

        match row {
            Some(row) => Ok(self.hydrate_materials(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    pub(super) async fn material_by_id(&mut self, id: i32) -> AppResult<Option<Material>> {
        let query = format!("SELECT {} FROM materials WHERE id = $1 FOR UPDATE", MATERIAL_COLUMNS);
        self.fetch_one_locked(&query, LookupKey::Id(id)).await
    }

    pub(super) async fn material_by_title(&mut self, title: &str) -> AppResult<Option<Material>> {
        let query = format!(
            "SELECT {} FROM materials WHERE lower(title) = $1 ORDER BY id LIMIT 1 FOR UPDATE",
            MATERIAL_COLUMNS
        );
        let key = business_key(title);
        self.fetch_one_locked(&query, LookupKey::Text(&key)).await
    }

    pub(super) async fn book_by_isbn(&mut self, isbn: &str) -> AppResult<Option<Material>> {
        let query = format!(
            "SELECT {} FROM materials WHERE kind = 'book' AND isbn = $1 ORDER BY id LIMIT 1 FOR UPDATE",
            MATERIAL_COLUMNS
        );
        self.fetch_one_locked(&query, LookupKey::Text(isbn)).await
    }

    pub(super) async fn materials_list(&mut self, kind: Option<MaterialKind>) -> AppResult<Vec<Material>> {
        let query = format!(
            "SELECT {} FROM materials WHERE ($1::text IS NULL OR kind = $1) ORDER BY title, id",
            MATERIAL_COLUMNS
        );
        let rows = sqlx::query_as::<_, MaterialRow>(&query)
            .bind(kind.map(|k| k.as_str()))
            .fetch_all(&mut *self.tx)
            .await?;
        self.hydrate_materials(rows).await
    }

    pub(super) async fn materials_by_author_id(&mut self, author_id: i32) -> AppResult<Vec<Material>> {
        let query = format!(
            "SELECT {} FROM materials m \
             WHERE EXISTS (SELECT 1 FROM book_authors ba WHERE ba.material_id = m.id AND ba.author_id = $1) \
             ORDER BY title, id",
            MATERIAL_COLUMNS
        );
        let rows = sqlx::query_as::<_, MaterialRow>(&query)
            .bind(author_id)
            .fetch_all(&mut *self.tx)
            .await?;
        self.hydrate_materials(rows).await
    }

    pub(super) async fn material_insert(&mut self, material: &NewMaterial) -> AppResult<Material> {
        let (isbn, publication_year, edition_number, recurrence) = variant_columns(&material.details);
        let kind = match material.details {
            MaterialDetails::Book { .. } => MaterialKind::Book,
            MaterialDetails::Periodical { .. } => MaterialKind::Periodical,
        };

        let query = format!(
            r#"
            INSERT INTO materials (kind, title, total, available, isbn, publication_year, edition_number, recurrence)
            VALUES ($1, $2, $3, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            MATERIAL_COLUMNS
        );
        let row = sqlx::query_as::<_, MaterialRow>(&query)
            .bind(kind.as_str())
            .bind(&material.title)
            .bind(material.total)
            .bind(isbn)
            .bind(publication_year)
            .bind(edition_number)
            .bind(recurrence)
            .fetch_one(&mut *self.tx)
            .await?;

        let author_ids = match &material.details {
            MaterialDetails::Book { author_ids, .. } => author_ids.clone(),
            MaterialDetails::Periodical { .. } => Vec::new(),
        };
        self.replace_book_authors(row.id, &author_ids).await?;

        row.into_material(author_ids)
    }

    pub(super) async fn material_save(&mut self, material: &Material) -> AppResult<()> {
        let (isbn, publication_year, edition_number, recurrence) = variant_columns(&material.details);

        let result = sqlx::query(
            r#"
            UPDATE materials
            SET title = $1, total = $2, available = $3, isbn = $4,
                publication_year = $5, edition_number = $6, recurrence = $7
            WHERE id = $8
            "#,
        )
        .bind(&material.title)
        .bind(material.total)
        .bind(material.available)
        .bind(isbn)
        .bind(publication_year)
        .bind(edition_number)
        .bind(recurrence)
        .bind(material.id)
        .execute(&mut *self.tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Internal(format!("Material {} vanished", material.id)));
        }

        if let MaterialDetails::Book { author_ids, .. } = &material.details {
            self.replace_book_authors(material.id, author_ids).await?;
        }
        Ok(())
    }

    /// Book authors and historic loan lines cascade with the row
    pub(super) async fn material_delete(&mut self, id: i32) -> AppResult<()> {
        sqlx::query("DELETE FROM materials WHERE id = $1")
            .bind(id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn replace_book_authors(&mut self, material_id: i32, author_ids: &[i32]) -> AppResult<()> {
        sqlx::query("DELETE FROM book_authors WHERE material_id = $1")
            .bind(material_id)
            .execute(&mut *self.tx)
            .await?;

        for (position, author_id) in author_ids.iter().enumerate() {
            sqlx::query(
                "INSERT INTO book_authors (material_id, author_id, position) VALUES ($1, $2, $3)",
            )
            .bind(material_id)
            .bind(*author_id)
            .bind(position as i16)
            .execute(&mut *self.tx)
            .await?;
        }
        Ok(())
    }
}

enum LookupKey<'a> {
    Id(i32),
    Text(&'a str),
}
