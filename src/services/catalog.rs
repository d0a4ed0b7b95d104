//! Catalog maintenance: authors, books and periodicals

use std::sync::Arc;

use super::{guard, inventory::InventoryLedger, lending::material_by_title};
use crate::{
    error::{AppError, AppResult},
    models::{
        author::AuthorDetails,
        business_key,
        material::{CreateBook, CreatePeriodical, NewMaterial, UpdateBook, UpdatePeriodical},
        Author, Material, MaterialDetails, MaterialKind,
    },
    repository::{CatalogStore, CatalogTx},
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    // Authors

    pub async fn create_author(&self, name: &str) -> AppResult<Author> {
        let name = required(name, "Author name cannot be empty")?;
        let mut tx = self.store.begin().await?;
        if tx.find_author_by_name(name).await?.is_some() {
            return Err(AppError::Validation(format!("Author '{}' already exists", name)));
        }
        let author = tx.insert_author(name).await?;
        tx.commit().await?;
        tracing::info!(author_id = author.id, "Author created");
        Ok(author)
    }

    /// Author with the titles of the books they wrote
    pub async fn get_author(&self, name: &str) -> AppResult<AuthorDetails> {
        let mut tx = self.store.begin().await?;
        let author = author_by_name(&mut *tx, name).await?;
        let book_titles = tx
            .materials_by_author(author.id)
            .await?
            .into_iter()
            .map(|m| m.title)
            .collect();
        Ok(AuthorDetails {
            id: author.id,
            name: author.name,
            book_titles,
        })
    }

    pub async fn list_authors(&self) -> AppResult<Vec<Author>> {
        let mut tx = self.store.begin().await?;
        let authors = tx.list_authors().await?;
        Ok(authors)
    }

    pub async fn rename_author(&self, name: &str, new_name: &str) -> AppResult<Author> {
        let new_name = required(new_name, "Author name cannot be empty")?;
        let mut tx = self.store.begin().await?;
        let mut author = author_by_name(&mut *tx, name).await?;
        if !same_key(&author.name, new_name) && tx.find_author_by_name(new_name).await?.is_some() {
            return Err(AppError::Validation(format!("Author '{}' already exists", new_name)));
        }
        author.name = new_name.to_string();
        tx.update_author(&author).await?;
        tx.commit().await?;
        Ok(author)
    }

    pub async fn delete_author(&self, name: &str) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        let author = author_by_name(&mut *tx, name).await?;
        let materials = tx.materials_by_author(author.id).await?;
        guard::can_delete_author(&author, &materials)?;

        tx.delete_author(author.id).await?;
        tx.commit().await?;
        tracing::info!(author_id = author.id, "Author deleted");
        Ok(())
    }

    // Books

    /// Register a book. Unknown author names are created along the way.
    pub async fn create_book(&self, request: CreateBook) -> AppResult<Material> {
        let title = required(&request.title, "A book must have a title")?.to_string();
        let isbn = required(&request.isbn, "A book must have an ISBN")?.to_string();
        let names = author_names(&request.author_names);
        if names.is_empty() {
            return Err(AppError::Validation("A book must have at least one author".to_string()));
        }
        if request.copies < 0 {
            return Err(AppError::Validation("Copies cannot be negative".to_string()));
        }

        let mut tx = self.store.begin().await?;
        ensure_title_free(&mut *tx, &title).await?;

        let mut author_ids = Vec::with_capacity(names.len());
        for name in &names {
            let author = match tx.find_author_by_name(name).await? {
                Some(author) => author,
                None => tx.insert_author(name).await?,
            };
            author_ids.push(author.id);
        }

        let book = tx
            .insert_material(&NewMaterial {
                title,
                total: request.copies,
                details: MaterialDetails::Book {
                    isbn,
                    publication_year: request.publication_year,
                    author_ids,
                },
            })
            .await?;
        tx.commit().await?;
        tracing::info!(material_id = book.id, copies = request.copies, "Book created");
        Ok(book)
    }

    pub async fn list_books(&self) -> AppResult<Vec<Material>> {
        self.list(MaterialKind::Book).await
    }

    pub async fn get_book(&self, title: &str) -> AppResult<Material> {
        self.get(MaterialKind::Book, title).await
    }

    pub async fn find_book_by_isbn(&self, isbn: &str) -> AppResult<Option<Material>> {
        let mut tx = self.store.begin().await?;
        let book = tx.find_book_by_isbn(isbn.trim()).await?;
        Ok(book)
    }

    /// Update a book. Named authors must already exist.
    pub async fn update_book(&self, title: &str, request: UpdateBook) -> AppResult<Material> {
        let mut tx = self.store.begin().await?;
        let book = update_book_in(&mut *tx, title, request).await?;
        tx.commit().await?;
        Ok(book)
    }

    pub async fn delete_book(&self, title: &str) -> AppResult<()> {
        self.delete(MaterialKind::Book, title).await
    }

    // Periodicals

    pub async fn create_periodical(&self, request: CreatePeriodical) -> AppResult<Material> {
        let title = required(&request.title, "A periodical must have a title")?.to_string();
        let recurrence = required(&request.recurrence, "A periodical must have a recurrence")?.to_string();
        if request.copies < 0 {
            return Err(AppError::Validation("Copies cannot be negative".to_string()));
        }

        let mut tx = self.store.begin().await?;
        ensure_title_free(&mut *tx, &title).await?;
        let periodical = tx
            .insert_material(&NewMaterial {
                title,
                total: request.copies,
                details: MaterialDetails::Periodical {
                    edition_number: request.edition_number,
                    recurrence,
                },
            })
            .await?;
        tx.commit().await?;
        tracing::info!(material_id = periodical.id, copies = request.copies, "Periodical created");
        Ok(periodical)
    }

    pub async fn list_periodicals(&self) -> AppResult<Vec<Material>> {
        self.list(MaterialKind::Periodical).await
    }

    pub async fn get_periodical(&self, title: &str) -> AppResult<Material> {
        self.get(MaterialKind::Periodical, title).await
    }

    pub async fn update_periodical(&self, title: &str, request: UpdatePeriodical) -> AppResult<Material> {
        let mut tx = self.store.begin().await?;
        let periodical = update_periodical_in(&mut *tx, title, request).await?;
        tx.commit().await?;
        Ok(periodical)
    }

    pub async fn delete_periodical(&self, title: &str) -> AppResult<()> {
        self.delete(MaterialKind::Periodical, title).await
    }

    // Shared by both material kinds

    async fn list(&self, kind: MaterialKind) -> AppResult<Vec<Material>> {
        let mut tx = self.store.begin().await?;
        let materials = tx.list_materials(Some(kind)).await?;
        Ok(materials)
    }

    async fn get(&self, kind: MaterialKind, title: &str) -> AppResult<Material> {
        let mut tx = self.store.begin().await?;
        let material = material_of_kind(&mut *tx, kind, title).await?;
        Ok(material)
    }

    async fn delete(&self, kind: MaterialKind, title: &str) -> AppResult<()> {
        let mut tx = self.store.begin().await?;
        let material = material_of_kind(&mut *tx, kind, title).await?;
        guard::can_delete_material(&material)?;

        tx.delete_material(material.id).await?;
        tx.commit().await?;
        tracing::info!(material_id = material.id, kind = kind.as_str(), "Material deleted");
        Ok(())
    }
}

/// Trimmed value, or a validation error when blank
fn required<'a>(value: &'a str, message: &str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AppError::Validation(message.to_string()))
    } else {
        Ok(trimmed)
    }
}

fn same_key(a: &str, b: &str) -> bool {
    business_key(a) == business_key(b)
}

/// Trimmed, non-blank names in first-seen order without duplicates
fn author_names(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        if !out.iter().any(|seen| same_key(seen, name)) {
            out.push(name.to_string());
        }
    }
    out
}

async fn author_by_name(tx: &mut dyn CatalogTx, name: &str) -> AppResult<Author> {
    tx.find_author_by_name(name)
        .await?
        .ok_or_else(|| AppError::AuthorNotFound(name.trim().to_string()))
}

async fn existing_author_ids(tx: &mut dyn CatalogTx, names: &[String]) -> AppResult<Vec<i32>> {
    let names = author_names(names);
    if names.is_empty() {
        return Err(AppError::Validation("A book must have at least one author".to_string()));
    }
    let mut ids = Vec::with_capacity(names.len());
    for name in &names {
        ids.push(author_by_name(tx, name).await?.id);
    }
    Ok(ids)
}

/// Titles are the business key for materials
async fn ensure_title_free(tx: &mut dyn CatalogTx, title: &str) -> AppResult<()> {
    if tx.find_material_by_title(title).await?.is_some() {
        return Err(AppError::Validation(format!("A material titled '{}' already exists", title)));
    }
    Ok(())
}

async fn material_of_kind(tx: &mut dyn CatalogTx, kind: MaterialKind, title: &str) -> AppResult<Material> {
    let material = material_by_title(tx, title).await?;
    if material.kind() != kind {
        return Err(AppError::MaterialNotFound(title.trim().to_string()));
    }
    Ok(material)
}

async fn update_book_in(tx: &mut dyn CatalogTx, title: &str, request: UpdateBook) -> AppResult<Material> {
    let mut book = material_of_kind(tx, MaterialKind::Book, title).await?;

    if let Some(new_title) = &request.title {
        let new_title = required(new_title, "A book must have a title")?;
        if !same_key(new_title, &book.title) {
            ensure_title_free(tx, new_title).await?;
        }
        book.title = new_title.to_string();
    }

    let resolved_authors = match &request.author_names {
        Some(names) => Some(existing_author_ids(tx, names).await?),
        None => None,
    };

    if let MaterialDetails::Book {
        isbn,
        publication_year,
        author_ids,
    } = &mut book.details
    {
        if let Some(new_isbn) = &request.isbn {
            *isbn = required(new_isbn, "A book must have an ISBN")?.to_string();
        }
        if let Some(year) = request.publication_year {
            *publication_year = year;
        }
        if let Some(ids) = resolved_authors {
            *author_ids = ids;
        }
    }

    match request.copies {
        Some(copies) => InventoryLedger::resize(tx, &mut book, copies).await?,
        None => tx.save_material(&book).await?,
    }
    Ok(book)
}

async fn update_periodical_in(
    tx: &mut dyn CatalogTx,
    title: &str,
    request: UpdatePeriodical,
) -> AppResult<Material> {
    let mut periodical = material_of_kind(tx, MaterialKind::Periodical, title).await?;

    if let Some(new_title) = &request.title {
        let new_title = required(new_title, "A periodical must have a title")?;
        if !same_key(new_title, &periodical.title) {
            ensure_title_free(tx, new_title).await?;
        }
        periodical.title = new_title.to_string();
    }

    if let MaterialDetails::Periodical {
        edition_number,
        recurrence,
    } = &mut periodical.details
    {
        if let Some(edition) = request.edition_number {
            *edition_number = edition;
        }
        if let Some(new_recurrence) = &request.recurrence {
            *recurrence = required(new_recurrence, "A periodical must have a recurrence")?.to_string();
        }
    }

    match request.copies {
        Some(copies) => InventoryLedger::resize(tx, &mut periodical, copies).await?,
        None => tx.save_material(&periodical).await?,
    }
    Ok(periodical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_names_are_trimmed_and_deduplicated() {
        let names = vec![
            " Jorge Luis Borges ".to_string(),
            "".to_string(),
            "Adolfo Bioy Casares".to_string(),
            "jorge luis borges".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(
            author_names(&names),
            vec!["Jorge Luis Borges".to_string(), "Adolfo Bioy Casares".to_string()]
        );
    }

    #[test]
    fn test_required_rejects_blank() {
        assert_eq!(required("  Ficciones ", "x").unwrap(), "Ficciones");
        assert!(matches!(required("   ", "x"), Err(AppError::Validation(_))));
    }
}
