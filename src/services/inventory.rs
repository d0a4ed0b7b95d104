//! Inventory ledger: the only code that changes copy counters

use crate::{
    error::{AppError, AppResult},
    models::Material,
    repository::CatalogTx,
};

pub struct InventoryLedger;

impl InventoryLedger {
    /// True iff both counters are set and some copy is out
    pub fn is_on_loan(material: &Material) -> bool {
        match (material.total, material.available) {
            (Some(total), Some(available)) => available < total,
            _ => false,
        }
    }

    /// Take one copy out of stock
    pub fn take_copy(material: &mut Material) -> AppResult<()> {
        match material.available {
            Some(available) if available > 0 => {
                material.available = Some(available - 1);
                Ok(())
            }
            _ => Err(AppError::OutOfStock {
                title: material.title.clone(),
            }),
        }
    }

    /// Put one copy back. Refuses to go above `total` rather than clamping.
    pub fn put_back_copy(material: &mut Material) -> AppResult<()> {
        let available = material.available.unwrap_or(0) + 1;
        if let Some(total) = material.total {
            if available > total {
                tracing::warn!(
                    material_id = material.id,
                    title = %material.title,
                    total,
                    "Return would push available copies above total"
                );
                return Err(AppError::InventoryOverflow {
                    title: material.title.clone(),
                    total,
                });
            }
        }
        material.available = Some(available);
        Ok(())
    }

    /// Change the number of copies owned, keeping the ones on loan out
    pub fn set_total(material: &mut Material, new_total: i32) -> AppResult<()> {
        let on_loan = material.copies_on_loan().unwrap_or(0);
        if new_total < on_loan {
            return Err(AppError::Validation(format!(
                "'{}' has {} copies on loan; total cannot drop to {}",
                material.title, on_loan, new_total
            )));
        }
        material.total = Some(new_total);
        material.available = Some(new_total - on_loan);
        Ok(())
    }

    pub async fn decrement_available(tx: &mut dyn CatalogTx, material: &mut Material) -> AppResult<()> {
        Self::take_copy(material)?;
        tx.save_material(material).await
    }

    pub async fn increment_available(tx: &mut dyn CatalogTx, material: &mut Material) -> AppResult<()> {
        Self::put_back_copy(material)?;
        tx.save_material(material).await
    }

    pub async fn resize(tx: &mut dyn CatalogTx, material: &mut Material, new_total: i32) -> AppResult<()> {
        Self::set_total(material, new_total)?;
        tx.save_material(material).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MaterialDetails;
    use chrono::Utc;

    fn book(total: Option<i32>, available: Option<i32>) -> Material {
        Material {
            id: 10,
            title: "Cien años de soledad".to_string(),
            total,
            available,
            created_at: Utc::now(),
            details: MaterialDetails::Book {
                isbn: "978-0307474728".to_string(),
                publication_year: 1967,
                author_ids: vec![1],
            },
        }
    }

    #[test]
    fn test_is_on_loan() {
        assert!(InventoryLedger::is_on_loan(&book(Some(3), Some(2))));
        assert!(!InventoryLedger::is_on_loan(&book(Some(3), Some(3))));
        assert!(!InventoryLedger::is_on_loan(&book(None, Some(2))));
        assert!(!InventoryLedger::is_on_loan(&book(Some(3), None)));
    }

    #[test]
    fn test_take_copy_decrements() {
        let mut material = book(Some(3), Some(3));
        InventoryLedger::take_copy(&mut material).unwrap();
        assert_eq!(material.available, Some(2));
    }

    #[test]
    fn test_take_copy_out_of_stock_leaves_counter() {
        let mut material = book(Some(3), Some(0));
        let err = InventoryLedger::take_copy(&mut material).unwrap_err();
        assert!(matches!(err, AppError::OutOfStock { .. }));
        assert_eq!(material.available, Some(0));

        let mut unset = book(Some(3), None);
        assert!(InventoryLedger::take_copy(&mut unset).is_err());
    }

    #[test]
    fn test_put_back_rejects_overflow() {
        let mut material = book(Some(2), Some(1));
        InventoryLedger::put_back_copy(&mut material).unwrap();
        assert_eq!(material.available, Some(2));

        let err = InventoryLedger::put_back_copy(&mut material).unwrap_err();
        assert!(matches!(err, AppError::InventoryOverflow { total: 2, .. }));
        assert_eq!(material.available, Some(2));
    }

    #[test]
    fn test_set_total_keeps_loaned_copies_out() {
        let mut material = book(Some(5), Some(3));
        InventoryLedger::set_total(&mut material, 4).unwrap();
        assert_eq!(material.total, Some(4));
        assert_eq!(material.available, Some(2));

        assert!(InventoryLedger::set_total(&mut material, 1).is_err());
        assert_eq!(material.total, Some(4));
    }
}
