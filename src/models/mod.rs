//! Data models for the circulation server

pub mod author;
pub mod borrower;
pub mod loan;
pub mod material;

// Re-export commonly used types
pub use author::Author;
pub use borrower::Borrower;
pub use loan::{Loan, LoanDetails, LoanLine};
pub use material::{Material, MaterialDetails, MaterialKind};

/// Lookup form of a business key (title, author or borrower name).
///
/// Keys are stored as entered, trimmed, and matched ignoring case.
pub fn business_key(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_key_ignores_padding_and_case() {
        assert_eq!(business_key("  Rayuela "), "rayuela");
        assert_eq!(business_key("ANA"), business_key(" ana"));
        assert_ne!(business_key("Ana María"), business_key("Ana Maria"));
    }
}
