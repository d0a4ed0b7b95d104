//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{authors, books, borrowers, health, loans, periodicals};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation API",
        version = "0.1.0",
        description = "Lending library inventory and loans REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Authors
        authors::list_authors,
        authors::get_author,
        authors::create_author,
        authors::rename_author,
        authors::delete_author,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        // Periodicals
        periodicals::list_periodicals,
        periodicals::get_periodical,
        periodicals::create_periodical,
        periodicals::update_periodical,
        periodicals::delete_periodical,
        // Borrowers
        borrowers::list_borrowers,
        borrowers::get_borrower,
        borrowers::create_borrower,
        borrowers::delete_borrower,
        borrowers::get_borrower_loans,
        // Loans
        loans::create_loan,
        loans::return_loan,
        loans::who_has_on_loan,
    ),
    components(
        schemas(
            // Authors
            crate::models::Author,
            crate::models::author::AuthorDetails,
            crate::models::author::AuthorRequest,
            // Materials
            crate::models::Material,
            crate::models::MaterialDetails,
            crate::models::MaterialKind,
            crate::models::material::CreateBook,
            crate::models::material::UpdateBook,
            crate::models::material::CreatePeriodical,
            crate::models::material::UpdatePeriodical,
            // Borrowers
            crate::models::Borrower,
            crate::models::borrower::CreateBorrower,
            // Loans
            crate::models::Loan,
            crate::models::LoanLine,
            crate::models::LoanDetails,
            crate::models::loan::CreateLoanRequest,
            crate::models::loan::ReturnLoanRequest,
            loans::ReturnResponse,
            loans::HoldersResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "authors", description = "Author management"),
        (name = "books", description = "Book catalog"),
        (name = "periodicals", description = "Periodical catalog"),
        (name = "borrowers", description = "Borrower management"),
        (name = "loans", description = "Lending and returns")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
