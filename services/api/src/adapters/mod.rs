pub mod auth;
pub mod catalog;
pub mod criteria_llm;
pub mod criteria_mock;

pub use auth::MockAuthAdapter;
pub use catalog::MockCatalogAdapter;
pub use criteria_llm::OpenAiCriteriaAdapter;
pub use criteria_mock::MockCriteriaAdapter;
