pub mod assignment_scraper;
pub mod config;
pub mod deadline;
pub mod errors;
pub mod extractors;
pub mod requests;
pub mod routes;
pub mod shibboleth;
pub mod text_manipulators;

pub use assignment_scraper::Assignment;
pub use config::AppConfig;
pub use deadline::{AssignmentDue, Remaining};
pub use shibboleth::SessionCookie;
