pub mod user;
pub mod vacancy;

pub use user::Subscription;
pub use vacancy::{SalaryRange, Vacancy, NOT_SPECIFIED};
