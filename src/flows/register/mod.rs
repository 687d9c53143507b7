mod repository;
mod utils;
mod view_model;

pub use repository::RegistrationRepository;
pub use utils::{validate_registration, RegistrationForm};
pub use view_model::{RegistrationBinding, RegistrationViewModel};
