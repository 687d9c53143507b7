mod repository;
mod utils;
mod view_model;

pub use repository::LoginRepository;
pub use utils::{validate_credentials, LoginForm};
pub use view_model::{LoginBinding, LoginViewModel};
