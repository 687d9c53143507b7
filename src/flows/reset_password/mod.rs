mod repository;
mod utils;
mod view_model;

pub use repository::ResetPasswordRepository;
pub use utils::{validate_new_password, ResetPasswordForm};
pub use view_model::ResetPasswordViewModel;
