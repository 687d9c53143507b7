mod repository;
mod view_model;

pub use repository::ForgotPasswordRepository;
pub use view_model::{ForgotPasswordBinding, ForgotPasswordViewModel};
