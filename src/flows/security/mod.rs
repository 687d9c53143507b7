mod repository;
mod utils;
mod view_model;

pub use repository::SecurityRepository;
pub use utils::{validate_password_change, PasswordChangeForm};
pub use view_model::{
    BackupEmailBinding, BackupEmailViewModel, PasswordChangeBinding, PasswordChangeViewModel,
};
