//! Concrete flows: each directory pairs a repository (API wrapper) with a
//! view model that binds the shared verification machine to one page.

pub mod forgot_password;
pub mod login;
pub mod register;
pub mod reset_password;
pub mod security;
