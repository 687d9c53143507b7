//! Locale handling. The app speaks Russian by default with an English
//! alternative; the catalog lives in `locales/*.yml`.

use std::rc::Rc;

use crate::api::{ApiClient, ApiError};
use crate::view::FlowView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    En,
    #[default]
    Ru,
}

impl Lang {
    /// Loose parse: trims, ignores case, falls back to the default locale
    /// for anything unrecognized.
    pub fn parse(raw: &str) -> Lang {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" => Lang::En,
            "ru" => Lang::Ru,
            _ => Lang::default(),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ru => "ru",
        }
    }

    /// Make this the active locale for all `t!` lookups.
    pub fn apply(self) {
        rust_i18n::set_locale(self.code());
    }
}

/// Persist the language on the server, switch the local catalog and reload
/// the current route so server-rendered text picks the new language up.
pub async fn switch_language(
    api: &ApiClient,
    view: &Rc<dyn FlowView>,
    lang: Lang,
    current_route: &str,
) -> Result<(), ApiError> {
    api.set_language(lang.code()).await?;
    lang.apply();
    view.navigate_to(current_route);
    Ok(())
}
