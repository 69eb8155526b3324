//! Binary locale, resolved once from explicit configuration at startup and
//! injected into views. The hosted portal used to sniff the hostname for
//! this; here the choice is a config value and nothing re-derives it later.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    English,
    Russian,
}

impl Locale {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Russian => "ru",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Some(Self::English),
            "ru" | "russian" => Some(Self::Russian),
            _ => None,
        }
    }

    #[must_use]
    pub fn phrases(self) -> &'static Phrases {
        match self {
            Self::English => &EN,
            Self::Russian => &RU,
        }
    }
}

/// The handful of translated strings the views need.
#[derive(Debug, PartialEq, Eq)]
pub struct Phrases {
    pub change_country: &'static str,
    pub contact_from: &'static str,
    pub and_registered: &'static str,
    pub already_set: &'static str,
    pub continue_hint: &'static str,
    pub no_changes: &'static str,
    pub unknown: &'static str,
    pub loading: &'static str,
}

static EN: Phrases = Phrases {
    change_country: "Change country",
    contact_from: "You are contacting us from",
    and_registered: "and your account is registered in",
    already_set: "Your region is already set correctly.",
    continue_hint: "Continue to move your account to the detected region.",
    no_changes: "No changes needed",
    unknown: "unknown",
    loading: "Determining your location...",
};

static RU: Phrases = Phrases {
    change_country: "Сменить страну",
    contact_from: "Вы обращаетесь к нам из",
    and_registered: "а ваш аккаунт зарегистрирован в",
    already_set: "Ваш регион уже указан верно.",
    continue_hint: "Продолжите, чтобы перенести аккаунт в определённый регион.",
    no_changes: "Изменения не требуются",
    unknown: "неизвестно",
    loading: "Определяем ваше местоположение...",
};
