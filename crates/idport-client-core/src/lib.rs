//! Client-side core for the account portal.
//!
//! Everything here is pure state and policy: the session bootstrap state
//! machine, the profile value object and its single-field mutation flow, the
//! application/key directory, input validation, the region wizard, and locale
//! selection. Network and storage are reached only through the trait seams in
//! [`session`] and [`apps`], so every flow runs against in-memory fakes in
//! tests.

pub mod apps;
pub mod locale;
pub mod notify;
pub mod profile;
pub mod region;
pub mod session;
pub mod token_store;
pub mod validate;

pub use apps::{
    Application, ApplicationDirectory, ApplicationDraft, ApplicationEdit, ApplicationTransport,
    DirectoryError, OAuthDraft, OAuthGrant, OAuthScope, authorize_url,
};
pub use locale::{Locale, Phrases};
pub use notify::WelcomeNotification;
pub use profile::{BearerToken, LinkedProvider, Profile, ProfileField, mask_email};
pub use region::{CountryLookup, LocationLookup, RegionWizard};
pub use session::{
    AccountSession, ProfileTransport, RedirectTarget, Session, TokenStore, UpdateError, bootstrap,
};
pub use token_store::FileTokenStore;
pub use validate::{
    ValidationError, normalize_application_name, normalize_password, normalize_user_tag,
    normalize_username,
};
