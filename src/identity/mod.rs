//! Primary identity: the provider client and the session refresh the default
//! zone delegates to.

mod provider;
mod session;

pub use provider::{GoTrueProvider, IdentityProvider, ProviderUser, TokenPair};
pub use session::{PrimarySessionConfig, ProviderSessionRefresher, ACCESS_TOKEN_COOKIE, DEFAULT_LOGIN_PATH, REFRESH_TOKEN_COOKIE};
