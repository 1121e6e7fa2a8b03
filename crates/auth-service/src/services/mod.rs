pub mod refresh_service;
pub mod role_resolver;
pub mod token_issuer;
pub mod user_service;

pub use refresh_service::{Redemption, RefreshService};
pub use role_resolver::RoleResolver;
pub use token_issuer::{TokenIssuer, TokenSettings};
pub use user_service::UserService;
