/// Authentication module
///
/// JWT generation/validation, password hashing, and credential issuance.

mod claims;
mod issuer;
mod jwt;
mod password;

pub use claims::Claims;
pub use claims::RefreshClaims;
pub use issuer::issue_credentials;
pub use issuer::TokenPair;
pub use jwt::generate_access_token;
pub use jwt::generate_refresh_token;
pub use jwt::validate_access_token;
pub use jwt::validate_refresh_token;
pub use password::hash_password;
pub use password::verify_password;
