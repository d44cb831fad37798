//! Fixed endpoint paths of the Pet Manager API.

/// Login endpoint; credentials go in the body, never a bearer token.
pub const LOGIN: &str = "/autenticacao/login";

/// Refresh endpoint; the refresh token is presented as the bearer
/// credential. Excluded from the 401 refresh-and-retry policy.
pub const REFRESH: &str = "/autenticacao/refresh";

pub const PETS: &str = "/pets";

pub const TUTORES: &str = "/tutores";
