/// Router Module Index
///
/// Groups the routes by the access they require. Each group is wrapped in its own layers in
/// `create_router`, so access control is declared once per group instead of per handler.

/// Routes reachable without credentials.
pub mod public;

/// Routes requiring any resolved identity.
pub mod authenticated;

/// Routes requiring the Admin or Member role.
pub mod member;

/// Routes restricted to the Admin role.
pub mod admin;
