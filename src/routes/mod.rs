/// Router Module Index
///
/// Routes are grouped by the guard applied to them. Each group gets its guard as
/// a route layer in `create_router`, so a handler can't be mounted without it.

/// Routes reachable without logging in.
pub mod public;

/// Routes requiring a resolved `Principal`.
pub mod authenticated;

/// Routes restricted to administrators. Nested under `/admin`.
pub mod admin;
