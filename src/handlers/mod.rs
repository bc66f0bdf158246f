// handlers/mod.rs - HTTP handlers
//
// Every /api/spaces/* handler sits behind the license gate and, with RBAC
// enabled, the JWT middleware. See app::spaces_routes.
pub mod spaces;
