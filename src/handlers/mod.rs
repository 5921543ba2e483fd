// handlers - request handlers grouped by access tier
//
// Public (no auth) → Protected (JWT, owner-scoped writes under /own)
// plus the auth service's own endpoints and the operational routes.

pub mod auth;
pub mod protected;
pub mod public;
pub mod system;
pub mod validation;
