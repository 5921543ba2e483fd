// handlers/auth - endpoints of the authentication service
//
// Public: register and login (token acquisition).
// Protected: profile and user listing, behind `current_user_middleware`.
//
// Responses are bare JSON objects; errors use the shared `ApiError` body.

pub mod profile;
pub mod session;
pub mod users;
