// handlers/protected - owner-scoped writes under `/own` (JWT required)
//
// Every handler here runs behind `jwt_auth_middleware` and receives the
// caller as `Extension<AuthUser>`. Writes are counted in
// `crud_operations_total`.

pub mod category;
pub mod portfolio;
pub mod project;
pub mod section;
pub mod section_content;
pub mod utils;
