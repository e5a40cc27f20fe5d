//! Authentication and request-context resolution.
//!
//! `resolver` turns raw request credentials into a fully bound
//! (user, profile, org) context or a typed failure; `middleware` runs it once
//! per request and maps every failure to a single generic rejection;
//! `permissions` holds the authorization predicates handlers call on the
//! resolved context.

pub mod api_key;
pub mod context;
pub mod jwt;
pub mod middleware;
pub mod permissions;
pub mod provisioning;
pub mod resolver;
pub mod store;

pub use context::{ApiKeyOrg, RequestContext};
pub use jwt::{Claims, JwtService, TokenPair, TokenType};
pub use middleware::{context_resolution_middleware, AuthState};
pub use permissions::{is_org_admin, is_self_or_org_admin};
pub use resolver::{resolve_context, ContextStore, RawCredentials, ResolveError};
pub use store::SqlContextStore;
