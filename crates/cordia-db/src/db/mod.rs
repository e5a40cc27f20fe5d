//! Database repositories for the data access layer
//!
//! Repositories are organized into control/ (identity, tenancy, membership)
//! and crm/ (leads, companies, teams, documents, comments, attachments).
//! Each repository owns a `PgPool` handle and provides CRUD operations and
//! specialized queries; multi-step provisioning writes run inside a single
//! transaction.

// Control repositories (users, orgs, profiles)
pub mod control;
//
// CRM repositories (org-scoped business records)
pub mod crm;

pub use control::{NewUser, OrgRepository, ProfileRepository, UserRepository};
pub use crm::{
    AttachmentRepository, CommentRepository, CompanyRepository, DocumentRepository,
    LeadRepository, NewCompany, NewDocument, NewLead, NewTeam, TeamRepository,
};
