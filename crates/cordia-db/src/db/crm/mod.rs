pub mod attachment;
pub mod comment;
pub mod company;
pub mod document;
pub mod lead;
pub mod team;

pub use attachment::AttachmentRepository;
pub use comment::CommentRepository;
pub use company::{CompanyRepository, NewCompany};
pub use document::{DocumentRepository, NewDocument};
pub use lead::{LeadRepository, NewLead};
pub use team::{NewTeam, TeamRepository};
