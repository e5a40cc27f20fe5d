pub mod org;
pub mod profile;
pub mod user;

pub use org::OrgRepository;
pub use profile::ProfileRepository;
pub use user::{NewUser, UserRepository};
