pub mod identity;
pub mod leads;

pub use identity::{AuthResult, Registration, UserService};
pub use leads::LeadService;
