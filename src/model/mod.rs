pub mod attendance;
pub mod checkin;
pub mod exclusion;
pub mod organization;
pub mod team;
pub mod worker;

pub type WorkerId = u64;
pub type TeamId = u64;
pub type OrganizationId = u64;
