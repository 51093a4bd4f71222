pub use procurement_api_types::{
    OrganizationId,
    Username,
    Version,
};

/// Primary key of an employee row.
pub type UserId = i32;
