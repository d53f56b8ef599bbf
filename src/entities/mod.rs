pub mod account;
pub mod maintenance_comment;
pub mod maintenance_request;
pub mod payment;
pub mod property;
pub mod tenancy;
pub mod unit;

pub use account::Entity as Account;
pub use maintenance_comment::Entity as MaintenanceComment;
pub use maintenance_request::Entity as MaintenanceRequest;
pub use payment::Entity as Payment;
pub use property::Entity as Property;
pub use tenancy::Entity as Tenancy;
pub use unit::Entity as Unit;
