//! `registrar-records` — tenant-scoped record types.
//!
//! Peripheral data modeling around the authorization and lifecycle core:
//! institutions, accounts, classes, students, occurrence catalog and filed
//! occurrences, access requests. Persistence lives in `registrar-store`;
//! these types only carry their own local invariants.

pub mod access_request;
pub mod account;
pub mod class;
pub mod institution;
pub mod occurrence;
pub mod student;

pub use access_request::{AccessRequest, AccessRequestStatus};
pub use account::{Account, Trashable};
pub use class::Class;
pub use institution::Institution;
pub use occurrence::{Occurrence, OccurrenceType, Severity};
pub use student::Student;
