pub mod company;
pub mod employee;

pub use company::Company;
pub use employee::{Employee, Severity};
