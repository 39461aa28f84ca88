pub mod audit_entry;
pub mod change;
pub mod entities;
pub mod notification;
