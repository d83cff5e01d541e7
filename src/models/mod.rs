pub mod application;
pub mod contact;
pub mod message;
pub mod response;
pub mod validation;
