pub mod contact;
pub mod conversation;
