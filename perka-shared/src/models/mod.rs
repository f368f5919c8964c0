pub mod activation;
pub mod events;
pub mod member;
pub mod partner;
