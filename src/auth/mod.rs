pub mod jwt;
pub mod oauth_service;
pub mod password;
pub mod pkce;
pub mod principal;
pub mod service_registration;

pub use principal::Principal;
