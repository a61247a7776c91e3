//! Domain types and models

pub mod session;
pub mod token;

pub use session::{ClientAuthMethod, CodeChallengeMethod, FlowType, Session, StateMode, TokenKind};
pub use token::{OAuthErrorBody, TokenResponse, UserInfo};
