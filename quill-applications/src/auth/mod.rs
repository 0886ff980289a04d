//! Identity and ownership
//!
//! Every request carries an [`IdentityContext`]: anonymous, or a logged-in
//! user. Notes and comments implement [`Owned`]; only their author may edit
//! or delete them.

pub mod identity;
pub mod ownership;

pub use identity::IdentityContext;
pub use ownership::{can_delete, can_edit, ensure_owner, is_owner, Owned};
