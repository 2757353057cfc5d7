pub mod classify;
pub mod context;
pub mod policy;
pub mod text;

pub use classify::classify;
pub use context::PrivacyInput;
pub use policy::{MaskPolicy, MASK_ATTR, UNMASK_ATTR};
pub use text::{short_hash, truncate_chars};
