//! Secondary panels: profile, class manager and the password-gated vault

pub mod classes;
pub mod profile;
pub mod vault;

pub use classes::{parse_bulk_students, ClassesPanel};
pub use profile::ProfilePanel;
pub use vault::{VaultPanel, VaultView};
