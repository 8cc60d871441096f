// resgroup library
// Locale-aware resource groups with on-demand bundle export

pub mod bundle;
pub mod error;
pub mod group;
pub mod locale;
pub mod manager;
pub mod spec;

pub use bundle::{Bundle, BundleEntry, DirBundle, EmptyBundle, ZipBundle};
pub use error::ResourceError;
pub use group::LocaleGroup;
pub use locale::Locale;
pub use manager::ResourceManager;
pub use spec::{ResourceSpec, TextSpec};
