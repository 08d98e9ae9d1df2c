//! Domain logic - pure release rules independent of git and docker

pub mod branch;
pub mod tag;
pub mod version;

pub use branch::{BranchPolicy, RemoteBranch};
pub use tag::ReleaseTag;
pub use version::{is_production_identifier, SemanticVersion};
