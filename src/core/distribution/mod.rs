mod builder;
mod model;
mod walk;

pub use builder::DistributionStructureBuilder;
pub use model::{
    BuildFailure, BuildReport, Distribution, DistroMeta, DistroMetaInfo, DISTRO_META_FILE,
    SCHEMA_VERSION,
};
