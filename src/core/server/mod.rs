mod builder;
mod model;

pub use builder::{CreatedServer, ServerStructureBuilder};
pub use model::{
    mods_dir_name, select_loader, LoaderVersionMeta, Server, ServerMeta, ServerMetaInfo,
    FABRIC_MODS_DIR, FILES_DIR, FORGE_MODS_DIR, LIBRARIES_DIR, SERVER_META_FILE,
};
