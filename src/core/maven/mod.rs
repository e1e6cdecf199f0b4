mod artifact;

pub use artifact::MavenArtifact;

/// Maven repositories hosting loader artifacts.
pub const FORGE_MAVEN: &str = "https://maven.minecraftforge.net";
pub const FABRIC_MAVEN: &str = "https://maven.fabricmc.net";
