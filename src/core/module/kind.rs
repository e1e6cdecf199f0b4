use serde::{Deserialize, Serialize};

/// What a module represents for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleKind {
    Library,
    ModLoaderInstaller,
    ModLoaderLibrary,
    ForgeHostedMod,
    GenericMod,
    GenericFile,
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ModuleKind::Library => "library",
            ModuleKind::ModLoaderInstaller => "mod-loader-installer",
            ModuleKind::ModLoaderLibrary => "mod-loader-library",
            ModuleKind::ForgeHostedMod => "forge-hosted-mod",
            ModuleKind::GenericMod => "generic-mod",
            ModuleKind::GenericFile => "generic-file",
        };
        f.write_str(s)
    }
}

/// Install policy of a mod, derived from the directory it was found in
/// (`required/`, `optionalon/`, `optionaloff/`) or from a declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    Required,
    OptionalOn,
    OptionalOff,
}

impl Presence {
    pub const ALL: [Presence; 3] = [Presence::Required, Presence::OptionalOn, Presence::OptionalOff];

    pub fn dir_name(self) -> &'static str {
        match self {
            Presence::Required => "required",
            Presence::OptionalOn => "optionalon",
            Presence::OptionalOff => "optionaloff",
        }
    }

    pub fn from_flags(required: bool, default_enabled: Option<bool>) -> Self {
        match (required, default_enabled) {
            (true, _) => Presence::Required,
            (false, Some(false)) => Presence::OptionalOff,
            (false, _) => Presence::OptionalOn,
        }
    }

    pub fn required(self) -> bool {
        self == Presence::Required
    }

    /// The stronger of two policies: required, then optional-on, then
    /// optional-off.
    pub fn strongest(self, other: Presence) -> Presence {
        let rank = |p: Presence| match p {
            Presence::Required => 2,
            Presence::OptionalOn => 1,
            Presence::OptionalOff => 0,
        };
        if rank(other) > rank(self) {
            other
        } else {
            self
        }
    }

    /// `None` for required modules, where the flag has no meaning.
    pub fn default_enabled(self) -> Option<bool> {
        match self {
            Presence::Required => None,
            Presence::OptionalOn => Some(true),
            Presence::OptionalOff => Some(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_kebab_case() {
        let json = serde_json::to_string(&ModuleKind::ForgeHostedMod).unwrap();
        assert_eq!(json, "\"forge-hosted-mod\"");
        assert_eq!(ModuleKind::ModLoaderLibrary.to_string(), "mod-loader-library");
    }

    #[test]
    fn presence_flags_round_trip() {
        for p in Presence::ALL {
            assert_eq!(Presence::from_flags(p.required(), p.default_enabled()), p);
        }
    }

    #[test]
    fn strongest_presence_wins() {
        use Presence::*;
        assert_eq!(OptionalOff.strongest(Required), Required);
        assert_eq!(Required.strongest(OptionalOn), Required);
        assert_eq!(OptionalOff.strongest(OptionalOn), OptionalOn);
        assert_eq!(OptionalOff.strongest(OptionalOff), OptionalOff);
    }
}
