// ─── Helios Distro Core ───
// Builds the distribution manifest a launcher downloads servers from.
//
// Architecture:
//   core/
//     version/       - Game version parsing and ordering
//     artifact/      - File hashing, hash cache, download URLs
//     module/        - Module tree (leaf artifact or ordered group)
//     maven/         - Maven coordinates for loader artifacts
//     loaders/       - Forge / Fabric layout table + installer resolver
//     curseforge/    - Third-party mods and their dependencies
//     server/        - Server model, servermeta.json, skeleton builder
//     distribution/  - Root walk, manifest model, failure report
//     downloader/    - Concurrent downloads with SHA-1 validation
//     http/          - Client construction + retry with backoff
//     config/        - Root / base URL resolution and build tunables

pub mod artifact;
pub mod config;
pub mod curseforge;
pub mod distribution;
pub mod downloader;
pub mod error;
pub mod fs;
pub mod http;
pub mod loaders;
pub mod maven;
pub mod module;
pub mod server;
pub mod version;
