//! Standard host-side authorization rules — reads `~/.emberbox/policy.toml`
//! and enforces refused mount roots, read-only drives, write-protected
//! paths, and hidden file names.
//!
//! This is the stock implementation a host can install into the three
//! authorization gates; a host with bespoke rules can ignore it and
//! register its own closures instead. With no policy file the rules are
//! fully permissive, matching the bridge's default-catalogue behavior.

use crate::authorize::Decision;
use crate::registry::HookRegistry;
use emberbox_types::DriveId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Policy configuration parsed from `policy.toml`.
///
/// Guest paths and names are matched case-insensitively, the way the guest
/// filesystem treats them; entries are held uppercased.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostPolicyConfig {
    /// Host directories that may never back a mount.
    #[serde(default)]
    pub refused_mount_roots: Vec<PathBuf>,
    /// Drives the guest may read but never write.
    #[serde(default)]
    pub read_only_drives: HashSet<DriveId>,
    /// Drive-qualified guest paths that reject write intent.
    #[serde(default)]
    pub write_protected: HashSet<String>,
    /// File names that never appear in guest listings.
    #[serde(default)]
    pub hidden_names: HashSet<String>,
}

impl HostPolicyConfig {
    fn normalized(self) -> Self {
        Self {
            refused_mount_roots: self.refused_mount_roots,
            read_only_drives: self.read_only_drives,
            write_protected: self
                .write_protected
                .into_iter()
                .map(|p| p.to_uppercase())
                .collect(),
            hidden_names: self
                .hidden_names
                .into_iter()
                .map(|n| n.to_uppercase())
                .collect(),
        }
    }
}

/// Evaluates the stock authorization rules.
pub struct HostPolicy {
    config: HostPolicyConfig,
    policy_path: Option<PathBuf>,
}

impl HostPolicy {
    /// Loads policy from `~/.emberbox/policy.toml` if it exists.
    /// Falls back to permissive rules with a warning on parse errors.
    pub fn load() -> Self {
        Self::load_from(dirs_path().join("policy.toml"))
    }

    /// Loads policy from an explicit path.
    pub fn load_from(policy_path: PathBuf) -> Self {
        if !policy_path.exists() {
            info!("No policy file found at {:?}, running permissive", policy_path);
            return Self {
                config: HostPolicyConfig::default(),
                policy_path: None,
            };
        }

        match std::fs::read_to_string(&policy_path) {
            Ok(contents) => match toml::from_str::<PolicyFile>(&contents) {
                Ok(file) => {
                    info!("Loaded host policy from {:?}", policy_path);
                    Self {
                        config: file.into_config(),
                        policy_path: Some(policy_path),
                    }
                }
                Err(e) => {
                    warn!(
                        "Failed to parse policy file {:?}: {}. Falling back to permissive rules.",
                        policy_path, e
                    );
                    Self {
                        config: HostPolicyConfig::default(),
                        policy_path: Some(policy_path),
                    }
                }
            },
            Err(e) => {
                warn!("Failed to read policy file {:?}: {}", policy_path, e);
                Self {
                    config: HostPolicyConfig::default(),
                    policy_path: Some(policy_path),
                }
            }
        }
    }

    /// Creates a policy with explicit config (for hosts and tests).
    pub fn with_config(config: HostPolicyConfig) -> Self {
        Self {
            config: config.normalized(),
            policy_path: None,
        }
    }

    /// May the given host directory back a mount?
    pub fn allow_mount(&self, path: &Path) -> Decision {
        let refused = self
            .config
            .refused_mount_roots
            .iter()
            .any(|root| path.starts_with(root));
        Decision::allow_if(!refused)
    }

    /// May the guest write to this path on this drive?
    pub fn allow_write(&self, path: &Path, drive: DriveId) -> Decision {
        if self.config.read_only_drives.contains(&drive) {
            return Decision::Deny;
        }
        let normalized = path.to_string_lossy().to_uppercase();
        Decision::allow_if(!self.config.write_protected.contains(&normalized))
    }

    /// May this host file name appear in guest listings?
    pub fn allow_name(&self, name: &str) -> Decision {
        Decision::allow_if(!self.config.hidden_names.contains(&name.to_uppercase()))
    }

    /// Wires these rules into the three authorization gates of a registry.
    pub fn install(self: &Arc<Self>, registry: &mut HookRegistry) {
        let mount = Arc::clone(self);
        registry.on_mount_authorization(move |path| mount.allow_mount(path));

        let write = Arc::clone(self);
        registry.on_write_authorization(move |path, drive| write.allow_write(path, drive));

        let name = Arc::clone(self);
        registry.on_file_visibility(move |entry| name.allow_name(entry));
    }

    /// Returns whether a policy file was found.
    pub fn has_policy_file(&self) -> bool {
        self.policy_path.is_some()
    }

    /// Returns the active policy config.
    pub fn config(&self) -> &HostPolicyConfig {
        &self.config
    }
}

/// Raw TOML structure matching the policy.toml format.
#[derive(Deserialize)]
struct PolicyFile {
    #[serde(default)]
    policy: PolicySection,
}

#[derive(Deserialize, Default)]
struct PolicySection {
    #[serde(default, rename = "refused-mount-roots")]
    refused_mount_roots: Vec<PathBuf>,
    #[serde(default, rename = "read-only-drives")]
    read_only_drives: Vec<String>,
    #[serde(default, rename = "write-protected")]
    write_protected: Vec<String>,
    #[serde(default, rename = "hidden-names")]
    hidden_names: Vec<String>,
}

impl PolicyFile {
    fn into_config(self) -> HostPolicyConfig {
        let mut read_only_drives = HashSet::new();
        for spec in &self.policy.read_only_drives {
            match spec.parse::<DriveId>() {
                Ok(drive) => {
                    read_only_drives.insert(drive);
                }
                Err(e) => warn!("Ignoring invalid read-only drive {:?}: {}", spec, e),
            }
        }

        HostPolicyConfig {
            refused_mount_roots: self.policy.refused_mount_roots,
            read_only_drives,
            write_protected: self.policy.write_protected.into_iter().collect(),
            hidden_names: self.policy.hidden_names.into_iter().collect(),
        }
        .normalized()
    }
}

/// Resolve the Emberbox config directory.
fn dirs_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        Path::new(&home).join(".emberbox")
    } else if let Ok(home) = std::env::var("USERPROFILE") {
        Path::new(&home).join(".emberbox")
    } else {
        PathBuf::from(".emberbox")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(letter: char) -> DriveId {
        DriveId::from_letter(letter).unwrap()
    }

    #[test]
    fn default_config_is_permissive() {
        let policy = HostPolicy::with_config(HostPolicyConfig::default());
        assert!(policy.allow_mount(Path::new("/anything")).is_allowed());
        assert!(
            policy
                .allow_write(Path::new("C:\\FILE.TXT"), drive('C'))
                .is_allowed()
        );
        assert!(policy.allow_name(".DS_Store").is_allowed());
        assert!(!policy.has_policy_file());
    }

    #[test]
    fn refused_mount_roots_cover_subpaths() {
        let config = HostPolicyConfig {
            refused_mount_roots: vec![PathBuf::from("/System")],
            ..Default::default()
        };
        let policy = HostPolicy::with_config(config);

        assert!(!policy.allow_mount(Path::new("/System")).is_allowed());
        assert!(!policy.allow_mount(Path::new("/System/Library")).is_allowed());
        assert!(policy.allow_mount(Path::new("/Users/games")).is_allowed());
    }

    #[test]
    fn read_only_drive_rejects_all_writes() {
        let config = HostPolicyConfig {
            read_only_drives: [drive('E')].into_iter().collect(),
            ..Default::default()
        };
        let policy = HostPolicy::with_config(config);

        assert!(!policy.allow_write(Path::new("E:\\ANY.TXT"), drive('E')).is_allowed());
        assert!(policy.allow_write(Path::new("C:\\ANY.TXT"), drive('C')).is_allowed());
    }

    #[test]
    fn write_protection_is_case_insensitive() {
        let config = HostPolicyConfig {
            write_protected: ["C:\\Game\\Save.dat".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let policy = HostPolicy::with_config(config);

        assert!(
            !policy
                .allow_write(Path::new("C:\\GAME\\SAVE.DAT"), drive('C'))
                .is_allowed()
        );
        assert!(
            !policy
                .allow_write(Path::new("c:\\game\\save.dat"), drive('C'))
                .is_allowed()
        );
        assert!(
            policy
                .allow_write(Path::new("C:\\GAME\\OTHER.DAT"), drive('C'))
                .is_allowed()
        );
    }

    #[test]
    fn hidden_names_are_case_insensitive() {
        let config = HostPolicyConfig {
            hidden_names: [".ds_store".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let policy = HostPolicy::with_config(config);

        assert!(!policy.allow_name(".DS_Store").is_allowed());
        assert!(!policy.allow_name(".ds_store").is_allowed());
        assert!(policy.allow_name("GAME.EXE").is_allowed());
    }

    #[test]
    fn parse_policy_toml() {
        let toml_str = r#"
[policy]
refused-mount-roots = ["/System", "/Library"]
read-only-drives = ["E", "f"]
write-protected = ["C:\\GAME\\DATA.PAK"]
hidden-names = [".DS_Store", "Thumbs.db"]
"#;
        let file: PolicyFile = toml::from_str(toml_str).unwrap();
        let config = file.into_config();

        assert_eq!(config.refused_mount_roots.len(), 2);
        assert!(config.read_only_drives.contains(&drive('E')));
        assert!(config.read_only_drives.contains(&drive('F')));
        assert!(config.write_protected.contains("C:\\GAME\\DATA.PAK"));
        assert!(config.hidden_names.contains("THUMBS.DB"));
    }

    #[test]
    fn invalid_read_only_drive_is_skipped() {
        let toml_str = r#"
[policy]
read-only-drives = ["E", "not-a-drive"]
"#;
        let file: PolicyFile = toml::from_str(toml_str).unwrap();
        let config = file.into_config();
        assert_eq!(config.read_only_drives.len(), 1);
    }

    #[test]
    fn load_from_missing_file_is_permissive() {
        let dir = tempfile::tempdir().unwrap();
        let policy = HostPolicy::load_from(dir.path().join("nonexistent.toml"));
        assert!(!policy.has_policy_file());
        assert!(policy.allow_mount(Path::new("/anything")).is_allowed());
    }

    #[test]
    fn load_from_malformed_file_falls_back_permissive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(&path, "this is not valid toml {{{{").unwrap();

        let policy = HostPolicy::load_from(path);
        assert!(policy.has_policy_file());
        assert!(policy.allow_name(".DS_Store").is_allowed());
    }

    #[test]
    fn load_from_unreadable_path_falls_back_permissive() {
        // Point at a directory instead of a file — read_to_string will fail.
        let dir = tempfile::tempdir().unwrap();
        let policy = HostPolicy::load_from(dir.path().to_path_buf());
        assert!(policy.allow_mount(Path::new("/anything")).is_allowed());
    }

    #[test]
    fn load_from_well_formed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.toml");
        std::fs::write(
            &path,
            r#"
[policy]
hidden-names = ["Icon?"]
write-protected = ["C:\\SAVES\\SLOT1.SAV"]
"#,
        )
        .unwrap();

        let policy = HostPolicy::load_from(path);
        assert!(policy.has_policy_file());
        assert!(!policy.allow_name("ICON?").is_allowed());
        assert!(
            !policy
                .allow_write(Path::new("C:\\saves\\slot1.sav"), drive('C'))
                .is_allowed()
        );
    }

    #[test]
    fn empty_policy_section_is_permissive() {
        let file: PolicyFile = toml::from_str("[policy]\n").unwrap();
        let config = file.into_config();
        assert!(config.refused_mount_roots.is_empty());
        assert!(config.write_protected.is_empty());
        assert!(config.hidden_names.is_empty());
    }
}
