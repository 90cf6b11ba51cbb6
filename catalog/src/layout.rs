use serde::Deserialize;
use serde::Serialize;

/// File names that identify each artifact inside a migration directory.
///
/// Transform entries are candidate lists: the first name that exists wins,
/// so a catalog can ship either TypeScript or compiled JavaScript transforms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogLayout {
    #[serde(default = "default_code_transform")]
    pub code_transform: Vec<String>,

    #[serde(default = "default_config_transform")]
    pub config_transform: Vec<String>,

    #[serde(default = "default_posix_script")]
    pub posix_script: String,

    #[serde(default = "default_windows_script")]
    pub windows_script: String,
}

fn default_code_transform() -> Vec<String> {
    vec!["index.ts".to_string(), "index.js".to_string()]
}
fn default_config_transform() -> Vec<String> {
    vec!["config.ts".to_string(), "config.js".to_string()]
}
fn default_posix_script() -> String {
    "migration.sh".to_string()
}
fn default_windows_script() -> String {
    "migration.ps1".to_string()
}

impl Default for CatalogLayout {
    fn default() -> Self {
        Self {
            code_transform: default_code_transform(),
            config_transform: default_config_transform(),
            posix_script: default_posix_script(),
            windows_script: default_windows_script(),
        }
    }
}
