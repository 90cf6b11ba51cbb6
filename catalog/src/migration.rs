use std::fmt;
use std::path::Path;
use std::path::PathBuf;

use semver::Version;

/// One catalog entry: the release it targets plus whatever artifacts its
/// directory carries. Read-only once discovered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub version: Version,
    pub dir: PathBuf,
    pub artifacts: Artifacts,
}

impl Migration {
    /// True when the entry does any work, as opposed to a bare version marker.
    pub fn is_real(&self) -> bool {
        !self.artifacts.is_empty()
    }
}

/// Optional artifacts of a single migration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    /// Structural rewrite applied to source files.
    pub code_transform: Option<PathBuf>,
    /// Structural rewrite applied to configuration files.
    pub config_transform: Option<PathBuf>,
    pub script: Option<PlatformScript>,
}

impl Artifacts {
    pub fn is_empty(&self) -> bool {
        self.code_transform.is_none() && self.config_transform.is_none() && self.script.is_none()
    }

    /// Artifact kinds present, in execution-launch order.
    pub fn kinds(&self) -> Vec<ArtifactKind> {
        let mut kinds = Vec::with_capacity(3);
        if self.code_transform.is_some() {
            kinds.push(ArtifactKind::CodeTransform);
        }
        if self.config_transform.is_some() {
            kinds.push(ArtifactKind::ConfigTransform);
        }
        if self.script.is_some() {
            kinds.push(ArtifactKind::Script);
        }
        kinds
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    CodeTransform,
    ConfigTransform,
    Script,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodeTransform => "code transform",
            Self::ConfigTransform => "config transform",
            Self::Script => "script",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform script shipped with a migration. Either variant may be absent,
/// never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformScript {
    Posix(PathBuf),
    Windows(PathBuf),
    Both { posix: PathBuf, windows: PathBuf },
}

impl PlatformScript {
    /// Build from the two optional variants; `None` when neither exists.
    pub fn from_parts(posix: Option<PathBuf>, windows: Option<PathBuf>) -> Option<Self> {
        match (posix, windows) {
            (Some(posix), Some(windows)) => Some(Self::Both { posix, windows }),
            (Some(posix), None) => Some(Self::Posix(posix)),
            (None, Some(windows)) => Some(Self::Windows(windows)),
            (None, None) => None,
        }
    }

    pub fn posix(&self) -> Option<&Path> {
        match self {
            Self::Posix(posix) | Self::Both { posix, .. } => Some(posix),
            Self::Windows(_) => None,
        }
    }

    pub fn windows(&self) -> Option<&Path> {
        match self {
            Self::Windows(windows) | Self::Both { windows, .. } => Some(windows),
            Self::Posix(_) => None,
        }
    }
}
