//! Tool-provider script validation.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// The kinds of server scripts the gateway knows how to launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Python,
    Node,
}

impl ScriptKind {
    /// Program used to run a script of this kind.
    pub fn interpreter(self) -> &'static str {
        match self {
            Self::Python => "python3",
            Self::Node => "node",
        }
    }

    fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "py" => Some(Self::Python),
            "js" => Some(Self::Node),
            _ => None,
        }
    }
}

/// A validated path to a tool-provider script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerScript {
    path: PathBuf,
    kind: ScriptKind,
}

impl ServerScript {
    /// Classify a script by its extension.
    ///
    /// Fails with [`Error::UnsupportedServerType`] for anything other than
    /// `.py` or `.js`. The file itself is not touched.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let kind = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(ScriptKind::from_extension)
            .ok_or_else(|| Error::UnsupportedServerType(path.to_path_buf()))?;

        Ok(Self {
            path: path.to_path_buf(),
            kind,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }

    pub fn interpreter(&self) -> &'static str {
        self.kind.interpreter()
    }
}

impl fmt::Display for ServerScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.interpreter(), self.path.display())
    }
}
