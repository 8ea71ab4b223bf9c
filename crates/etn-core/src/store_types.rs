use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Document store backend types
///
/// Defined in core because configuration selects it and the health report shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Local,
    Firestore,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "local" => Ok(StoreBackend::Local),
            "firestore" => Ok(StoreBackend::Firestore),
            _ => Err(anyhow::anyhow!("Invalid store backend: {}", s)),
        }
    }
}

impl Display for StoreBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Local => write!(f, "local"),
            StoreBackend::Firestore => write!(f, "firestore"),
        }
    }
}
