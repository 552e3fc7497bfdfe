use crate::domain::validate::is_local_identifier;

/// Installed and locked identifiers as read at the start of one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddonSnapshot {
    pub installed: Vec<String>,
    pub locked: Vec<String>,
}

impl AddonSnapshot {
    pub fn new(installed: Vec<String>, locked: Vec<String>) -> Self {
        Self { installed, locked }
    }

    pub fn is_installed(&self, identifier: &str) -> bool {
        self.installed.iter().any(|p| p == identifier)
    }

    /// Locked explicitly, or implicitly because it is a local checkout.
    pub fn is_locked(&self, identifier: &str) -> bool {
        is_local_identifier(identifier) || self.locked.iter().any(|p| p == identifier)
    }

    /// Locked list extended with every installed local addon.
    pub fn effective_locked(&self) -> Vec<String> {
        let mut locked = self.locked.clone();
        for pkg in &self.installed {
            if is_local_identifier(pkg) && !locked.contains(pkg) {
                locked.push(pkg.clone());
            }
        }
        locked
    }
}
