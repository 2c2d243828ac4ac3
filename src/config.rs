// ABOUTME: Version, banner, and permission configuration for the interpreter host

pub const VERSION: &str = "0.3.0";
pub const WELCOME_MESSAGE: &str = "Tern v0.3.0";
pub const WELCOME_SUBTITLE: &str = "A tree-walking interpreter for the Tern scripting language";
pub const WELCOME_FOOTER: &str = "Type 'exit' or press Ctrl-D to leave the REPL.";

// ============================================================================
// Capability Permissions
// ============================================================================

/// Which host capabilities a program may use, built from the `run` command's
/// permission flags. Only `input` is enforced by the core built-ins today;
/// the other flags are parsed and reserved for host extensions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissions {
    pub input: bool,
    pub network: bool,
    pub read: bool,
    pub write: bool,
}

impl Permissions {
    /// Permissions for an interactive REPL session: stdin is already the
    /// user's, so `input` is granted.
    pub fn interactive() -> Self {
        Permissions {
            input: true,
            ..Permissions::default()
        }
    }

    /// Applies one permission flag. Returns false for anything that is not a
    /// recognized permission flag, leaving it for the caller to treat as the
    /// script path or a program argument.
    pub fn apply_flag(&mut self, flag: &str) -> bool {
        match flag {
            "--allow-input" => self.input = true,
            "--allow-network" => self.network = true,
            "--allow-read" => self.read = true,
            "--allow-write" => self.write = true,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_denies_everything() {
        let perms = Permissions::default();
        assert!(!perms.input);
        assert!(!perms.network);
        assert!(!perms.read);
        assert!(!perms.write);
    }

    #[test]
    fn test_apply_known_flags() {
        let mut perms = Permissions::default();
        assert!(perms.apply_flag("--allow-input"));
        assert!(perms.apply_flag("--allow-write"));
        assert!(perms.input);
        assert!(perms.write);
        assert!(!perms.network);
    }

    #[test]
    fn test_unknown_flag_is_not_consumed() {
        let mut perms = Permissions::default();
        assert!(!perms.apply_flag("--allow-everything"));
        assert!(!perms.apply_flag("script.tn"));
    }

    #[test]
    fn test_interactive_grants_input() {
        assert!(Permissions::interactive().input);
    }
}
