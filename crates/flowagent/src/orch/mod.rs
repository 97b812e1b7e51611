//! Base Orch trait.

/// Common surface of the agent's orchestration modules.
///
/// The daemon uses this for registration logging and periodic state
/// dumps; the modules' real entry points are their own typed methods
/// (`on_packet`, `add_route`, ...), one per event kind.
pub trait Orch: Send + Sync {
    /// Name of this orch, for logging and debugging.
    fn name(&self) -> &str;

    /// Human-readable state summary lines for debug dumps.
    fn dump_state(&self) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestOrch;

    impl Orch for TestOrch {
        fn name(&self) -> &str {
            "test"
        }
    }

    #[test]
    fn test_defaults() {
        let orch = TestOrch;
        assert_eq!(orch.name(), "test");
        assert!(orch.dump_state().is_empty());
    }
}
