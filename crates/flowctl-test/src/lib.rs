//! Shared test doubles for the flowctl workspace.
//!
//! [`RecordingInstaller`] stands in for the southbound rule installer and
//! records every call so tests can assert on exactly which rules were
//! pushed and retracted. [`StaticHostDirectory`] serves a fixed host map.

use async_trait::async_trait;
use flowctl_flow::{
    FlowRule, Host, HostDirectory, InstallError, InstallResult, OwnerTag, RuleInstaller,
};
use flowctl_types::HostId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// One recorded installer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallerCall {
    Install(FlowRule),
    Retract(FlowRule),
    RetractAllOwnedBy(OwnerTag),
}

/// Rule installer double that records calls and can be scripted to fail.
///
/// Accepted rules are tracked as the set of "live" rules a real device
/// would hold, so tests can assert on the post-state as well as the call
/// sequence.
#[derive(Debug)]
pub struct RecordingInstaller {
    live: Mutex<Vec<FlowRule>>,
    calls: Mutex<Vec<InstallerCall>>,
    // usize::MAX means "never fail"
    fail_after: AtomicUsize,
}

impl Default for RecordingInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingInstaller {
    /// Creates an installer that accepts everything.
    pub fn new() -> Self {
        Self {
            live: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            fail_after: AtomicUsize::new(usize::MAX),
        }
    }

    /// Makes every install call fail from now on.
    pub fn fail_installs(&self) {
        self.fail_after.store(0, Ordering::SeqCst);
    }

    /// Accepts the next `n` installs, then fails every one after.
    pub fn fail_installs_after(&self, n: usize) {
        self.fail_after.store(n, Ordering::SeqCst);
    }

    /// Accepts all installs again.
    pub fn accept_installs(&self) {
        self.fail_after.store(usize::MAX, Ordering::SeqCst);
    }

    /// Snapshot of the rules currently held by the fake devices.
    pub fn live_rules(&self) -> Vec<FlowRule> {
        self.live.lock().unwrap().clone()
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<InstallerCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of successful installs.
    pub fn install_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, InstallerCall::Install(_)))
            .count()
    }

    /// Number of retract calls (single-rule only).
    pub fn retract_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, InstallerCall::Retract(_)))
            .count()
    }

    /// Owner tags passed to `retract_all_owned_by`, in order.
    pub fn owner_retractions(&self) -> Vec<OwnerTag> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                InstallerCall::RetractAllOwnedBy(tag) => Some(tag.clone()),
                _ => None,
            })
            .collect()
    }

    fn take_install_budget(&self) -> bool {
        loop {
            let budget = self.fail_after.load(Ordering::SeqCst);
            if budget == usize::MAX {
                return true;
            }
            if budget == 0 {
                return false;
            }
            if self
                .fail_after
                .compare_exchange(budget, budget - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
            {
                return true;
            }
        }
    }
}

#[async_trait]
impl RuleInstaller for RecordingInstaller {
    async fn install(&self, rule: &FlowRule) -> InstallResult<()> {
        if !self.take_install_budget() {
            return Err(InstallError::Rejected {
                device: rule.device.to_string(),
                reason: "scripted failure".to_string(),
            });
        }
        self.live.lock().unwrap().push(rule.clone());
        self.calls
            .lock()
            .unwrap()
            .push(InstallerCall::Install(rule.clone()));
        Ok(())
    }

    async fn retract(&self, rule: &FlowRule) -> InstallResult<()> {
        self.live.lock().unwrap().retain(|r| r != rule);
        self.calls
            .lock()
            .unwrap()
            .push(InstallerCall::Retract(rule.clone()));
        Ok(())
    }

    async fn retract_all_owned_by(&self, owner: &OwnerTag) -> InstallResult<()> {
        self.live.lock().unwrap().retain(|r| &r.owner != owner);
        self.calls
            .lock()
            .unwrap()
            .push(InstallerCall::RetractAllOwnedBy(owner.clone()));
        Ok(())
    }
}

/// Host directory double serving a fixed set of hosts.
#[derive(Debug, Default)]
pub struct StaticHostDirectory {
    hosts: HashMap<HostId, Host>,
}

impl StaticHostDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self {
            hosts: HashMap::new(),
        }
    }

    /// Adds a host, replacing any previous entry with the same id.
    pub fn with_host(mut self, host: Host) -> Self {
        self.hosts.insert(host.id.clone(), host);
        self
    }
}

#[async_trait]
impl HostDirectory for StaticHostDirectory {
    async fn lookup_host(&self, id: &HostId) -> Option<Host> {
        self.hosts.get(id).cloned()
    }
}
