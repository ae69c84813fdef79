//! Scripted pools for strategy and listener tests.

use std::sync::{Arc, Mutex};

use fastprov_core::{Cloud, Label, ManagedPool, PlannedLaunch, PoolError, PoolResult};

/// Shared, ordered record of calls across several pools.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }

    /// Pool names in the order their eligibility was checked.
    pub fn can_order(&self) -> Vec<String> {
        self.entries()
            .iter()
            .filter_map(|e| e.strip_prefix("can:").map(str::to_string))
            .collect()
    }
}

#[derive(Clone, Copy)]
pub enum Grant {
    /// Grant every requested slot.
    All,
    /// Grant at most this many slots.
    Fixed(u32),
    /// Fail the provisioning call.
    Fault,
    /// Panic inside the provisioning call.
    Panic,
}

pub struct TestPool {
    name: String,
    eligible: bool,
    eligibility_panics: bool,
    grant: Grant,
    log: CallLog,
    requests: Mutex<Vec<u32>>,
}

impl TestPool {
    pub fn new(name: &str, log: &CallLog, grant: Grant) -> Self {
        Self {
            name: name.to_string(),
            eligible: true,
            eligibility_panics: false,
            grant,
            log: log.clone(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn ineligible(mut self) -> Self {
        self.eligible = false;
        self
    }

    pub fn panics_on_eligibility(mut self) -> Self {
        self.eligibility_panics = true;
        self
    }

    pub fn requests(&self) -> Vec<u32> {
        self.requests.lock().unwrap().clone()
    }
}

impl Cloud for TestPool {
    fn name(&self) -> &str {
        &self.name
    }

    fn as_managed(&self) -> Option<&dyn ManagedPool> {
        Some(self)
    }
}

impl ManagedPool for TestPool {
    fn can_provision(&self, _label: Option<&Label>) -> bool {
        self.log.push(format!("can:{}", self.name));
        if self.eligibility_panics {
            panic!("{} lost its label index", self.name);
        }
        self.eligible
    }

    fn provision(&self, label: Option<&Label>, count: u32) -> PoolResult<Vec<PlannedLaunch>> {
        self.log.push(format!("provision:{}:{}", self.name, count));
        self.requests.lock().unwrap().push(count);
        let granted = match self.grant {
            Grant::All => count,
            Grant::Fixed(n) => n.min(count),
            Grant::Fault => {
                return Err(PoolError::Backend {
                    pool: self.name.clone(),
                    message: "connection refused".to_string(),
                });
            }
            Grant::Panic => panic!("{} backend crashed", self.name),
        };
        Ok((0..granted)
            .map(|_| PlannedLaunch::new(self.name.clone(), label.cloned()).0)
            .collect())
    }
}

/// A cloud kind the strategy must ignore.
pub struct Unmanaged;

impl Cloud for Unmanaged {
    fn name(&self) -> &str {
        "permanent-agents"
    }
}
