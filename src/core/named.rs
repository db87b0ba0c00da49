//! # Named buses.
//!
//! [`BusRegistry`] hands out one [`Bus`] per name, creating it on first lookup.
//! It is an ordinary value owned by the application: create one, share it
//! (e.g. in an `Arc`) with whoever needs a named bus, and close it on shutdown.
//!
//! ## Rules
//! - Lookup and lazy creation happen under one mutex: concurrent first callers
//!   for the same name all receive the same `Arc<Bus>`.
//! - Different names are independent buses with their own dispatch tasks.
//! - Every bus created here uses the registry's [`BusConfig`].
//!
//! ## Example
//! ```rust
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use std::sync::Arc;
//! use fanbus::{BusConfig, BusRegistry};
//!
//! let buses: BusRegistry<String> = BusRegistry::new(BusConfig::default());
//! let a = buses.get("alpha");
//! assert!(Arc::ptr_eq(&a, &buses.get("alpha")));
//! assert!(!Arc::ptr_eq(&a, &buses.get("beta")));
//! buses.close_all().await.unwrap();
//! # }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::core::{Bus, BusConfig};
use crate::error::BusError;

/// Name under which [`BusRegistry::default_bus`] is stored.
pub const DEFAULT_BUS_NAME: &str = "default";

/// Caller-owned store of named buses.
pub struct BusRegistry<M>
where
    M: Send + Sync + 'static,
{
    cfg: BusConfig,
    buses: Mutex<HashMap<String, Arc<Bus<M>>>>,
}

impl<M> BusRegistry<M>
where
    M: Send + Sync + 'static,
{
    /// Creates an empty registry; buses it creates use `cfg`.
    pub fn new(cfg: BusConfig) -> Self {
        Self {
            cfg,
            buses: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the bus named `name`, creating it on first use.
    ///
    /// # Panics
    /// Creating a bus panics outside of a tokio runtime.
    pub fn get(&self, name: &str) -> Arc<Bus<M>> {
        let mut buses = self.lock();
        if let Some(bus) = buses.get(name) {
            return Arc::clone(bus);
        }
        let bus = Arc::new(Bus::new(self.cfg.clone()));
        buses.insert(name.to_string(), Arc::clone(&bus));
        tracing::debug!(name, "named bus created");
        bus
    }

    /// Returns the registry's unnamed default bus.
    pub fn default_bus(&self) -> Arc<Bus<M>> {
        self.get(DEFAULT_BUS_NAME)
    }

    /// Returns `true` if a bus named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains_key(name)
    }

    /// Returns the sorted list of bus names.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort_unstable();
        names
    }

    /// Removes the bus named `name` from the registry without closing it.
    ///
    /// A later `get(name)` creates a fresh bus.
    pub fn remove(&self, name: &str) -> Option<Arc<Bus<M>>> {
        self.lock().remove(name)
    }

    /// Removes and closes every bus.
    ///
    /// All buses are closed even if one fails; the first error is returned.
    pub async fn close_all(&self) -> Result<(), BusError> {
        let buses: Vec<(String, Arc<Bus<M>>)> = self.lock().drain().collect();

        let mut first_err = None;
        for (name, bus) in buses {
            if let Err(e) = bus.close().await {
                tracing::warn!(name = %name, error = %e, "named bus did not close cleanly");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<Bus<M>>>> {
        self.buses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<M> Default for BusRegistry<M>
where
    M: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_name_same_instance() {
        let reg: BusRegistry<u32> = BusRegistry::default();
        let a1 = reg.get("alpha");
        let a2 = reg.get("alpha");
        let b = reg.get("beta");

        assert!(Arc::ptr_eq(&a1, &a2));
        assert!(!Arc::ptr_eq(&a1, &b));
        assert_eq!(reg.names(), vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[tokio::test]
    async fn test_default_bus_is_singleton() {
        let reg: BusRegistry<u32> = BusRegistry::default();
        assert!(Arc::ptr_eq(&reg.default_bus(), &reg.default_bus()));
        assert!(reg.contains(DEFAULT_BUS_NAME));
    }

    #[tokio::test]
    async fn test_remove_then_get_creates_fresh_bus() {
        let reg: BusRegistry<u32> = BusRegistry::default();
        let first = reg.get("x");
        let removed = reg.remove("x").expect("bus should exist");
        assert!(Arc::ptr_eq(&first, &removed));
        assert!(!reg.contains("x"));

        let second = reg.get("x");
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_close_all_closes_and_empties() {
        let reg: BusRegistry<u32> = BusRegistry::default();
        let a = reg.get("a");
        let b = reg.get("b");

        reg.close_all().await.unwrap();
        assert!(a.is_closed());
        assert!(b.is_closed());
        assert!(reg.names().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_lookup_yields_one_instance() {
        let reg: Arc<BusRegistry<u32>> = Arc::new(BusRegistry::default());
        let mut handles = Vec::new();
        for _ in 0..16 {
            let reg = Arc::clone(&reg);
            handles.push(tokio::spawn(async move { reg.get("shared") }));
        }

        let mut buses = Vec::new();
        for h in handles {
            buses.push(h.await.unwrap());
        }
        assert!(buses.iter().all(|b| Arc::ptr_eq(b, &buses[0])));
    }
}
