//! The `locate` flow: startup self-lookup, optional manual search, map sync.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};

use super::history::open_history;
use crate::config::Config;
use crate::geoip::{GeoLocator, GeoRecord, IpInfoClient};
use crate::history::{HistoryEntry, HistoryStore};
use crate::map::{CommandQueue, MapCommand, MapSynchronizer};
use crate::session::{Applied, Session};
use crate::storage::Store;

/// What a `locate` run ended with.
#[derive(Debug, Clone, Default)]
pub struct LocateReport {
    /// Latest successfully applied record.
    pub current: Option<Arc<GeoRecord>>,
    /// Message of the last failed lookup, if the session ended in error.
    pub error: Option<String>,
    /// Every command sent to the map surface, in order.
    pub map_commands: Vec<MapCommand>,
    pub history_len: usize,
    pub persistence_warning: Option<String>,
}

/// Runs a `locate` against the configured provider and history directory.
///
/// # Errors
///
/// Fails when the HTTP client cannot be built or `address` is not a valid
/// IPv4/IPv6 address. Lookup failures are reported in [`LocateReport::error`].
pub async fn run_locate(config: &Config, address: Option<&str>) -> Result<LocateReport> {
    let locator =
        IpInfoClient::from_config(config).context("Failed to initialize geolocation client")?;
    info!(
        "Using provider {} with history in {}",
        config.provider_url,
        config.history_dir.display()
    );
    locate_with(locator, open_history(config), address).await
}

/// Same as [`run_locate`] with an explicit locator and history store.
///
/// # Errors
///
/// Fails when `address` is given and is not an accepted address.
pub async fn locate_with<L, S>(
    locator: L,
    history: HistoryStore<S>,
    address: Option<&str>,
) -> Result<LocateReport>
where
    L: GeoLocator,
    S: Store<Vec<HistoryEntry>>,
{
    let mut session = Session::new(locator, history);
    let mut map = MapSynchronizer::new(CommandQueue::new());

    let applied = session.start().await;
    sync_map(&mut map, &applied);

    if let Some(address) = address {
        let applied = session
            .search(address)
            .await
            .with_context(|| format!("Cannot look up {address:?}"))?;
        sync_map(&mut map, &applied);
    }

    if let Some(warning) = session.persistence_warning() {
        warn!("History was not saved: {warning}");
    }

    Ok(LocateReport {
        current: session.current().cloned(),
        error: session.error().map(str::to_string),
        map_commands: map.into_surface().drain(),
        history_len: session.history().len(),
        persistence_warning: session.persistence_warning().map(str::to_string),
    })
}

fn sync_map(map: &mut MapSynchronizer<CommandQueue>, applied: &Applied) {
    if let Some(record) = applied.record() {
        map.sync(record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::LookupError;
    use crate::geoip::LookupTarget;
    use crate::storage::MemoryStore;

    struct FixedLocator;

    impl GeoLocator for FixedLocator {
        async fn locate(&self, target: &LookupTarget) -> Result<GeoRecord, LookupError> {
            match target {
                LookupTarget::SelfAddress => Ok(GeoRecord {
                    ip: Some("203.0.113.7".to_string()),
                    loc: Some("10.0,20.0".to_string()),
                    ..Default::default()
                }),
                LookupTarget::Address(ip) if ip == "8.8.8.8" => Ok(GeoRecord {
                    ip: Some(ip.clone()),
                    city: Some("Mountain View".to_string()),
                    loc: Some("37.386,-122.0838".to_string()),
                    ..Default::default()
                }),
                LookupTarget::Address(ip) => {
                    Err(LookupError::Unavailable(format!("no answer for {ip}")))
                }
            }
        }
    }

    #[tokio::test]
    async fn test_locate_self_only() {
        let history = HistoryStore::open(MemoryStore::new());
        let report = locate_with(FixedLocator, history, None).await.unwrap();
        let current = report.current.unwrap();
        assert_eq!(current.ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(report.history_len, 0);
        assert_eq!(report.map_commands.len(), 5);
        assert!(report.error.is_none());
    }

    #[tokio::test]
    async fn test_locate_with_search_records_history() {
        let store = Arc::new(MemoryStore::<Vec<HistoryEntry>>::new());
        let history = HistoryStore::open(Arc::clone(&store));
        let report = locate_with(FixedLocator, history, Some("8.8.8.8"))
            .await
            .unwrap();
        assert_eq!(report.current.unwrap().ip.as_deref(), Some("8.8.8.8"));
        assert_eq!(report.history_len, 1);
        // self-lookup: 5 commands; search: remove old overlay + 5
        assert_eq!(report.map_commands.len(), 11);
        assert!(store.raw().unwrap().contains("8.8.8.8"));
    }

    #[tokio::test]
    async fn test_locate_rejects_invalid_address() {
        let history = HistoryStore::open(MemoryStore::new());
        let err = locate_with(FixedLocator, history, Some("999.1.1.1"))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("invalid address"));
    }

    #[tokio::test]
    async fn test_locate_failure_keeps_self_record() {
        let history = HistoryStore::open(MemoryStore::new());
        let report = locate_with(FixedLocator, history, Some("1.2.3.4"))
            .await
            .unwrap();
        assert_eq!(report.current.unwrap().ip.as_deref(), Some("203.0.113.7"));
        assert_eq!(report.error.as_deref(), Some("lookup unavailable: no answer for 1.2.3.4"));
        assert_eq!(report.history_len, 0);
    }
}
