//! Bluetooth LE GATT transport (§6.4), feature `bluetooth`.
//!
//! Discovers and writes to the non-standard GATT characteristic the device
//! exposes, and forwards value-notifications into an mpsc channel the
//! driving loop polls independently. Grounded on `sirius-dive`'s
//! `ble.rs` (scan/connect/persistent-notification-task shape) using the
//! `btleplug` crate the teacher's own `Cargo.toml` declares.

use std::time::Duration;

use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use log::{debug, warn};
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::interface::Transport;

/// GATT service UUID (§6.4).
pub const SERVICE_UUID: Uuid = Uuid::from_u128(0x5B774111_D526_7B9A_4AE7_E59D015D79ED);
/// GATT characteristic UUID (§6.4), used for both writes and notifications.
pub const CHARACTERISTIC_UUID: Uuid = Uuid::from_u128(0x5B774321_D526_7B9A_4AE7_E59D015D79ED);

#[derive(Debug, Error)]
pub enum BleError {
    #[error("no Bluetooth adapter available")]
    NoAdapter,
    #[error("no Viiiiva device found")]
    DeviceNotFound,
    #[error("GATT characteristic not found on device")]
    CharacteristicNotFound,
    #[error(transparent)]
    Btleplug(#[from] btleplug::Error),
}

/// A device discovered while scanning.
pub struct DiscoveredDevice {
    pub peripheral: Peripheral,
    pub name: Option<String>,
}

/// Returns the first available Bluetooth adapter.
pub async fn default_adapter() -> Result<Adapter, BleError> {
    let manager = Manager::new().await?;
    let adapters = manager.adapters().await?;
    adapters.into_iter().next().ok_or(BleError::NoAdapter)
}

/// Scans for devices advertising the Viiiiva GATT service.
pub async fn scan(adapter: &Adapter, timeout: Duration) -> Result<Vec<DiscoveredDevice>, BleError> {
    adapter.start_scan(ScanFilter { services: vec![SERVICE_UUID] }).await?;
    tokio::time::sleep(timeout).await;
    adapter.stop_scan().await.ok();

    let mut devices = Vec::new();
    for peripheral in adapter.peripherals().await? {
        let services = peripheral.services();
        if services.iter().any(|s| s.uuid == SERVICE_UUID) {
            let name = peripheral.properties().await?.and_then(|p| p.local_name);
            devices.push(DiscoveredDevice { peripheral, name });
        }
    }
    Ok(devices)
}

/// An active connection, wired as a [`Transport`] plus a standalone
/// notification channel the driving loop feeds to
/// [`crate::manager::ProtocolManager::notify_value`].
pub struct BleTransport {
    peripheral: Peripheral,
    characteristic: Characteristic,
    runtime: tokio::runtime::Handle,
}

impl BleTransport {
    /// Connects to `peripheral`, subscribes to notifications, and spawns a
    /// background task forwarding them into the returned receiver.
    pub async fn connect(peripheral: Peripheral) -> Result<(BleTransport, mpsc::Receiver<Vec<u8>>), BleError> {
        if !peripheral.is_connected().await? {
            peripheral.connect().await?;
        }
        peripheral.discover_services().await?;

        let characteristic = peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == CHARACTERISTIC_UUID)
            .ok_or(BleError::CharacteristicNotFound)?;

        peripheral.subscribe(&characteristic).await?;

        let (tx, rx) = mpsc::channel(64);
        let mut stream = peripheral.notifications().await?;
        let filter_uuid = characteristic.uuid;
        tokio::spawn(async move {
            while let Some(notification) = stream.next().await {
                if notification.uuid != filter_uuid {
                    continue;
                }
                if tx.send(notification.value).await.is_err() {
                    break;
                }
            }
        });

        let runtime = tokio::runtime::Handle::current();
        let transport = BleTransport { peripheral, characteristic, runtime };
        Ok((transport, rx))
    }

    pub async fn disconnect(&self) -> Result<(), BleError> {
        Ok(self.peripheral.disconnect().await?)
    }
}

impl Transport for BleTransport {
    fn write_value(&mut self, bytes: &[u8]) -> i32 {
        let peripheral = self.peripheral.clone();
        let characteristic = self.characteristic.clone();
        let bytes = bytes.to_vec();

        let result = tokio::task::block_in_place(|| {
            self.runtime
                .block_on(async move { peripheral.write(&characteristic, &bytes, WriteType::WithResponse).await })
        });

        match result {
            Ok(()) => 0,
            Err(err) => {
                warn!("BLE write_value failed: {err}");
                -1
            }
        }
    }

    fn start_waiting(&mut self) {
        debug!("start_waiting");
    }

    fn finish_waiting(&mut self) {
        debug!("finish_waiting");
    }
}
