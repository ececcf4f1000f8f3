//! Wi-Fi connection via NetworkManager's D-Bus API, driven by credentials
//! scanned from a `WIFI:` QR code.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use log::info;
use zbus::zvariant::{ObjectPath, OwnedObjectPath, Value};

use crate::classify::wifi::{WifiCredentials, WifiSecurity};

// NM_DEVICE_TYPE_WIFI
const NM_WIFI_DEVICE_TYPE: u32 = 2;

pub async fn connect(credentials: &WifiCredentials) -> Result<()> {
    info!(
        "Connecting to Wi-Fi network {} ({}) via NetworkManager",
        credentials.ssid,
        credentials.security.display_name()
    );

    let connection = zbus::Connection::system()
        .await
        .context("failed to connect to system D-Bus")?;

    let settings = build_connection_settings(credentials);
    let device_path = find_wifi_device(&connection).await?;

    let nm_proxy = zbus::Proxy::new(
        &connection,
        "org.freedesktop.NetworkManager",
        "/org/freedesktop/NetworkManager",
        "org.freedesktop.NetworkManager",
    )
    .await
    .context("failed to create NetworkManager proxy")?;

    // AddAndActivateConnection(settings, device, specific_object); "/" means
    // no specific access point.
    let no_specific_object =
        ObjectPath::try_from("/").map_err(|err| anyhow!("invalid object path: {err}"))?;

    let result: std::result::Result<(OwnedObjectPath, OwnedObjectPath), zbus::Error> = nm_proxy
        .call(
            "AddAndActivateConnection",
            &(settings, &device_path, &no_specific_object),
        )
        .await;

    match result {
        Ok((connection_path, _active_path)) => {
            info!(
                "Wi-Fi connection {} activated for {}",
                connection_path, credentials.ssid
            );
            Ok(())
        }
        Err(err) => Err(anyhow!(
            "failed to connect to {}: {err}",
            credentials.ssid
        )),
    }
}

fn build_connection_settings<'a>(
    credentials: &'a WifiCredentials,
) -> HashMap<&'a str, HashMap<&'a str, Value<'a>>> {
    let mut settings: HashMap<&str, HashMap<&str, Value>> = HashMap::new();

    let mut connection: HashMap<&str, Value> = HashMap::new();
    connection.insert("type", Value::new("802-11-wireless"));
    connection.insert("id", Value::new(credentials.ssid.as_str()));
    connection.insert("uuid", Value::new(uuid::Uuid::new_v4().to_string()));
    settings.insert("connection", connection);

    let mut wireless: HashMap<&str, Value> = HashMap::new();
    // SSID goes over the wire as bytes
    wireless.insert("ssid", Value::new(credentials.ssid.as_bytes().to_vec()));
    wireless.insert("mode", Value::new("infrastructure"));
    if credentials.hidden {
        wireless.insert("hidden", Value::new(true));
    }
    settings.insert("802-11-wireless", wireless);

    let key_mgmt = match credentials.security {
        WifiSecurity::Open => None,
        // WEP uses "none" for key-mgmt and sets wep keys instead of a psk
        WifiSecurity::Wep => Some("none"),
        WifiSecurity::Wpa | WifiSecurity::Wpa2 => Some("wpa-psk"),
        WifiSecurity::Wpa3 => Some("sae"),
    };

    if let Some(km) = key_mgmt {
        let mut wireless_security: HashMap<&str, Value> = HashMap::new();
        wireless_security.insert("key-mgmt", Value::new(km));
        wireless_security.insert("auth-alg", Value::new("open"));

        if let Some(password) = credentials.password.as_deref() {
            if km == "none" {
                wireless_security.insert("wep-key0", Value::new(password));
                // 1 = passphrase
                wireless_security.insert("wep-key-type", Value::new(1u32));
            } else {
                wireless_security.insert("psk", Value::new(password));
            }
        }

        settings.insert("802-11-wireless-security", wireless_security);

        if let Some(wireless) = settings.get_mut("802-11-wireless") {
            wireless.insert("security", Value::new("802-11-wireless-security"));
        }
    }

    let mut ipv4: HashMap<&str, Value> = HashMap::new();
    ipv4.insert("method", Value::new("auto"));
    settings.insert("ipv4", ipv4);

    let mut ipv6: HashMap<&str, Value> = HashMap::new();
    ipv6.insert("method", Value::new("auto"));
    settings.insert("ipv6", ipv6);

    settings
}

async fn find_wifi_device(connection: &zbus::Connection) -> Result<OwnedObjectPath> {
    let nm_proxy = zbus::Proxy::new(
        connection,
        "org.freedesktop.NetworkManager",
        "/org/freedesktop/NetworkManager",
        "org.freedesktop.NetworkManager",
    )
    .await
    .context("failed to create NetworkManager proxy")?;

    let devices: Vec<OwnedObjectPath> = nm_proxy
        .call("GetDevices", &())
        .await
        .context("failed to list network devices")?;

    for device_path in devices {
        let device_proxy = zbus::Proxy::new(
            connection,
            "org.freedesktop.NetworkManager",
            device_path.as_str(),
            "org.freedesktop.NetworkManager.Device",
        )
        .await
        .context("failed to create device proxy")?;

        let device_type: u32 = device_proxy.get_property("DeviceType").await.unwrap_or(0);
        if device_type == NM_WIFI_DEVICE_TYPE {
            info!("Found Wi-Fi device {device_path}");
            return Ok(device_path);
        }
    }

    bail!("no Wi-Fi device found")
}
