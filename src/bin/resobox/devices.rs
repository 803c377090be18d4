//! Device listing and selection by index.

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::{
    traits::{DeviceTrait, HostTrait},
    Device, Host,
};

/// What the device list shows for one device.
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
    pub max_input_channels: u16,
    pub max_output_channels: u16,
    pub default_sample_rate: Option<u32>,
}

fn describe(index: usize, device: &Device) -> DeviceInfo {
    let max_input_channels = device
        .supported_input_configs()
        .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
        .unwrap_or(0);
    let max_output_channels = device
        .supported_output_configs()
        .map(|configs| configs.map(|c| c.channels()).max().unwrap_or(0))
        .unwrap_or(0);
    let default_sample_rate = device
        .default_output_config()
        .or_else(|_| device.default_input_config())
        .map(|c| c.sample_rate().0)
        .ok();

    DeviceInfo {
        index,
        name: device.name().unwrap_or_else(|_| "<unnamed>".into()),
        max_input_channels,
        max_output_channels,
        default_sample_rate,
    }
}

/// Every device of the host, in enumeration order.
pub fn list(host: &Host) -> EyreResult<Vec<DeviceInfo>> {
    let devices = host.devices().wrap_err("failed to enumerate audio devices")?;
    Ok(devices
        .enumerate()
        .map(|(index, device)| describe(index, &device))
        .collect())
}

pub fn print_devices() -> EyreResult<()> {
    let host = cpal::default_host();
    println!("Host: {}", host.id().name());
    println!("{:>3}  {:<40} {:>4} {:>4} {:>8}", "#", "name", "in", "out", "rate");
    for info in list(&host)? {
        println!(
            "{:>3}  {:<40} {:>4} {:>4} {:>8}",
            info.index,
            info.name,
            info.max_input_channels,
            info.max_output_channels,
            info.default_sample_rate
                .map_or_else(|| "-".to_string(), |rate| rate.to_string()),
        );
    }
    Ok(())
}

fn by_index(host: &Host, index: usize) -> EyreResult<Device> {
    host.devices()
        .wrap_err("failed to enumerate audio devices")?
        .nth(index)
        .ok_or_else(|| eyre!("no audio device at index {index} (see --list-devices)"))
}

pub fn input_device(host: &Host, index: Option<usize>) -> EyreResult<Device> {
    match index {
        Some(index) => by_index(host, index),
        None => host
            .default_input_device()
            .ok_or_else(|| eyre!("no default input device available")),
    }
}

pub fn output_device(host: &Host, index: Option<usize>) -> EyreResult<Device> {
    match index {
        Some(index) => by_index(host, index),
        None => host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available")),
    }
}
