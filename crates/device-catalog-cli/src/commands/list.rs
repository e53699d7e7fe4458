use anyhow::Result;
use device_catalog::DeviceFilter;
use device_catalog_store::DeviceStore;

use super::format;

pub fn run(store: &DeviceStore, capacity: Option<&str>) -> Result<()> {
    let filter = match capacity {
        Some(value) => DeviceFilter::CapacityEquals(value.to_owned()),
        None => DeviceFilter::All,
    };

    let devices = store.list(&filter)?;
    format::print_device_table(&devices);
    println!("\n{} devices", devices.len());

    Ok(())
}
