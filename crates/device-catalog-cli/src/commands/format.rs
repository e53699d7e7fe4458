use device_catalog::DeviceEntity;

const MAX_NAME_WIDTH: usize = 40;
const MAX_COLOR_WIDTH: usize = 16;
const MISSING: &str = "-";

pub fn print_device_table(devices: &[DeviceEntity]) {
    for line in device_table(devices) {
        println!("{line}");
    }
}

fn device_table(devices: &[DeviceEntity]) -> Vec<String> {
    if devices.is_empty() {
        return Vec::new();
    }

    let name_width = column_width(devices.iter().map(|d| d.name.as_str()), MAX_NAME_WIDTH);
    let color_width = column_width(
        devices.iter().map(|d| d.color.as_deref().unwrap_or(MISSING)),
        MAX_COLOR_WIDTH,
    );
    let capacity_width = column_width(
        devices.iter().map(|d| d.capacity.as_deref().unwrap_or(MISSING)),
        usize::MAX,
    );

    devices
        .iter()
        .map(|device| {
            let id = device
                .id
                .map(|id| id.to_string())
                .unwrap_or_else(|| MISSING.to_owned());
            let name = truncate(&device.name, name_width);
            let color = truncate(device.color.as_deref().unwrap_or(MISSING), color_width);
            let capacity = device.capacity.as_deref().unwrap_or(MISSING);

            format!(
                "{:>4}  {:<name_width$}  {:<color_width$}  {:<capacity_width$}  {}",
                id, name, color, capacity, device.price,
            )
            .trim_end()
            .to_owned()
        })
        .collect()
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, max: usize) -> usize {
    values.map(|v| v.chars().count()).max().unwrap_or(0).min(max)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_owned()
    } else {
        let truncated: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{truncated}…")
    }
}
