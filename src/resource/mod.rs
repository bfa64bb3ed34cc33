/// Configuration for one telemetry resource kind.
///
/// `kind` doubles as the table name and the URL segment; `required_fields`
/// is both the write-validation schema and the column set. Adding a resource
/// is a matter of adding a constant here and mounting it in the router.
#[derive(Debug)]
pub struct Resource {
    pub kind: &'static str,
    pub required_fields: &'static [&'static str],
}

pub static ACCELEROMETER: Resource = Resource {
    kind: "accelerometer",
    required_fields: &["x", "y", "z"],
};

pub static ECU: Resource = Resource {
    kind: "ecu",
    required_fields: &[
        "dwell",
        "map",
        "iat",
        "clt",
        "battery",
        "o2",
        "rpm",
        "advance",
        "tps",
        "loopsPerSecond",
        "freeRAM",
    ],
};

pub static GPS: Resource = Resource {
    kind: "gps",
    required_fields: &["latitude", "longitude", "speed", "heading"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinct_table_names() {
        let kinds = [ACCELEROMETER.kind, ECU.kind, GPS.kind];
        assert_eq!(kinds, ["accelerometer", "ecu", "gps"]);
    }

    #[test]
    fn ecu_carries_full_sensor_set() {
        assert_eq!(ECU.required_fields.len(), 11);
        assert!(ECU.required_fields.contains(&"freeRAM"));
        assert!(ECU.required_fields.contains(&"loopsPerSecond"));
    }
}
