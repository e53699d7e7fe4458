use rusqlite_migration::{M, Migrations};

pub fn migrations() -> Migrations<'static> {
    Migrations::new(vec![M::up(
        "CREATE TABLE devices (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            name            TEXT NOT NULL,
            color           TEXT,
            capacity        TEXT,
            price           TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE UNIQUE INDEX idx_devices_name ON devices(name);
        CREATE INDEX idx_devices_capacity ON devices(capacity);",
    )])
}
