//! Database schema definitions and SQL constants.
//!
//! Instants are stored as Unix seconds, times of day as `HH:MM` text and
//! dates as `YYYY-MM-DD` text.

/// Current schema version for the database.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Message raised by the exclusion triggers; used to recognize the failure.
pub const OVERLAP_CONSTRAINT: &str = "reservation_overlap";

/// SQL statement to create the metadata table.
pub const CREATE_METADATA_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS metadata (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    )";

/// Restaurants with their booking parameters.
pub const CREATE_RESTAURANTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS restaurants (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        api_key TEXT NOT NULL UNIQUE,
        reservation_duration INTEGER NOT NULL CHECK (reservation_duration > 0),
        buffer_time INTEGER NOT NULL DEFAULT 0 CHECK (buffer_time >= 0)
    )";

/// Seating zones.
pub const CREATE_ZONES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS zones (
        id INTEGER PRIMARY KEY,
        restaurant_id INTEGER NOT NULL REFERENCES restaurants(id),
        name TEXT NOT NULL,
        UNIQUE (restaurant_id, name)
    )";

/// Physical tables. Named `dining_tables` to stay clear of the SQL keyword.
pub const CREATE_DINING_TABLES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS dining_tables (
        id INTEGER PRIMARY KEY,
        restaurant_id INTEGER NOT NULL REFERENCES restaurants(id),
        capacity INTEGER NOT NULL CHECK (capacity >= 1),
        zone_id INTEGER REFERENCES zones(id)
    )";

/// Weekly opening intervals; several rows per weekday describe split shifts.
pub const CREATE_WEEKLY_SCHEDULES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS weekly_schedules (
        id INTEGER PRIMARY KEY,
        restaurant_id INTEGER NOT NULL REFERENCES restaurants(id),
        day_of_week INTEGER NOT NULL CHECK (day_of_week BETWEEN 0 AND 6),
        opening_time TEXT NOT NULL,
        closing_time TEXT NOT NULL CHECK (closing_time > opening_time)
    )";

/// Date overrides; a row without times marks the date closed.
pub const CREATE_SCHEDULE_EXCEPTIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS schedule_exceptions (
        id INTEGER PRIMARY KEY,
        restaurant_id INTEGER NOT NULL REFERENCES restaurants(id),
        date TEXT NOT NULL,
        opening_time TEXT,
        closing_time TEXT,
        description TEXT,
        CHECK ((opening_time IS NULL) = (closing_time IS NULL)),
        CHECK (closing_time IS NULL OR closing_time > opening_time)
    )";

/// Client records shared across restaurants.
pub const CREATE_CLIENTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS clients (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        phone TEXT NOT NULL UNIQUE,
        email TEXT UNIQUE,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )";

/// Reservations.
pub const CREATE_RESERVATIONS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS reservations (
        id INTEGER PRIMARY KEY,
        restaurant_id INTEGER NOT NULL REFERENCES restaurants(id),
        table_id INTEGER NOT NULL REFERENCES dining_tables(id),
        client_id INTEGER NOT NULL REFERENCES clients(id),
        start_time INTEGER NOT NULL,
        end_time INTEGER NOT NULL CHECK (end_time > start_time),
        guests INTEGER NOT NULL CHECK (guests >= 1),
        confirmed INTEGER NOT NULL DEFAULT 1,
        notes TEXT,
        created_at INTEGER NOT NULL
    )";

/// Exclusion constraint on insert: no two confirmed reservations on the same
/// table may overlap once each is widened by the restaurant's buffer.
pub const CREATE_OVERLAP_INSERT_TRIGGER: &str = r"
    CREATE TRIGGER IF NOT EXISTS reservations_no_overlap_insert
    BEFORE INSERT ON reservations
    FOR EACH ROW WHEN NEW.confirmed = 1
    BEGIN
        SELECT RAISE(ABORT, 'reservation_overlap')
        WHERE EXISTS (
            SELECT 1 FROM reservations AS existing
            WHERE existing.table_id = NEW.table_id
              AND existing.confirmed = 1
              AND NEW.start_time < existing.end_time
                    + (SELECT buffer_time * 60 FROM restaurants WHERE id = NEW.restaurant_id)
              AND existing.start_time < NEW.end_time
                    + (SELECT buffer_time * 60 FROM restaurants WHERE id = NEW.restaurant_id)
        );
    END";

/// Same exclusion constraint for updates that move or re-confirm a row.
pub const CREATE_OVERLAP_UPDATE_TRIGGER: &str = r"
    CREATE TRIGGER IF NOT EXISTS reservations_no_overlap_update
    BEFORE UPDATE OF table_id, start_time, end_time, confirmed ON reservations
    FOR EACH ROW WHEN NEW.confirmed = 1
    BEGIN
        SELECT RAISE(ABORT, 'reservation_overlap')
        WHERE EXISTS (
            SELECT 1 FROM reservations AS existing
            WHERE existing.table_id = NEW.table_id
              AND existing.id <> NEW.id
              AND existing.confirmed = 1
              AND NEW.start_time < existing.end_time
                    + (SELECT buffer_time * 60 FROM restaurants WHERE id = NEW.restaurant_id)
              AND existing.start_time < NEW.end_time
                    + (SELECT buffer_time * 60 FROM restaurants WHERE id = NEW.restaurant_id)
        );
    END";

/// Speeds up per-table conflict lookups.
pub const CREATE_RESERVATIONS_TABLE_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_reservations_table_time
    ON reservations(table_id, start_time) WHERE confirmed = 1";

/// Speeds up listing a restaurant's reservations by date.
pub const CREATE_RESERVATIONS_RESTAURANT_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_reservations_restaurant_time
    ON reservations(restaurant_id, start_time)";

/// Speeds up capacity-filtered table lookups.
pub const CREATE_TABLES_CAPACITY_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_dining_tables_capacity
    ON dining_tables(restaurant_id, capacity, id)";

/// Speeds up schedule resolution.
pub const CREATE_SCHEDULES_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_weekly_schedules_day
    ON weekly_schedules(restaurant_id, day_of_week)";

/// Speeds up exception lookup by date.
pub const CREATE_EXCEPTIONS_INDEX: &str = r"
    CREATE INDEX IF NOT EXISTS idx_schedule_exceptions_date
    ON schedule_exceptions(restaurant_id, date)";

/// SQL statement to select the schema version from the metadata table.
pub const SELECT_SCHEMA_VERSION: &str = "SELECT value FROM metadata WHERE key = 'schema_version'";

/// SQL statement to insert or update the schema version in the metadata table.
pub const INSERT_SCHEMA_VERSION: &str =
    "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?)";
