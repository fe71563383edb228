// 🗄️ Data Sources
// Typed table reads over the Chinook schema. Three backends:
//   - SqliteSource: the Chinook SQLite database (read-only)
//   - CsvSource:    one `<Table>.csv` export per table in a directory
//   - Dataset:      tables already held in memory

use crate::error::{InsightError, InsightResult};
use crate::model::{
    parse_invoice_date, Album, Artist, Customer, Employee, EntityKind, Genre, Invoice, InvoiceLine,
    Track,
};
use log::debug;
use rusqlite::{Connection, OpenFlags, Row};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ============================================================================
// DATA SOURCE TRAIT
// ============================================================================

/// Read access to every row of each Chinook table, in source order
pub trait DataSource {
    /// Human-readable location, used in logs
    fn describe(&self) -> String;

    fn invoices(&self) -> InsightResult<Vec<Invoice>>;
    fn invoice_lines(&self) -> InsightResult<Vec<InvoiceLine>>;
    fn customers(&self) -> InsightResult<Vec<Customer>>;
    fn tracks(&self) -> InsightResult<Vec<Track>>;
    fn albums(&self) -> InsightResult<Vec<Album>>;
    fn artists(&self) -> InsightResult<Vec<Artist>>;
    fn genres(&self) -> InsightResult<Vec<Genre>>;
    fn employees(&self) -> InsightResult<Vec<Employee>>;
}

// ============================================================================
// IN-MEMORY DATASET
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub invoices: Vec<Invoice>,
    pub invoice_lines: Vec<InvoiceLine>,
    pub customers: Vec<Customer>,
    pub tracks: Vec<Track>,
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
    pub genres: Vec<Genre>,
    pub employees: Vec<Employee>,
}

impl Dataset {
    /// Copy every table out of another source
    pub fn load_from(source: &dyn DataSource) -> InsightResult<Self> {
        Ok(Dataset {
            invoices: source.invoices()?,
            invoice_lines: source.invoice_lines()?,
            customers: source.customers()?,
            tracks: source.tracks()?,
            albums: source.albums()?,
            artists: source.artists()?,
            genres: source.genres()?,
            employees: source.employees()?,
        })
    }
}

impl DataSource for Dataset {
    fn describe(&self) -> String {
        format!("in-memory dataset ({} invoices)", self.invoices.len())
    }

    fn invoices(&self) -> InsightResult<Vec<Invoice>> {
        Ok(self.invoices.clone())
    }

    fn invoice_lines(&self) -> InsightResult<Vec<InvoiceLine>> {
        Ok(self.invoice_lines.clone())
    }

    fn customers(&self) -> InsightResult<Vec<Customer>> {
        Ok(self.customers.clone())
    }

    fn tracks(&self) -> InsightResult<Vec<Track>> {
        Ok(self.tracks.clone())
    }

    fn albums(&self) -> InsightResult<Vec<Album>> {
        Ok(self.albums.clone())
    }

    fn artists(&self) -> InsightResult<Vec<Artist>> {
        Ok(self.artists.clone())
    }

    fn genres(&self) -> InsightResult<Vec<Genre>> {
        Ok(self.genres.clone())
    }

    fn employees(&self) -> InsightResult<Vec<Employee>> {
        Ok(self.employees.clone())
    }
}

// ============================================================================
// SQLITE SOURCE
// ============================================================================

#[derive(Debug)]
pub struct SqliteSource {
    location: String,
    conn: Connection,
}

impl SqliteSource {
    /// Open a Chinook database file read-only
    ///
    /// A missing file is reported before any open attempt, since SQLite
    /// would otherwise report a generic open failure.
    pub fn open(path: impl AsRef<Path>) -> InsightResult<Self> {
        let path = path.as_ref();
        let location = path.display().to_string();

        if !path.exists() {
            return Err(InsightError::SourceUnavailable {
                location,
                reason: "database file not found".to_string(),
            });
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| InsightError::SourceUnavailable {
            location: location.clone(),
            reason: e.to_string(),
        })?;

        // Opening is lazy; touch the schema so a non-database file fails here
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
            .map_err(|e| InsightError::SourceUnavailable {
                location: location.clone(),
                reason: e.to_string(),
            })?;

        Ok(SqliteSource { location, conn })
    }

    /// Wrap an already-open connection
    pub fn from_connection(conn: Connection, location: impl Into<String>) -> Self {
        SqliteSource {
            location: location.into(),
            conn,
        }
    }

    fn query<T>(
        &self,
        entity: EntityKind,
        sql: &str,
        map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
    ) -> InsightResult<Vec<T>> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| InsightError::table_read(entity, e))?;

        let rows = stmt
            .query_map([], map)
            .map_err(|e| InsightError::table_read(entity, e))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| InsightError::table_read(entity, e))?;

        debug!("Read {} {} rows from {}", rows.len(), entity, self.location);
        Ok(rows)
    }
}

impl DataSource for SqliteSource {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.location)
    }

    fn invoices(&self) -> InsightResult<Vec<Invoice>> {
        let raw = self.query(
            EntityKind::Invoice,
            r#"SELECT InvoiceId, CustomerId, InvoiceDate, Total FROM "Invoice" ORDER BY InvoiceId"#,
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                ))
            },
        )?;

        raw.into_iter()
            .map(|(id, customer_id, date_str, total_amount)| {
                let date = parse_invoice_date(&date_str).ok_or_else(|| {
                    InsightError::table_read(
                        EntityKind::Invoice,
                        format!("invoice {} has unrecognized date '{}'", id, date_str),
                    )
                })?;
                if !total_amount.is_finite() {
                    return Err(InsightError::table_read(
                        EntityKind::Invoice,
                        format!("invoice {} has non-finite total {}", id, total_amount),
                    ));
                }
                Ok(Invoice {
                    id,
                    customer_id,
                    date,
                    total_amount,
                })
            })
            .collect()
    }

    fn invoice_lines(&self) -> InsightResult<Vec<InvoiceLine>> {
        self.query(
            EntityKind::InvoiceLine,
            r#"SELECT InvoiceLineId, TrackId, Quantity FROM "InvoiceLine" ORDER BY InvoiceLineId"#,
            |row| {
                Ok(InvoiceLine {
                    id: row.get(0)?,
                    track_id: row.get(1)?,
                    quantity: row.get(2)?,
                })
            },
        )
    }

    fn customers(&self) -> InsightResult<Vec<Customer>> {
        self.query(
            EntityKind::Customer,
            r#"SELECT CustomerId, FirstName, LastName, Country, SupportRepId
               FROM "Customer" ORDER BY CustomerId"#,
            |row| {
                Ok(Customer {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    billing_country: row.get(3)?,
                    support_rep_id: row.get(4)?,
                })
            },
        )
    }

    fn tracks(&self) -> InsightResult<Vec<Track>> {
        self.query(
            EntityKind::Track,
            r#"SELECT TrackId, AlbumId, GenreId FROM "Track" ORDER BY TrackId"#,
            |row| {
                Ok(Track {
                    id: row.get(0)?,
                    album_id: row.get(1)?,
                    genre_id: row.get(2)?,
                })
            },
        )
    }

    fn albums(&self) -> InsightResult<Vec<Album>> {
        self.query(
            EntityKind::Album,
            r#"SELECT AlbumId, Title, ArtistId FROM "Album" ORDER BY AlbumId"#,
            |row| {
                Ok(Album {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    artist_id: row.get(2)?,
                })
            },
        )
    }

    fn artists(&self) -> InsightResult<Vec<Artist>> {
        self.query(
            EntityKind::Artist,
            r#"SELECT ArtistId, Name FROM "Artist" ORDER BY ArtistId"#,
            |row| {
                Ok(Artist {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
    }

    fn genres(&self) -> InsightResult<Vec<Genre>> {
        self.query(
            EntityKind::Genre,
            r#"SELECT GenreId, Name FROM "Genre" ORDER BY GenreId"#,
            |row| {
                Ok(Genre {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
    }

    fn employees(&self) -> InsightResult<Vec<Employee>> {
        self.query(
            EntityKind::Employee,
            r#"SELECT EmployeeId, FirstName, LastName FROM "Employee" ORDER BY EmployeeId"#,
            |row| {
                Ok(Employee {
                    id: row.get(0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                })
            },
        )
    }
}

// ============================================================================
// CSV SOURCE
// ============================================================================

/// Chinook tables exported as `<Table>.csv` with the schema's column names
#[derive(Debug)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn open(dir: impl AsRef<Path>) -> InsightResult<Self> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(InsightError::SourceUnavailable {
                location: dir.display().to_string(),
                reason: "CSV export directory not found".to_string(),
            });
        }
        Ok(CsvSource {
            dir: dir.to_path_buf(),
        })
    }

    pub fn table_path(&self, entity: EntityKind) -> PathBuf {
        self.dir.join(format!("{}.csv", entity.table_name()))
    }

    fn read<T: DeserializeOwned>(&self, entity: EntityKind) -> InsightResult<Vec<T>> {
        let path = self.table_path(entity);
        let mut rdr = csv::Reader::from_path(&path).map_err(|e| InsightError::SourceUnavailable {
            location: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut rows = Vec::new();
        for (line, result) in rdr.deserialize().enumerate() {
            let row: T = result.map_err(|e| {
                InsightError::table_read(entity, format!("record {}: {}", line + 1, e))
            })?;
            rows.push(row);
        }

        debug!("Read {} {} rows from {}", rows.len(), entity, path.display());
        Ok(rows)
    }
}

impl DataSource for CsvSource {
    fn describe(&self) -> String {
        format!("csv:{}", self.dir.display())
    }

    fn invoices(&self) -> InsightResult<Vec<Invoice>> {
        self.read(EntityKind::Invoice)
    }

    fn invoice_lines(&self) -> InsightResult<Vec<InvoiceLine>> {
        self.read(EntityKind::InvoiceLine)
    }

    fn customers(&self) -> InsightResult<Vec<Customer>> {
        self.read(EntityKind::Customer)
    }

    fn tracks(&self) -> InsightResult<Vec<Track>> {
        self.read(EntityKind::Track)
    }

    fn albums(&self) -> InsightResult<Vec<Album>> {
        self.read(EntityKind::Album)
    }

    fn artists(&self) -> InsightResult<Vec<Artist>> {
        self.read(EntityKind::Artist)
    }

    fn genres(&self) -> InsightResult<Vec<Genre>> {
        self.read(EntityKind::Genre)
    }

    fn employees(&self) -> InsightResult<Vec<Employee>> {
        self.read(EntityKind::Employee)
    }
}

// ============================================================================
// TESTS
// ============================================================================
