// Shared test fixtures: a small Chinook-shaped dataset plus writers that
// materialise it as a SQLite database or a CSV export directory.

use crate::model::{
    Album, Artist, Customer, Employee, EntityKind, Genre, Invoice, InvoiceLine, Track,
};
use crate::source::Dataset;
use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;

pub const FIXTURE_TOTAL_REVENUE: f64 = 36.0;
pub const FIXTURE_TOTAL_QUANTITY: i64 = 11;

pub fn create_test_invoice(id: i64, customer_id: i64, date: &str, total: f64) -> Invoice {
    Invoice {
        id,
        customer_id,
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        total_amount: total,
    }
}

fn customer(id: i64, first: &str, last: &str, country: Option<&str>, rep: Option<i64>) -> Customer {
    Customer {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        billing_country: country.map(str::to_string),
        support_rep_id: rep,
    }
}

fn employee(id: i64, first: &str, last: &str) -> Employee {
    Employee {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
    }
}

/// Seven invoices (one for an unknown customer), eleven units sold
/// (two on a track missing from the catalog)
pub fn create_test_dataset() -> Dataset {
    Dataset {
        invoices: vec![
            create_test_invoice(1, 1, "2024-01-05", 10.0),
            create_test_invoice(2, 2, "2024-01-20", 5.0),
            create_test_invoice(3, 1, "2024-02-01", 3.0),
            create_test_invoice(4, 3, "2024-02-14", 8.5),
            create_test_invoice(5, 4, "2024-03-03", 2.0),
            create_test_invoice(6, 5, "2024-03-21", 6.0),
            create_test_invoice(7, 99, "2024-05-09", 1.5),
        ],
        invoice_lines: vec![
            InvoiceLine { id: 1, track_id: 1, quantity: 1 },
            InvoiceLine { id: 2, track_id: 2, quantity: 2 },
            InvoiceLine { id: 3, track_id: 3, quantity: 1 },
            InvoiceLine { id: 4, track_id: 4, quantity: 1 },
            InvoiceLine { id: 5, track_id: 1, quantity: 3 },
            InvoiceLine { id: 6, track_id: 5, quantity: 1 },
            InvoiceLine { id: 7, track_id: 404, quantity: 2 },
        ],
        customers: vec![
            customer(1, "Luís", "Gonçalves", Some("Brazil"), Some(3)),
            customer(2, "Leonie", "Köhler", Some("Germany"), Some(5)),
            customer(3, "François", "Tremblay", Some("Canada"), Some(3)),
            customer(4, "Bjørn", "Hansen", None, Some(4)),
            customer(5, "František", "Wichterlová", Some("Czech Republic"), None),
        ],
        tracks: vec![
            Track { id: 1, album_id: Some(1), genre_id: Some(1) },
            Track { id: 2, album_id: Some(2), genre_id: Some(1) },
            Track { id: 3, album_id: Some(3), genre_id: Some(2) },
            Track { id: 4, album_id: Some(1), genre_id: Some(3) },
            Track { id: 5, album_id: None, genre_id: None },
        ],
        albums: vec![
            Album { id: 1, title: "For Those About To Rock We Salute You".to_string(), artist_id: 1 },
            Album { id: 2, title: "Balls to the Wall".to_string(), artist_id: 2 },
            Album { id: 3, title: "Kind of Blue".to_string(), artist_id: 3 },
        ],
        artists: vec![
            Artist { id: 1, name: "AC/DC".to_string() },
            Artist { id: 2, name: "Accept".to_string() },
            Artist { id: 3, name: "Miles Davis".to_string() },
        ],
        genres: vec![
            Genre { id: 1, name: "Rock".to_string() },
            Genre { id: 2, name: "Jazz".to_string() },
            Genre { id: 3, name: "Metal".to_string() },
        ],
        employees: vec![
            employee(3, "Jane", "Peacock"),
            employee(4, "Margaret", "Park"),
            employee(5, "Steve", "Johnson"),
        ],
    }
}

/// Write the dataset as a Chinook-schema SQLite file
pub fn write_sqlite_db(data: &Dataset, path: &Path) {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE "Employee" (EmployeeId INTEGER PRIMARY KEY, LastName TEXT NOT NULL, FirstName TEXT NOT NULL, Title TEXT);
        CREATE TABLE "Customer" (CustomerId INTEGER PRIMARY KEY, FirstName TEXT NOT NULL, LastName TEXT NOT NULL,
                                 Company TEXT, Country TEXT, Email TEXT, SupportRepId INTEGER);
        CREATE TABLE "Invoice" (InvoiceId INTEGER PRIMARY KEY, CustomerId INTEGER NOT NULL, InvoiceDate DATETIME NOT NULL,
                                BillingCountry TEXT, Total NUMERIC(10,2) NOT NULL);
        CREATE TABLE "InvoiceLine" (InvoiceLineId INTEGER PRIMARY KEY, InvoiceId INTEGER NOT NULL, TrackId INTEGER NOT NULL,
                                    UnitPrice NUMERIC(10,2) NOT NULL, Quantity INTEGER NOT NULL);
        CREATE TABLE "Genre" (GenreId INTEGER PRIMARY KEY, Name TEXT);
        CREATE TABLE "Artist" (ArtistId INTEGER PRIMARY KEY, Name TEXT);
        CREATE TABLE "Album" (AlbumId INTEGER PRIMARY KEY, Title TEXT NOT NULL, ArtistId INTEGER NOT NULL);
        CREATE TABLE "Track" (TrackId INTEGER PRIMARY KEY, Name TEXT NOT NULL, AlbumId INTEGER, GenreId INTEGER);
        "#,
    )
    .unwrap();

    for e in &data.employees {
        conn.execute(
            r#"INSERT INTO "Employee" (EmployeeId, LastName, FirstName, Title) VALUES (?1, ?2, ?3, 'Sales Support Agent')"#,
            params![e.id, e.last_name, e.first_name],
        )
        .unwrap();
    }
    for c in &data.customers {
        conn.execute(
            r#"INSERT INTO "Customer" (CustomerId, FirstName, LastName, Country, SupportRepId) VALUES (?1, ?2, ?3, ?4, ?5)"#,
            params![c.id, c.first_name, c.last_name, c.billing_country, c.support_rep_id],
        )
        .unwrap();
    }
    for i in &data.invoices {
        conn.execute(
            r#"INSERT INTO "Invoice" (InvoiceId, CustomerId, InvoiceDate, Total) VALUES (?1, ?2, ?3, ?4)"#,
            params![
                i.id,
                i.customer_id,
                format!("{} 00:00:00", i.date.format("%Y-%m-%d")),
                i.total_amount
            ],
        )
        .unwrap();
    }
    for l in &data.invoice_lines {
        conn.execute(
            r#"INSERT INTO "InvoiceLine" (InvoiceLineId, InvoiceId, TrackId, UnitPrice, Quantity) VALUES (?1, 1, ?2, 0.99, ?3)"#,
            params![l.id, l.track_id, l.quantity],
        )
        .unwrap();
    }
    for g in &data.genres {
        conn.execute(r#"INSERT INTO "Genre" (GenreId, Name) VALUES (?1, ?2)"#, params![g.id, g.name])
            .unwrap();
    }
    for a in &data.artists {
        conn.execute(r#"INSERT INTO "Artist" (ArtistId, Name) VALUES (?1, ?2)"#, params![a.id, a.name])
            .unwrap();
    }
    for a in &data.albums {
        conn.execute(
            r#"INSERT INTO "Album" (AlbumId, Title, ArtistId) VALUES (?1, ?2, ?3)"#,
            params![a.id, a.title, a.artist_id],
        )
        .unwrap();
    }
    for t in &data.tracks {
        conn.execute(
            r#"INSERT INTO "Track" (TrackId, Name, AlbumId, GenreId) VALUES (?1, ?2, ?3, ?4)"#,
            params![t.id, format!("Track {}", t.id), t.album_id, t.genre_id],
        )
        .unwrap();
    }
}

fn write_table<T: Serialize>(dir: &Path, entity: EntityKind, rows: &[T]) {
    let path = dir.join(format!("{}.csv", entity.table_name()));
    let mut wtr = csv::Writer::from_path(path).unwrap();
    for row in rows {
        wtr.serialize(row).unwrap();
    }
    wtr.flush().unwrap();
}

/// Write the dataset as one CSV file per table
pub fn write_csv_dir(data: &Dataset, dir: &Path) {
    write_table(dir, EntityKind::Invoice, &data.invoices);
    write_table(dir, EntityKind::InvoiceLine, &data.invoice_lines);
    write_table(dir, EntityKind::Customer, &data.customers);
    write_table(dir, EntityKind::Track, &data.tracks);
    write_table(dir, EntityKind::Album, &data.albums);
    write_table(dir, EntityKind::Artist, &data.artists);
    write_table(dir, EntityKind::Genre, &data.genres);
    write_table(dir, EntityKind::Employee, &data.employees);
}
