// 🎸 Catalog Aggregator
// Units sold per genre, artist and album. Each invoice line is resolved once
// through track → genre and track → album → artist; any link that cannot be
// resolved yields the Unknown label for that dimension, so every dimension
// accounts for the full line quantity.

use crate::join::{KeyIndex, Resolved};
use crate::model::{Album, Artist, Genre, InvoiceLine, Track};
use crate::rank::{GroupTotals, RankedBucket, UNKNOWN_LABEL};
use serde::Serialize;

pub const DEFAULT_TOP_GENRES: usize = 10;
pub const DEFAULT_TOP_ARTISTS: usize = 10;
pub const DEFAULT_TOP_ALBUMS: usize = 10;

/// Units sold, keyed by the dimension label
pub type QuantityBucket = RankedBucket<String, i64>;

/// An invoice line with every catalog dimension resolved to a label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSale {
    pub line_id: i64,
    pub quantity: i64,
    pub genre: String,
    pub album: String,
    pub artist: String,
}

/// Borrowed catalog tables the aggregator joins against
pub struct CatalogTables<'a> {
    pub tracks: &'a [Track],
    pub genres: &'a [Genre],
    pub albums: &'a [Album],
    pub artists: &'a [Artist],
}

pub struct CatalogAggregator {
    sales: Vec<CatalogSale>,
}

impl CatalogAggregator {
    /// Resolve all invoice lines against the catalog tables
    pub fn new(lines: &[InvoiceLine], tables: &CatalogTables<'_>) -> Self {
        let tracks = KeyIndex::build(tables.tracks, |t| t.id);
        let genres = KeyIndex::build(tables.genres, |g| g.id);
        let albums = KeyIndex::build(tables.albums, |a| a.id);
        let artists = KeyIndex::build(tables.artists, |a| a.id);

        let sales = lines
            .iter()
            .map(|line| {
                let track: Resolved<'_, Track> = tracks.resolve(Some(line.track_id));
                let genre = track.and_then(|t| genres.resolve(t.genre_id));
                let album = track.and_then(|t| albums.resolve(t.album_id));
                let artist = album.and_then(|a| artists.resolve(Some(a.artist_id)));

                CatalogSale {
                    line_id: line.id,
                    quantity: line.quantity,
                    genre: genre.label_or(UNKNOWN_LABEL, |g| g.name.clone()),
                    album: album.label_or(UNKNOWN_LABEL, |a| a.title.clone()),
                    artist: artist.label_or(UNKNOWN_LABEL, |a| a.name.clone()),
                }
            })
            .collect();

        CatalogAggregator { sales }
    }

    /// The joined line set all three rankings are computed from
    pub fn sales(&self) -> &[CatalogSale] {
        &self.sales
    }

    pub fn total_quantity(&self) -> i64 {
        self.sales.iter().map(|s| s.quantity).sum()
    }

    pub fn top_genres_by_quantity(&self, n: usize) -> Vec<QuantityBucket> {
        self.rank_by(n, |s| &s.genre)
    }

    pub fn top_artists_by_quantity(&self, n: usize) -> Vec<QuantityBucket> {
        self.rank_by(n, |s| &s.artist)
    }

    pub fn top_albums_by_quantity(&self, n: usize) -> Vec<QuantityBucket> {
        self.rank_by(n, |s| &s.album)
    }

    fn rank_by(&self, n: usize, dimension: impl Fn(&CatalogSale) -> &String) -> Vec<QuantityBucket> {
        let mut totals = GroupTotals::new();
        for sale in &self.sales {
            let label = dimension(sale);
            totals.add(label.clone(), sale.quantity, || label.clone());
        }
        totals.top(n)
    }
}

// ============================================================================
// TESTS
// ============================================================================
