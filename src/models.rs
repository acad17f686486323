use serde::{Deserialize, Serialize};

/// A WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// True when both components are inside the valid WGS84 ranges.
    /// Distance math propagates NaN for anything else, so validate here.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub coordinates: Option<Coordinate>,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub total_jobs: u32,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub previously_hired: bool,
    #[serde(default)]
    pub professional_badge: bool,
    #[serde(default)]
    pub profile_picture: Option<String>,
    /// Distance from the searcher, computed server-side. Absent when the
    /// search ran without a location.
    #[serde(default)]
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub rating_min: f64,
    pub rating_max: f64,
    pub max_distance: f64,
    pub availability_days: u32,
    pub previously_hired_only: bool,
    pub favorites_only: bool,
    pub verified_only: bool,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            rating_min: 0.0,
            rating_max: 5.0,
            max_distance: 50.0,
            availability_days: 30,
            previously_hired_only: false,
            favorites_only: false,
            verified_only: false,
        }
    }
}

/// Sort options offered by the search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    RatingHigh,
    RatingLow,
    DistanceNear,
    DistanceFar,
    MostBooked,
    RecentlyHired,
    AvailabilityFast,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::RatingHigh
    }
}

impl SortOrder {
    pub const ALL: [SortOrder; 7] = [
        SortOrder::RatingHigh,
        SortOrder::RatingLow,
        SortOrder::DistanceNear,
        SortOrder::DistanceFar,
        SortOrder::MostBooked,
        SortOrder::RecentlyHired,
        SortOrder::AvailabilityFast,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::RatingHigh => "Rating (high)",
            SortOrder::RatingLow => "Rating (low)",
            SortOrder::DistanceNear => "Distance (near)",
            SortOrder::DistanceFar => "Distance (far)",
            SortOrder::MostBooked => "Most booked",
            SortOrder::RecentlyHired => "Recently hired",
            SortOrder::AvailabilityFast => "Fastest available",
        }
    }

    /// Next option in display order, wrapping around.
    pub fn next(&self) -> SortOrder {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u32,
    pub pages: u32,
}

impl Pagination {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit: limit.max(1),
            total: 0,
            pages: 0,
        }
    }

    /// Replaces the totals from a search response and clamps the current
    /// page back into range (a shrinking result set can strand it).
    pub fn set_totals(&mut self, total: u32, pages: u32) {
        self.total = total;
        self.pages = pages;
        if self.pages > 0 && self.page > self.pages {
            self.page = self.pages;
        }
    }

    /// `ceil(total / limit)`, what the server reports as `pages`.
    pub fn pages_for(total: u32, limit: u32) -> u32 {
        total.div_ceil(limit.max(1))
    }

    /// Moves to `page` if it is inside `[1, pages]`. Out-of-range requests
    /// are no-ops. Returns whether the page changed.
    pub fn go_to(&mut self, page: u32) -> bool {
        if page == 0 || page > self.pages || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }
}

/// Snapshot of the most recent completed booking with a provider.
/// Only lives as long as the rebook modal that requested it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviousBooking {
    pub service_id: String,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[serde(default)]
    pub scheduled_time: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub rating: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub role: String,
}

// Wire types for the search endpoint.

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub current_location: Option<Coordinate>,
    pub filters: SearchFilters,
    pub sort_by: SortOrder,
    pub page: u32,
    pub limit: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub providers: Vec<Provider>,
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RebookRequest {
    pub provider_id: String,
    pub service_id: Option<String>,
    pub scheduled_date: String,
    pub scheduled_time: String,
    pub address: String,
    pub notes: String,
}
