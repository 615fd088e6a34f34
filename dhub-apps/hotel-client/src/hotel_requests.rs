//!  Dhub Hotel Client
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Hotel Tool Requests
//!
//! Side-effect free request types for the four Dhub tools.
//! Each request validates itself and encodes to the tool's JSON arguments.

use crate::hotel_config::Credentials;
use crate::hotel_errors::{HotelApiError, Result};
use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_DISTANCE_KM: u32 = 5;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 50;
pub const DEFAULT_ADULTS: u32 = 2;
pub const DEFAULT_NATIONALITY: &str = "CN";

pub const TOOL_SEARCH_BY_ADDRESS: &str = "search_hotels_by_address";
pub const TOOL_SEARCH_BY_NAME: &str = "search_hotels_by_hotel_name";
pub const TOOL_HOTEL_DETAILS: &str = "get_hotel_details";
pub const TOOL_CHECK_PRICE: &str = "check_hotel_price";

/// A request that maps onto one remote tool call.
pub trait ToolRequest {
    const TOOL_NAME: &'static str;

    fn validate(&self) -> Result<()>;

    /// Tool arguments, credentials included. Validates first.
    fn to_arguments(&self, credentials: &Credentials) -> Result<Map<String, Value>>;

    /// Non-fatal remarks about the request, relative to `today`.
    fn advisories(&self, _today: NaiveDate) -> Vec<String> {
        Vec::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    EnUs,
    ZhCn,
    /// Any other tag, forwarded as-is.
    Other(String),
}

impl Language {
    pub fn as_str(&self) -> &str {
        match self {
            Language::EnUs => "en-US",
            Language::ZhCn => "zh-CN",
            Language::Other(tag) => tag,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Language::Other(_))
    }

    fn validate(&self) -> Result<()> {
        if let Language::Other(tag) = self {
            if tag.trim().is_empty() {
                return Err(HotelApiError::validation("language tag cannot be empty"));
            }
        }
        Ok(())
    }

    fn advisory(&self) -> Option<String> {
        match self {
            Language::Other(tag) => Some(format!(
                "Language '{tag}' is not one of en-US, zh-CN; forwarding unchanged"
            )),
            _ => None,
        }
    }
}

impl FromStr for Language {
    type Err = HotelApiError;

    fn from_str(s: &str) -> Result<Self> {
        let tag = s.trim();
        let lang = if tag.eq_ignore_ascii_case("en-US") || tag.eq_ignore_ascii_case("en_US") {
            Language::EnUs
        } else if tag.eq_ignore_ascii_case("zh-CN") || tag.eq_ignore_ascii_case("zh_CN") {
            Language::ZhCn
        } else {
            Language::Other(tag.to_string())
        };
        lang.validate()?;
        Ok(lang)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Language {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Remote hotel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HotelId(pub u64);

impl From<u64> for HotelId {
    fn from(id: u64) -> Self {
        HotelId(id)
    }
}

impl fmt::Display for HotelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Google-style WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let point = Self { lat, lng };
        point.validate()?;
        Ok(point)
    }

    fn validate(&self) -> Result<()> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(HotelApiError::validation(format!(
                "latitude must be within [-90, 90], got {}",
                self.lat
            )));
        }
        if !self.lng.is_finite() || !(-180.0..=180.0).contains(&self.lng) {
            return Err(HotelApiError::validation(format!(
                "longitude must be within [-180, 180], got {}",
                self.lng
            )));
        }
        Ok(())
    }
}

fn round6(v: f64) -> f64 {
    (v * 1e6).round() / 1e6
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayWindow {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

impl StayWindow {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate) -> Result<Self> {
        let window = Self {
            check_in,
            check_out,
        };
        window.validate()?;
        Ok(window)
    }

    /// Parse a `yyyy-MM-dd` pair.
    pub fn parse(check_in: &str, check_out: &str) -> Result<Self> {
        Self::new(parse_date("check_in_date", check_in)?, parse_date("check_out_date", check_out)?)
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    fn validate(&self) -> Result<()> {
        if self.check_out <= self.check_in {
            return Err(HotelApiError::validation(format!(
                "check-out {} must be after check-in {}",
                self.check_out, self.check_in
            )));
        }
        Ok(())
    }

    fn advisory(&self, today: NaiveDate) -> Option<String> {
        (self.check_in < today).then(|| {
            format!("Check-in {} is in the past (today is {today})", self.check_in)
        })
    }

    fn check_in_str(&self) -> String {
        self.check_in.format(DATE_FORMAT).to_string()
    }

    fn check_out_str(&self) -> String {
        self.check_out.format(DATE_FORMAT).to_string()
    }
}

pub fn parse_date(field: &str, s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| {
        HotelApiError::validation(format!("{field} must be a yyyy-MM-dd date, got '{s}'"))
    })
}

/// Optional filters shared by both search tools.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilters {
    pub language: Language,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub star_ratings: Option<Vec<String>>,
    pub distance: u32,
    pub page_size: u32,
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            language: Language::EnUs,
            price_min: None,
            price_max: None,
            star_ratings: None,
            distance: DEFAULT_DISTANCE_KM,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchFilters {
    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn price_min(mut self, price: Option<f64>) -> Self {
        self.price_min = price;
        self
    }

    pub fn price_max(mut self, price: Option<f64>) -> Self {
        self.price_max = price;
        self
    }

    pub fn star_ratings(mut self, stars: Option<Vec<String>>) -> Self {
        self.star_ratings = stars;
        self
    }

    pub fn distance(mut self, km: u32) -> Self {
        self.distance = km;
        self
    }

    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Page size actually sent: always within `1..=MAX_PAGE_SIZE`.
    pub fn effective_page_size(&self) -> u32 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    fn validate(&self) -> Result<()> {
        self.language.validate()?;
        if self.distance == 0 {
            return Err(HotelApiError::validation("distance must be at least 1 km"));
        }
        for (name, price) in [("price_min", self.price_min), ("price_max", self.price_max)] {
            if let Some(p) = price {
                if !p.is_finite() || p < 0.0 {
                    return Err(HotelApiError::validation(format!(
                        "{name} must be a non-negative number, got {p}"
                    )));
                }
            }
        }
        if let (Some(min), Some(max)) = (self.price_min, self.price_max) {
            if min > max {
                return Err(HotelApiError::validation(format!(
                    "price_min {min} cannot be greater than price_max {max}"
                )));
            }
        }
        Ok(())
    }

    fn advisories(&self) -> Vec<String> {
        let mut notes: Vec<String> = self.language.advisory().into_iter().collect();
        if self.effective_page_size() != self.page_size {
            notes.push(format!(
                "page_size {} clamped to {}",
                self.page_size,
                self.effective_page_size()
            ));
        }
        notes
    }
}

#[derive(Serialize)]
struct AuthArgs<'a> {
    x_api_key: &'a str,
    x_secret_key: &'a str,
}

impl<'a> From<&'a Credentials> for AuthArgs<'a> {
    fn from(c: &'a Credentials) -> Self {
        AuthArgs {
            x_api_key: &c.api_key,
            x_secret_key: &c.secret_key,
        }
    }
}

#[derive(Serialize)]
struct FilterArgs<'a> {
    language: &'a Language,
    #[serde(skip_serializing_if = "Option::is_none")]
    price_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    star_ratings: Option<&'a [String]>,
    distance: u32,
    page_size: u32,
}

impl<'a> From<&'a SearchFilters> for FilterArgs<'a> {
    fn from(f: &'a SearchFilters) -> Self {
        FilterArgs {
            language: &f.language,
            price_min: f.price_min,
            price_max: f.price_max,
            star_ratings: f.star_ratings.as_deref(),
            distance: f.distance,
            page_size: f.effective_page_size(),
        }
    }
}

fn into_object<T: Serialize>(args: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(args) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(HotelApiError::validation(format!(
            "arguments must encode to an object, got {other}"
        ))),
        Err(e) => Err(HotelApiError::validation(format!("failed to encode arguments: {e}"))),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddressSearch {
    pub location: GeoPoint,
    pub stay: StayWindow,
    pub filters: SearchFilters,
}

impl AddressSearch {
    pub fn new(location: GeoPoint, stay: StayWindow) -> Self {
        Self {
            location,
            stay,
            filters: SearchFilters::default(),
        }
    }

    pub fn filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }
}

impl ToolRequest for AddressSearch {
    const TOOL_NAME: &'static str = TOOL_SEARCH_BY_ADDRESS;

    fn validate(&self) -> Result<()> {
        self.location.validate()?;
        self.stay.validate()?;
        self.filters.validate()
    }

    fn to_arguments(&self, credentials: &Credentials) -> Result<Map<String, Value>> {
        #[derive(Serialize)]
        struct Args<'a> {
            #[serde(flatten)]
            auth: AuthArgs<'a>,
            lng_google: f64,
            lat_google: f64,
            check_in_date: String,
            check_out_date: String,
            #[serde(flatten)]
            filters: FilterArgs<'a>,
        }

        self.validate()?;
        into_object(&Args {
            auth: credentials.into(),
            lng_google: round6(self.location.lng),
            lat_google: round6(self.location.lat),
            check_in_date: self.stay.check_in_str(),
            check_out_date: self.stay.check_out_str(),
            filters: (&self.filters).into(),
        })
    }

    fn advisories(&self, today: NaiveDate) -> Vec<String> {
        let mut notes: Vec<String> = self.stay.advisory(today).into_iter().collect();
        notes.extend(self.filters.advisories());
        notes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NameSearch {
    pub keyword: String,
    pub stay: StayWindow,
    pub filters: SearchFilters,
}

impl NameSearch {
    pub fn new(keyword: impl Into<String>, stay: StayWindow) -> Self {
        Self {
            keyword: keyword.into(),
            stay,
            filters: SearchFilters::default(),
        }
    }

    pub fn filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }
}

impl ToolRequest for NameSearch {
    const TOOL_NAME: &'static str = TOOL_SEARCH_BY_NAME;

    fn validate(&self) -> Result<()> {
        if self.keyword.trim().is_empty() {
            return Err(HotelApiError::validation("keyword cannot be empty"));
        }
        self.stay.validate()?;
        self.filters.validate()
    }

    fn to_arguments(&self, credentials: &Credentials) -> Result<Map<String, Value>> {
        #[derive(Serialize)]
        struct Args<'a> {
            #[serde(flatten)]
            auth: AuthArgs<'a>,
            keyword: &'a str,
            check_in_date: String,
            check_out_date: String,
            #[serde(flatten)]
            filters: FilterArgs<'a>,
        }

        self.validate()?;
        into_object(&Args {
            auth: credentials.into(),
            keyword: self.keyword.trim(),
            check_in_date: self.stay.check_in_str(),
            check_out_date: self.stay.check_out_str(),
            filters: (&self.filters).into(),
        })
    }

    fn advisories(&self, today: NaiveDate) -> Vec<String> {
        let mut notes: Vec<String> = self.stay.advisory(today).into_iter().collect();
        notes.extend(self.filters.advisories());
        notes
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HotelDetailsRequest {
    pub hotel_id: HotelId,
    pub language: Language,
    pub need_facility: bool,
}

impl HotelDetailsRequest {
    pub fn new(hotel_id: impl Into<HotelId>) -> Self {
        Self {
            hotel_id: hotel_id.into(),
            language: Language::EnUs,
            need_facility: true,
        }
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn need_facility(mut self, need: bool) -> Self {
        self.need_facility = need;
        self
    }
}

impl ToolRequest for HotelDetailsRequest {
    const TOOL_NAME: &'static str = TOOL_HOTEL_DETAILS;

    fn validate(&self) -> Result<()> {
        self.language.validate()
    }

    fn to_arguments(&self, credentials: &Credentials) -> Result<Map<String, Value>> {
        #[derive(Serialize)]
        struct Args<'a> {
            #[serde(flatten)]
            auth: AuthArgs<'a>,
            hotel_id: HotelId,
            language: &'a Language,
            need_facility: bool,
        }

        self.validate()?;
        into_object(&Args {
            auth: credentials.into(),
            hotel_id: self.hotel_id,
            language: &self.language,
            need_facility: self.need_facility,
        })
    }

    fn advisories(&self, _today: NaiveDate) -> Vec<String> {
        self.language.advisory().into_iter().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    pub adults: u32,
    pub children: u32,
    /// ISO-3166 alpha-2 code.
    pub nationality: String,
}

impl Default for Occupancy {
    fn default() -> Self {
        Self {
            adults: DEFAULT_ADULTS,
            children: 0,
            nationality: DEFAULT_NATIONALITY.to_string(),
        }
    }
}

impl Occupancy {
    pub fn new(adults: u32, children: u32, nationality: impl Into<String>) -> Result<Self> {
        let occupancy = Self {
            adults,
            children,
            nationality: nationality.into().trim().to_ascii_uppercase(),
        };
        occupancy.validate()?;
        Ok(occupancy)
    }

    fn validate(&self) -> Result<()> {
        if self.adults == 0 {
            return Err(HotelApiError::validation("at least one adult is required"));
        }
        let nationality = self.nationality.trim();
        if nationality.len() != 2 || !nationality.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(HotelApiError::validation(format!(
                "nationality must be a two-letter ISO-3166 code, got '{}'",
                self.nationality
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceCheckRequest {
    pub hotel_id: HotelId,
    pub stay: StayWindow,
    pub occupancy: Occupancy,
    pub language: Language,
}

impl PriceCheckRequest {
    pub fn new(hotel_id: impl Into<HotelId>, stay: StayWindow) -> Self {
        Self {
            hotel_id: hotel_id.into(),
            stay,
            occupancy: Occupancy::default(),
            language: Language::EnUs,
        }
    }

    pub fn occupancy(mut self, occupancy: Occupancy) -> Self {
        self.occupancy = occupancy;
        self
    }

    pub fn language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

impl ToolRequest for PriceCheckRequest {
    const TOOL_NAME: &'static str = TOOL_CHECK_PRICE;

    fn validate(&self) -> Result<()> {
        self.stay.validate()?;
        self.occupancy.validate()?;
        self.language.validate()
    }

    fn to_arguments(&self, credentials: &Credentials) -> Result<Map<String, Value>> {
        #[derive(Serialize)]
        struct Args<'a> {
            #[serde(flatten)]
            auth: AuthArgs<'a>,
            hotel_id: HotelId,
            check_in_date: String,
            check_out_date: String,
            num_of_adults: u32,
            num_of_children: u32,
            nationality: String,
            language: &'a Language,
        }

        self.validate()?;
        into_object(&Args {
            auth: credentials.into(),
            hotel_id: self.hotel_id,
            check_in_date: self.stay.check_in_str(),
            check_out_date: self.stay.check_out_str(),
            num_of_adults: self.occupancy.adults,
            num_of_children: self.occupancy.children,
            nationality: self.occupancy.nationality.trim().to_ascii_uppercase(),
            language: &self.language,
        })
    }

    fn advisories(&self, today: NaiveDate) -> Vec<String> {
        let mut notes: Vec<String> = self.stay.advisory(today).into_iter().collect();
        notes.extend(self.language.advisory());
        notes
    }
}
