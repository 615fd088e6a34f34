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

// Library for dhub-hotel-client
// MCP client for the Dhub global hotel supply chain

mod hotel_config;
mod hotel_errors;
mod hotel_requests;
mod hotel_session;
pub mod telemetry;

pub use hotel_config::{
    ClientConfig, Credentials, DEFAULT_BASE_URL, ENV_API_KEY, ENV_BASE_URL, ENV_SECRET_KEY,
    load_dotenv,
};

pub use hotel_errors::{HotelApiError, Result};

pub use hotel_requests::{
    AddressSearch, DEFAULT_PAGE_SIZE, GeoPoint, HotelDetailsRequest, HotelId, Language,
    MAX_PAGE_SIZE, NameSearch, Occupancy, PriceCheckRequest, SearchFilters, StayWindow,
    TOOL_CHECK_PRICE, TOOL_HOTEL_DETAILS, TOOL_SEARCH_BY_ADDRESS, TOOL_SEARCH_BY_NAME, ToolRequest,
    parse_date,
};

pub use hotel_session::{HotelApiClient, HotelSession, ToolInfo};
