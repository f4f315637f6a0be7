//! Provider endpoint catalogue: region records and request parameters.
//!
//! Every endpoint takes the election id plus a flat set of query parameters.
//! The result endpoint expects the full parameter set on every call, with the
//! ones that do not apply sent blank.

use serde::{Deserialize, Deserializer};

use crate::data::client::{ApiClient, Fetch, Params};
use crate::domain::{Category, ColumnDescriptor, RawRecord, Round};
use crate::error::FetchError;

pub const PROVINCES: &str = "getIlList";
pub const DISTRICTS: &str = "getIlceList";
pub const COUNTRIES: &str = "getUlkeList";
pub const MISSIONS: &str = "getDisTemsilcilikList";
pub const CUSTOMS_POSTS: &str = "getGumrukList";
pub const HEADERS: &str = "getSandikSecimSonucBaslikList";
pub const BALLOT_BOX_RESULTS: &str = "getSecimSandikSonucList";

/// A province-level electoral district (`getIlList`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Province {
    #[serde(rename = "il_ID")]
    pub province_id: i64,
    #[serde(rename = "il_ADI", default)]
    pub name: Option<String>,
    #[serde(rename = "secim_CEVRESI_ID")]
    pub constituency_id: i64,
}

/// A district inside a province (`getIlceList`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct District {
    #[serde(rename = "ilce_ID")]
    pub district_id: i64,
    #[serde(rename = "ilce_ADI", default)]
    pub name: Option<String>,
    #[serde(rename = "belde_ID", default, deserialize_with = "zero_if_null")]
    pub town_id: i64,
    #[serde(rename = "birim_ID", default, deserialize_with = "zero_if_null")]
    pub unit_id: i64,
    #[serde(rename = "il_ID")]
    pub province_id: i64,
    #[serde(rename = "secim_CEVRESI_ID")]
    pub constituency_id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Country {
    #[serde(rename = "ulke_ID")]
    pub country_id: i64,
    #[serde(rename = "ulke_ADI", default)]
    pub name: Option<String>,
}

/// A diplomatic mission hosting ballot boxes (`getDisTemsilcilikList`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Mission {
    #[serde(rename = "dis_TEMSILCILIK_ID")]
    pub mission_id: i64,
    #[serde(rename = "dis_TEMSILCILIK_ADI", default)]
    pub name: Option<String>,
    #[serde(rename = "ulke_ID")]
    pub country_id: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomsPost {
    #[serde(rename = "gumruk_ID")]
    pub customs_id: i64,
    #[serde(rename = "gumruk_ADI", default)]
    pub name: Option<String>,
    #[serde(rename = "ilce_ID", default, deserialize_with = "zero_if_null")]
    pub district_id: i64,
}

/// The provider sends `null` for ids that do not apply.
fn zero_if_null<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(Option::<i64>::deserialize(d)?.unwrap_or_default())
}

fn base(election_id: u64) -> Params {
    Params::new().with("secimId", election_id)
}

/// Result parameters for the ordinary ballot boxes of one district.
pub fn district_result_params(election_id: u64, district: &District, round: Round) -> Params {
    base(election_id)
        .with("secimTuru", round.id())
        .with("sandikTuru", Category::Domestic.ballot_box_type())
        .with("yurtIciDisi", Category::Domestic.home_abroad())
        .blank("sandikId")
        .with("ilId", district.province_id)
        .with("ilceId", district.district_id)
        .with("beldeId", district.town_id)
        .with("birimId", district.unit_id)
        .blank("muhtarlikId")
        .blank("cezaeviId")
        .blank("sandikNoIlk")
        .blank("sandikNoSon")
        .blank("ulkeId")
        .blank("disTemsilcilikId")
        .blank("gumrukId")
        .blank("sandikRumuzIlk")
        .blank("sandikRumuzSon")
        .with("secimCevresiId", district.constituency_id)
}

/// Result parameters for the prison ballot boxes of one district.
pub fn prison_result_params(election_id: u64, district: &District, round: Round) -> Params {
    base(election_id)
        .with("secimTuru", round.id())
        .with("sandikTuru", Category::Prison.ballot_box_type())
        .with("yurtIciDisi", Category::Prison.home_abroad())
        .blank("ulkeId")
        .blank("disTemsilcilikId")
        .with("ilId", district.province_id)
        .with("ilceId", district.district_id)
        .with("beldeId", district.town_id)
        .with("birimId", district.unit_id)
        .blank("muhtarlikId")
        .blank("cezaeviId")
        .blank("sandikNoIlk")
        .blank("sandikNoSon")
        .blank("gumrukId")
        .blank("sandikRumuzIlk")
        .blank("sandikRumuzSon")
        .with("secimCevresiId", district.constituency_id)
        .blank("sandikId")
}

pub fn mission_result_params(election_id: u64, mission: &Mission, round: Round) -> Params {
    base(election_id)
        .with("secimTuru", round.id())
        .with("sandikTuru", Category::Overseas.ballot_box_type())
        .with("yurtIciDisi", Category::Overseas.home_abroad())
        .with("ulkeId", mission.country_id)
        .with("disTemsilcilikId", mission.mission_id)
        .blank("ilId")
        .blank("ilceId")
        .blank("beldeId")
        .blank("birimId")
        .blank("muhtarlikId")
        .blank("cezaeviId")
        .blank("sandikNoIlk")
        .blank("sandikNoSon")
        .blank("gumrukId")
        .blank("sandikRumuzIlk")
        .blank("sandikRumuzSon")
        .blank("secimCevresiId")
        .blank("sandikId")
}

pub fn customs_result_params(election_id: u64, post: &CustomsPost, round: Round) -> Params {
    base(election_id)
        .with("secimTuru", round.id())
        .with("sandikTuru", Category::Customs.ballot_box_type())
        .with("yurtIciDisi", Category::Customs.home_abroad())
        .blank("ulkeId")
        .with("gumrukId", post.customs_id)
        .blank("ilId")
        .with("ilceId", post.district_id)
        .blank("beldeId")
        .blank("birimId")
        .blank("muhtarlikId")
        .blank("cezaeviId")
        .blank("sandikNoIlk")
        .blank("sandikNoSon")
        .blank("disTemsilcilikId")
        .blank("sandikRumuzIlk")
        .blank("sandikRumuzSon")
        .blank("secimCevresiId")
        .blank("sandikId")
}

impl<F: Fetch> ApiClient<F> {
    /// Provinces holding ballot boxes of `category`'s type.
    pub fn provinces(&self, round: Round, category: Category) -> Result<Vec<Province>, FetchError> {
        let params = base(self.election_id())
            .with("secimTuru", round.id())
            .with("sandikTuru", category.ballot_box_type())
            .with("yurtIciDisi", Category::Domestic.home_abroad());
        self.get(PROVINCES, &params)
    }

    pub fn districts(
        &self,
        province: &Province,
        round: Round,
        category: Category,
    ) -> Result<Vec<District>, FetchError> {
        let params = base(self.election_id())
            .with("secimTuru", round.id())
            .with("sandikTuru", category.ballot_box_type())
            .with("yurtIciDisi", Category::Domestic.home_abroad())
            .with("ilId", province.province_id)
            .with("secimCevresiId", province.constituency_id);
        self.get(DISTRICTS, &params)
    }

    pub fn countries(&self) -> Result<Vec<Country>, FetchError> {
        self.get(COUNTRIES, &base(self.election_id()))
    }

    pub fn missions(&self, country: &Country) -> Result<Vec<Mission>, FetchError> {
        let params = base(self.election_id()).with("ulkeId", country.country_id);
        self.get(MISSIONS, &params)
    }

    pub fn customs_posts(&self) -> Result<Vec<CustomsPost>, FetchError> {
        self.get(CUSTOMS_POSTS, &base(self.election_id()))
    }

    /// Column headers declared for one domestic constituency.
    pub fn province_headers(&self, province: &Province, round: Round) -> Result<Vec<ColumnDescriptor>, FetchError> {
        let params = base(self.election_id())
            .with("secimTuru", round.id())
            .with("yurtIciDisi", Category::Domestic.home_abroad())
            .with("secimCevresiId", province.constituency_id)
            .with("ilId", province.province_id)
            .with("bagimsiz", 1);
        self.get(HEADERS, &params)
    }

    /// Column headers shared by every abroad ballot box (missions, customs).
    pub fn abroad_headers(&self, round: Round) -> Result<Vec<ColumnDescriptor>, FetchError> {
        let params = base(self.election_id())
            .with("secimTuru", round.id())
            .with("yurtIciDisi", Category::Overseas.home_abroad())
            .blank("secimCevresiId")
            .blank("ilId")
            .with("bagimsiz", 1);
        self.get(HEADERS, &params)
    }

    /// Ballot-box rows for one result parameter set, in provider order.
    pub fn ballot_box_results(&self, params: &Params) -> Result<Vec<RawRecord>, FetchError> {
        self.get(BALLOT_BOX_RESULTS, params)
    }
}
