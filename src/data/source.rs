//! Per-category region enumeration.
//!
//! Each category walks the provider's hierarchy differently:
//!
//! - domestic / prison: province -> district, headers per province
//! - overseas: country -> mission, one shared abroad header list
//! - customs: a single pseudo-region holding every customs post, shared
//!   abroad header list

use crate::data::client::{ApiClient, Fetch, Params};
use crate::data::endpoints::{
    Country, Province, customs_result_params, district_result_params, mission_result_params,
    prison_result_params,
};
use crate::domain::{Category, ColumnDescriptor, Job};
use crate::error::FetchError;

/// Top-level unit a job iterates over.
#[derive(Debug, Clone, PartialEq)]
pub enum Region {
    Province(Province),
    Country(Country),
    /// Customs posts are not grouped by the provider.
    AllCustomsPosts,
}

impl Region {
    pub fn label(&self) -> String {
        match self {
            Region::Province(p) => p
                .name
                .clone()
                .unwrap_or_else(|| format!("province {}", p.province_id)),
            Region::Country(c) => c
                .name
                .clone()
                .unwrap_or_else(|| format!("country {}", c.country_id)),
            Region::AllCustomsPosts => "customs posts".to_string(),
        }
    }
}

impl<F: Fetch> ApiClient<F> {
    pub fn regions(&self, job: Job) -> Result<Vec<Region>, FetchError> {
        match job.category {
            Category::Domestic | Category::Prison => Ok(self
                .provinces(job.round, job.category)?
                .into_iter()
                .map(Region::Province)
                .collect()),
            Category::Overseas => Ok(self.countries()?.into_iter().map(Region::Country).collect()),
            Category::Customs => Ok(vec![Region::AllCustomsPosts]),
        }
    }

    /// Headers declared for one region. Abroad regions all share the abroad list.
    pub fn region_headers(&self, job: Job, region: &Region) -> Result<Vec<ColumnDescriptor>, FetchError> {
        match region {
            Region::Province(p) => self.province_headers(p, job.round),
            Region::Country(_) | Region::AllCustomsPosts => self.abroad_headers(job.round),
        }
    }

    /// Result parameter sets for every sub-unit of `region`, freshly enumerated.
    pub fn result_units(&self, job: Job, region: &Region) -> Result<Vec<Params>, FetchError> {
        let election_id = self.election_id();
        let units = match (job.category, region) {
            (Category::Domestic, Region::Province(p)) => self
                .districts(p, job.round, job.category)?
                .iter()
                .map(|d| district_result_params(election_id, d, job.round))
                .collect(),
            (Category::Prison, Region::Province(p)) => self
                .districts(p, job.round, job.category)?
                .iter()
                .map(|d| prison_result_params(election_id, d, job.round))
                .collect(),
            (Category::Overseas, Region::Country(c)) => self
                .missions(c)?
                .iter()
                .map(|m| mission_result_params(election_id, m, job.round))
                .collect(),
            (Category::Customs, Region::AllCustomsPosts) => self
                .customs_posts()?
                .iter()
                .map(|g| customs_result_params(election_id, g, job.round))
                .collect(),
            (category, region) => {
                return Err(FetchError::RegionMismatch {
                    category: category.display_name(),
                    region: region.label(),
                });
            }
        };
        Ok(units)
    }
}
