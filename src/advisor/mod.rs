//! Read-only briefing handed to the external city advisor.
//!
//! The text-generation service lives outside this crate; [`HttpAdvisor`]
//! talks to it over HTTP. Whatever it answers, the simulation never reads it
//! back.

use std::{future::Future, pin::Pin};

use serde::Serialize;
use thiserror::Error;

mod http;

pub use http::{ApiFormat, HttpAdvisor};

use crate::{
    grid::{Grid, ZoneCensus},
    world::CityStats,
};

pub const MISSING_KEY_REPLY: &str = "API Key not found. Please configure the environment.";
pub const EMPTY_REPLY: &str = "The advisor is out to lunch.";
pub const LINK_DOWN_REPLY: &str = "Advisor communication link down.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityBriefing {
    pub stats: CityStats,
    pub census: ZoneCensus,
}

impl CityBriefing {
    pub fn new(stats: &CityStats, grid: &Grid) -> Self {
        Self {
            stats: *stats,
            census: grid.census(),
        }
    }

    pub fn prompt(&self) -> String {
        let CityStats {
            day,
            population,
            funds,
            income,
        } = self.stats;
        let census = &self.census;
        format!(
            "You are the humorous and slightly sarcastic City Advisor for a new city.\n\
             Current Stats:\n\
             - Day: {day}\n\
             - Population: {population}\n\
             - Funds: ${funds}\n\
             - Income: ${income}/day\n\
             - Residential Zones: {}\n\
             - Commercial Zones: {}\n\
             - Industrial Zones: {}\n\
             - Road Tiles: {}\n\
             - Power Stations: {}\n\
             \n\
             Analyze the city's balance. Do we need more houses? More jobs? \
             Is traffic (roads) sufficient? Do we have power?\n\
             Provide a short status update (max 2 sentences) and one actionable tip. Keep it fun.\n",
            census.residential, census.commercial, census.industrial, census.roads, census.power,
        )
    }
}

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("advisor credentials are not configured")]
    MissingApiKey,

    #[error("advisor request failed: {0}")]
    Transport(String),
}

pub type AdviceFuture<'a> = Pin<Box<dyn Future<Output = Result<String, AdvisorError>> + Send + 'a>>;

/// Text-generation backend that turns a prompt into advice.
pub trait Advisor: Send + Sync {
    fn advise<'a>(&'a self, prompt: &'a str) -> AdviceFuture<'a>;
}

/// Asks `advisor` about the city. Never fails: every problem becomes a
/// canned reply.
pub async fn consult(advisor: Option<&dyn Advisor>, briefing: &CityBriefing) -> String {
    let Some(advisor) = advisor else {
        return MISSING_KEY_REPLY.to_string();
    };
    let prompt = briefing.prompt();
    match advisor.advise(&prompt).await {
        Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
        Ok(text) => text,
        Err(AdvisorError::MissingApiKey) => MISSING_KEY_REPLY.to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "advisor unavailable");
            LINK_DOWN_REPLY.to_string()
        }
    }
}
