//! start.gg GraphQL surface: the tournament query, its wire types, and the
//! nested optional-field paths the aggregation engine relies on.

use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GQL_ENDPOINT: &str = "https://api.start.gg/gql/alpha";

const SITE_LINK: &str = "https://start.gg/";

pub const SEARCH_TERM: &str = "Tripoint";
// 33602 = Project+ and 2 = Project M
pub const VIDEOGAME_IDS: &[u64] = &[33602, 2];
// 1 = Singles
pub const EVENT_TYPES: &[u32] = &[1];

pub const TOURNAMENT_QUERY: &str = r#"
query TriPointProjectPlusEvents($perPage: Int!, $page: Int!, $searchTerm: String!, $videogameId: [ID]!, $eventType: [Int]!) {
  tournaments(query: {
    perPage: $perPage,
    page: $page,
    sortBy: "startAt asc",
    filter: {
      name: $searchTerm
    }
  }) {
    nodes {
      id
      name
      slug
      startAt
      endAt
      events(filter: {
        videogameId: $videogameId,
        type: $eventType
      }) {
        id
        name
        slug
        startAt
        numEntrants
        standings(query: { page: 1, perPage: 100 }) {
          nodes {
            id
            placement
            entrant {
              participants {
                user {
                  id
                  player {
                    gamerTag
                  }
                }
              }
            }
          }
        }
      }
    }
    pageInfo {
      totalPages
      page
      perPage
    }
  }
}
"#;

/// Public start.gg URL for a tournament or event slug.
pub fn site_url(slug: &str) -> String {
    format!("{SITE_LINK}{slug}")
}

#[derive(Debug, Serialize)]
struct GqlRequest<'a> {
    query: &'static str,
    variables: &'a QueryVariables,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryVariables {
    #[serde(rename = "searchTerm")]
    pub search_term: &'static str,
    #[serde(rename = "videogameId")]
    pub videogame_ids: &'static [u64],
    #[serde(rename = "eventType")]
    pub event_types: &'static [u32],
    #[serde(rename = "perPage")]
    pub per_page: u32,
    pub page: u64,
}

impl QueryVariables {
    pub fn for_page(page: u64, per_page: u32) -> Self {
        Self {
            search_term: SEARCH_TERM,
            videogame_ids: VIDEOGAME_IDS,
            event_types: EVENT_TYPES,
            per_page,
            page,
        }
    }
}

/// GraphQL response envelope. `data` stays an untyped value so pages can be
/// persisted exactly as the API returned them.
#[derive(Debug, Deserialize)]
pub struct GqlEnvelope {
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "vec_or_default")]
    pub errors: Vec<GqlError>,
}

#[derive(Debug, Deserialize)]
pub struct GqlError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub extensions: Option<Value>,
}

impl GqlError {
    pub fn describe(&self) -> String {
        match self.extensions.as_ref() {
            Some(detail) => format!("{} ({detail})", self.message),
            None => self.message.clone(),
        }
    }
}

pub fn fetch_tournaments_page(
    client: &Client,
    token: &str,
    variables: &QueryVariables,
) -> Result<GqlEnvelope> {
    let request = GqlRequest {
        query: TOURNAMENT_QUERY,
        variables,
    };
    let resp = client
        .post(GQL_ENDPOINT)
        .bearer_auth(token)
        .json(&request)
        .send()
        .context("request failed")?;
    let status = resp.status();
    let body = resp.text().context("failed reading body")?;
    if !status.is_success() {
        return Err(anyhow!("http {}: {}", status, body));
    }
    serde_json::from_str(&body).context("invalid graphql response json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageData {
    pub tournaments: TournamentConnection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TournamentConnection {
    #[serde(default, deserialize_with = "vec_or_default")]
    pub nodes: Vec<TournamentNode>,
    #[serde(rename = "pageInfo")]
    pub page_info: Option<PageInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PageInfo {
    #[serde(rename = "totalPages")]
    pub total_pages: Option<u64>,
    pub page: Option<u64>,
    #[serde(rename = "perPage")]
    pub per_page: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TournamentNode {
    pub id: Option<u64>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "startAt")]
    pub start_at: Option<i64>,
    #[serde(rename = "endAt")]
    pub end_at: Option<i64>,
    #[serde(default, deserialize_with = "vec_or_default")]
    pub events: Vec<EventNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventNode {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(rename = "startAt")]
    pub start_at: Option<i64>,
    #[serde(rename = "numEntrants")]
    pub num_entrants: Option<u32>,
    pub standings: Option<StandingConnection>,
}

impl EventNode {
    /// Standing nodes, empty when the API returned no standings block.
    pub fn standing_nodes(&self) -> &[StandingNode] {
        self.standings
            .as_ref()
            .map(|connection| connection.nodes.as_slice())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingConnection {
    #[serde(default, deserialize_with = "vec_or_default")]
    pub nodes: Vec<StandingNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StandingNode {
    pub id: u64,
    pub placement: u32,
    pub entrant: Option<EntrantNode>,
}

impl StandingNode {
    /// First participant's user, when the API supplied one. Every hop in the
    /// `entrant -> participants[0] -> user` path may be null.
    pub fn entrant_user(&self) -> Option<&UserNode> {
        self.entrant.as_ref()?.participants.first()?.user.as_ref()
    }

    pub fn entrant_user_id(&self) -> Option<u64> {
        self.entrant_user()?.id
    }

    pub fn entrant_gamer_tag(&self) -> Option<&str> {
        self.entrant_user()?.player.as_ref()?.gamer_tag.as_deref()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntrantNode {
    #[serde(default, deserialize_with = "vec_or_default")]
    pub participants: Vec<ParticipantNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParticipantNode {
    pub user: Option<UserNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserNode {
    pub id: Option<u64>,
    pub player: Option<PlayerTagNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayerTagNode {
    #[serde(rename = "gamerTag")]
    pub gamer_tag: Option<String>,
}

fn vec_or_default<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::Deserialize<'de>,
{
    let value = Option::<Vec<T>>::deserialize(deserializer)?;
    Ok(value.unwrap_or_default())
}
