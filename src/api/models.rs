use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::bracket::{PromotionOutcome, RoundGroup};
use crate::domain::{Match, MatchStatus, PlayerId, Roster, TeamId, Tournament, TournamentId};
use crate::errors::{EngineError, EngineResult};
use crate::matches::MatchPatch;
use crate::standings::StandingsEntry;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchView {
    #[serde(flatten)]
    pub details: Match,
    pub team_a_name: Option<String>,
    pub team_b_name: Option<String>,
}

impl MatchView {
    pub fn new(details: Match, names: &BTreeMap<TeamId, String>) -> Self {
        let name_of = |slot: &Option<TeamId>| slot.as_ref().and_then(|id| names.get(id)).cloned();
        Self {
            team_a_name: name_of(&details.slot_a),
            team_b_name: name_of(&details.slot_b),
            details,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchUpdateResponse {
    #[serde(flatten)]
    pub view: MatchView,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion: Option<PromotionOutcome>,
}

/// Body of `PATCH /api/matches/:id`. Absent fields are left alone; an
/// explicit `null` slot clears it back to TBD.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MatchPatchRequest {
    pub score_a: Option<i64>,
    pub score_b: Option<i64>,
    pub status: Option<MatchStatus>,
    #[serde(default, deserialize_with = "double_option")]
    pub slot_a: Option<Option<TeamId>>,
    #[serde(default, deserialize_with = "double_option")]
    pub slot_b: Option<Option<TeamId>>,
    pub corners_a: Option<i64>,
    pub corners_b: Option<i64>,
    pub penalties_a: Option<i64>,
    pub penalties_b: Option<i64>,
    pub expected_version: Option<i64>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn count(field: &str, value: Option<i64>) -> EngineResult<Option<u32>> {
    value
        .map(|v| u32::try_from(v).map_err(|_| EngineError::Validation(format!("{} must be a non-negative count", field))))
        .transpose()
}

impl MatchPatchRequest {
    pub fn into_patch(self) -> EngineResult<MatchPatch> {
        Ok(MatchPatch {
            score_a: count("scoreA", self.score_a)?,
            score_b: count("scoreB", self.score_b)?,
            status: self.status,
            slot_a: self.slot_a,
            slot_b: self.slot_b,
            corners_a: count("cornersA", self.corners_a)?,
            corners_b: count("cornersB", self.corners_b)?,
            penalties_a: count("penaltiesA", self.penalties_a)?,
            penalties_b: count("penaltiesB", self.penalties_b)?,
            expected_version: self.expected_version,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub id_a: PlayerId,
    pub id_b: PlayerId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPlayerRequest {
    pub player_id: PlayerId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterView {
    #[serde(flatten)]
    pub roster: Roster,
    pub starter_target: usize,
    pub substitute_target: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentMatchesResponse {
    pub tournament: Tournament,
    pub rounds: Vec<RoundGroup<MatchView>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsRow {
    pub rank: usize,
    #[serde(flatten)]
    pub entry: StandingsEntry,
    pub team_name: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StandingsResponse {
    pub tournament_id: TournamentId,
    pub rows: Vec<StandingsRow>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_distinguishes_null_slot_from_absent() {
        let cleared: MatchPatchRequest = serde_json::from_str(r#"{"slotA": null}"#).unwrap();
        let untouched: MatchPatchRequest = serde_json::from_str(r#"{"scoreA": 2}"#).unwrap();

        assert_eq!(cleared.slot_a, Some(None));
        assert_eq!(untouched.slot_a, None);
        assert_eq!(untouched.into_patch().unwrap().score_a, Some(2));
    }

    #[test]
    fn test_negative_counts_are_rejected() {
        let request: MatchPatchRequest = serde_json::from_str(r#"{"scoreB": -1}"#).unwrap();

        assert!(matches!(request.into_patch(), Err(EngineError::Validation(_))));
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<MatchPatchRequest>(r#"{"score": 1}"#).is_err());
    }
}
