//! Pre-match wire types.

use serde::{Deserialize, Serialize};

use crate::analyzer::DecodedPlayer;

/// A participant as the pre-match endpoint expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PrematchPlayer {
    pub battle_net_id: i64,
    pub battle_net_region_id: i32,
    pub battle_net_sub_id: i32,
    #[serde(rename = "BattleNetTId")]
    pub battle_net_t_id: Option<String>,
    /// Numeric part of the battle tag.
    pub battle_tag: i32,
    /// Name part of the battle tag.
    pub name: String,
}

impl From<&DecodedPlayer> for PrematchPlayer {
    fn from(player: &DecodedPlayer) -> Self {
        let (name, tag) = match player.battle_tag.rsplit_once('#') {
            Some((name, tag)) => (name, tag.parse().unwrap_or(0)),
            None => (player.battle_tag.as_str(), 0),
        };
        Self {
            battle_net_id: player.toon_id,
            battle_net_region_id: player.region,
            battle_net_sub_id: 0,
            battle_net_t_id: None,
            battle_tag: tag,
            name: name.to_string(),
        }
    }
}
