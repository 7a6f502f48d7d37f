//! Typed outbound commands. Each variant serializes to the wire
//! frame `{ "type": <variant name>, "data": <fields> }` via [`OutboundMessage::encode`].

use serde::Serialize;

use crate::types::MiniCardView;

/// Every outbound intent the client may dispatch. Variants with no fields
/// still serialize `data` as an empty object, matching the server's
/// `{type, data}` schema uniformly.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "variant", content = "data", rename_all_fields = "camelCase")]
pub enum OutboundMessage {
    SetName {
        name: String,
    },
    GetProfile,
    Logout,
    SetAvatar {
        avatar_id: String,
    },
    ListMinis,
    ListMaps,
    SaveArmy {
        #[serde(rename = "cardIDs")]
        card_ids: Vec<String>,
    },
    CreatePve {
        #[serde(rename = "mapID")]
        map_id: String,
    },
    StartBattle,
    LeaveRoom,
    DeployMiniAt {
        card_index: u32,
        x: f32,
        y: f32,
        #[serde(rename = "clientTs")]
        client_ts_ms: i64,
    },
    JoinPvpQueue,
    LeavePvpQueue,
    FriendlyCreate,
    FriendlyCancel,
    FriendlyJoin {
        code: String,
    },
    GetLeaderboard,
    GetFriends,
    AddFriend {
        name: String,
    },
    RemoveFriend {
        name: String,
    },
    SendFriendDM {
        to: String,
        text: String,
    },
    GetFriendHistory {
        with: String,
        limit: u32,
    },
    GetUserProfile {
        name: String,
    },
    CreateGuild {
        name: String,
    },
    JoinGuild {
        #[serde(rename = "guildID")]
        guild_id: String,
    },
    LeaveGuild,
    ListGuilds,
    GetGuild,
    GuildChatSend {
        text: String,
    },
    PromoteMember {
        name: String,
    },
    DemoteMember {
        name: String,
    },
    KickMember {
        name: String,
    },
    TransferLeader {
        name: String,
    },
    DisbandGuild,
}

/// Wire envelope used only for outbound frames — mirrors `RawFrame` but the
/// `type` tag comes from the variant name via serde's internal tagging, so
/// we re-shape it into `{type, data}` here rather than relying on the
/// internally-tagged representation directly (the server expects the literal
/// field name `type`, not `variant`).
#[derive(Serialize)]
struct WireFrame<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    data: serde_json::Value,
}

impl OutboundMessage {
    /// Returns the wire `type` tag for this message, e.g. `"DeployMiniAt"`.
    pub fn wire_type(&self) -> &'static str {
        match self {
            OutboundMessage::SetName { .. } => "SetName",
            OutboundMessage::GetProfile => "GetProfile",
            OutboundMessage::Logout => "Logout",
            OutboundMessage::SetAvatar { .. } => "SetAvatar",
            OutboundMessage::ListMinis => "ListMinis",
            OutboundMessage::ListMaps => "ListMaps",
            OutboundMessage::SaveArmy { .. } => "SaveArmy",
            OutboundMessage::CreatePve { .. } => "CreatePve",
            OutboundMessage::StartBattle => "StartBattle",
            OutboundMessage::LeaveRoom => "LeaveRoom",
            OutboundMessage::DeployMiniAt { .. } => "DeployMiniAt",
            OutboundMessage::JoinPvpQueue => "JoinPvpQueue",
            OutboundMessage::LeavePvpQueue => "LeavePvpQueue",
            OutboundMessage::FriendlyCreate => "FriendlyCreate",
            OutboundMessage::FriendlyCancel => "FriendlyCancel",
            OutboundMessage::FriendlyJoin { .. } => "FriendlyJoin",
            OutboundMessage::GetLeaderboard => "GetLeaderboard",
            OutboundMessage::GetFriends => "GetFriends",
            OutboundMessage::AddFriend { .. } => "AddFriend",
            OutboundMessage::RemoveFriend { .. } => "RemoveFriend",
            OutboundMessage::SendFriendDM { .. } => "SendFriendDM",
            OutboundMessage::GetFriendHistory { .. } => "GetFriendHistory",
            OutboundMessage::GetUserProfile { .. } => "GetUserProfile",
            OutboundMessage::CreateGuild { .. } => "CreateGuild",
            OutboundMessage::JoinGuild { .. } => "JoinGuild",
            OutboundMessage::LeaveGuild => "LeaveGuild",
            OutboundMessage::ListGuilds => "ListGuilds",
            OutboundMessage::GetGuild => "GetGuild",
            OutboundMessage::GuildChatSend { .. } => "GuildChatSend",
            OutboundMessage::PromoteMember { .. } => "PromoteMember",
            OutboundMessage::DemoteMember { .. } => "DemoteMember",
            OutboundMessage::KickMember { .. } => "KickMember",
            OutboundMessage::TransferLeader { .. } => "TransferLeader",
            OutboundMessage::DisbandGuild => "DisbandGuild",
        }
    }

    /// Serializes this message as the single JSON text frame the transport writes.
    pub fn encode(&self) -> serde_json::Result<String> {
        let data = serde_json::to_value(self)?
            .get("data")
            .cloned()
            .unwrap_or(serde_json::json!({}));
        let frame = WireFrame {
            kind: self.wire_type(),
            data,
        };
        serde_json::to_string(&frame)
    }
}

#[allow(dead_code)]
fn _assert_card_view_reachable(_: MiniCardView) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_type_and_data() {
        let msg = OutboundMessage::DeployMiniAt {
            card_index: 2,
            x: 120.0,
            y: 240.0,
            client_ts_ms: 1000,
        };
        let json: serde_json::Value = serde_json::from_str(&msg.encode().unwrap()).unwrap();
        assert_eq!(json["type"], "DeployMiniAt");
        assert_eq!(json["data"]["cardIndex"], 2);
        assert_eq!(json["data"]["x"], 120.0);
    }

    #[test]
    fn unit_variant_encodes_empty_data() {
        let json: serde_json::Value =
            serde_json::from_str(&OutboundMessage::GetProfile.encode().unwrap()).unwrap();
        assert_eq!(json["type"], "GetProfile");
        assert_eq!(json["data"], serde_json::json!({}));
    }
}
