//! Inbound frame decoding: `{ "type": <string>, "data": <object> }` dispatch.
//!
//! One registry, one match: the tag is the wire `type` string and the match
//! target is a typed [`Envelope`] variant rather than a raw header byte.

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Raw, not-yet-decoded frame as it arrives off the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RawFrame {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: serde_json::Value,
}

/// A fully decoded inbound frame, one variant per recognized `type`.
///
/// `Envelope::Unknown` carries the original tag so the router can log it once
/// per type per session before discarding.
#[derive(Clone, Debug)]
pub enum Envelope {
    Profile(ProfilePayload),
    RatingUpdate(ProfilePayload),
    Leaderboard(LeaderboardPayload),
    Minis(MinisPayload),
    Maps(MapsPayload),
    Init(InitPayload),
    GoldUpdate(GoldUpdatePayload),
    StateDelta(StateDeltaPayload),
    FullSnapshot(FullSnapshotPayload),
    Error(ServerErrorPayload),
    HandUpdate(HandUpdatePayload),
    GameOver(GameOverPayload),
    FriendlyCode(FriendlyCodePayload),
    RoomCreated(RoomCreatedPayload),
    LoggedOut(LoggedOutPayload),
    Friends(FriendsPayload),
    FriendDM(FriendDmPayload),
    FriendHistory(FriendHistoryPayload),
    UserProfile(UserProfilePayload),
    GuildInfo(GuildInfoPayload),
    GuildList(GuildListPayload),
    GuildChat(GuildChatPayload),
    GuildChatMsg(GuildChatMsgPayload),
    GuildLeft(GuildLeftPayload),
    GuildDisbanded(GuildDisbandedPayload),
    /// A `type` value not in the registry. Carries the tag for once-per-type logging.
    Unknown(String),
}

/// Error produced when a recognized `type` carries a `data` body that does not
/// match its expected shape. The router logs this and discards the frame —
/// it never halts.
#[derive(Debug, thiserror::Error)]
#[error("failed to decode `{kind}` frame: {source}")]
pub struct DecodeError {
    pub kind: String,
    #[source]
    pub source: serde_json::Error,
}

impl Envelope {
    /// Decodes a raw frame into its typed variant. Unknown types never error —
    /// they become `Envelope::Unknown` so one unrecognized frame never halts
    /// the router.
    pub fn decode(frame: RawFrame) -> Result<Envelope, DecodeError> {
        macro_rules! decode_as {
            ($variant:ident, $payload:ty) => {{
                let payload: $payload = serde_json::from_value(frame.data).map_err(|source| {
                    DecodeError {
                        kind: frame.kind.clone(),
                        source,
                    }
                })?;
                Ok(Envelope::$variant(payload))
            }};
        }

        match frame.kind.as_str() {
            "Profile" => decode_as!(Profile, ProfilePayload),
            "RatingUpdate" => decode_as!(RatingUpdate, ProfilePayload),
            "Leaderboard" => decode_as!(Leaderboard, LeaderboardPayload),
            "Minis" => decode_as!(Minis, MinisPayload),
            "Maps" => decode_as!(Maps, MapsPayload),
            "Init" => decode_as!(Init, InitPayload),
            "GoldUpdate" => decode_as!(GoldUpdate, GoldUpdatePayload),
            "StateDelta" => decode_as!(StateDelta, StateDeltaPayload),
            "FullSnapshot" => decode_as!(FullSnapshot, FullSnapshotPayload),
            "Error" => decode_as!(Error, ServerErrorPayload),
            "HandUpdate" => decode_as!(HandUpdate, HandUpdatePayload),
            "GameOver" => decode_as!(GameOver, GameOverPayload),
            "FriendlyCode" => decode_as!(FriendlyCode, FriendlyCodePayload),
            "RoomCreated" => decode_as!(RoomCreated, RoomCreatedPayload),
            "LoggedOut" => decode_as!(LoggedOut, LoggedOutPayload),
            "Friends" => decode_as!(Friends, FriendsPayload),
            "FriendDM" => decode_as!(FriendDM, FriendDmPayload),
            "FriendHistory" => decode_as!(FriendHistory, FriendHistoryPayload),
            "UserProfile" => decode_as!(UserProfile, UserProfilePayload),
            "GuildInfo" => decode_as!(GuildInfo, GuildInfoPayload),
            "GuildList" => decode_as!(GuildList, GuildListPayload),
            "GuildChat" => decode_as!(GuildChat, GuildChatPayload),
            "GuildChatMsg" => decode_as!(GuildChatMsg, GuildChatMsgPayload),
            "GuildLeft" => decode_as!(GuildLeft, GuildLeftPayload),
            "GuildDisbanded" => decode_as!(GuildDisbanded, GuildDisbandedPayload),
            other => Ok(Envelope::Unknown(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_known_type() {
        let frame = RawFrame {
            kind: "Profile".to_string(),
            data: serde_json::json!({"playerID": 42, "pvpRating": 1500, "pvpRank": "Silver"}),
        };
        let envelope = Envelope::decode(frame).unwrap();
        assert!(matches!(envelope, Envelope::Profile(p) if p.player_id == 42));
    }

    #[test]
    fn unknown_type_is_not_an_error() {
        let frame = RawFrame {
            kind: "SomethingFromTheFuture".to_string(),
            data: serde_json::json!({}),
        };
        let envelope = Envelope::decode(frame).unwrap();
        assert!(matches!(envelope, Envelope::Unknown(tag) if tag == "SomethingFromTheFuture"));
    }

    #[test]
    fn malformed_known_type_errors_without_panicking() {
        let frame = RawFrame {
            kind: "Init".to_string(),
            data: serde_json::json!({"hand": "not-a-list"}),
        };
        let err = Envelope::decode(frame).unwrap_err();
        assert_eq!(err.kind, "Init");
    }
}
