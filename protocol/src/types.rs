//! Wire-stable payload shapes. Field names here must not drift from the server's
//! JSON schema — these are deserialized directly from inbound frames.

use serde::{Deserialize, Serialize};

/// A single unit as the server describes it, before the runtime turns it into a
/// `RenderUnit` with interpolation state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UnitState {
    pub id: i64,
    #[serde(rename = "ownerID")]
    pub owner_id: i64,
    pub name: String,
    pub class: String,
    pub x: i32,
    pub y: i32,
    pub hp: i32,
    #[serde(rename = "maxHP")]
    pub max_hp: i32,
    pub range: i32,
    pub particle: String,
}

/// A projectile as the server describes it. The client never originates these.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Projectile {
    pub id: i64,
    #[serde(rename = "ownerID")]
    pub owner_id: i64,
    #[serde(rename = "targetUnitID")]
    pub target_unit_id: i64,
    pub x: f32,
    pub y: f32,
    #[serde(rename = "targetX")]
    pub target_x: f32,
    #[serde(rename = "targetY")]
    pub target_y: f32,
    pub damage: i32,
    pub kind: String,
}

/// Axis-aligned base/tower state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BaseState {
    #[serde(rename = "ownerID")]
    pub owner_id: i64,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub hp: i32,
    #[serde(rename = "maxHP")]
    pub max_hp: i32,
}

/// A card in hand or the "next" preview slot.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MiniCardView {
    #[serde(rename = "cardID")]
    pub card_id: String,
    pub name: String,
    pub cost: i32,
}

/// `Init` payload: sent once per battle start.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct InitPayload {
    #[serde(rename = "playerID")]
    pub player_id: i64,
    pub hand: Vec<MiniCardView>,
    pub next: MiniCardView,
    #[serde(rename = "mapID", default)]
    pub map_id: Option<String>,
}

/// `StateDelta` payload: incremental world update.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct StateDeltaPayload {
    #[serde(rename = "unitsUpsert", default)]
    pub units_upsert: Vec<UnitState>,
    #[serde(rename = "unitsRemoved", default)]
    pub units_removed: Vec<i64>,
    #[serde(default)]
    pub projectiles: Option<Vec<Projectile>>,
    #[serde(default)]
    pub bases: Option<Vec<BaseState>>,
}

/// `FullSnapshot` payload: atomic world replacement.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FullSnapshotPayload {
    pub units: Vec<UnitState>,
    pub bases: Vec<BaseState>,
}

/// `Profile` payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfilePayload {
    #[serde(rename = "playerID")]
    pub player_id: i64,
    #[serde(rename = "pvpRating")]
    pub pvp_rating: i32,
    #[serde(rename = "pvpRank")]
    pub pvp_rank: String,
}

/// `GoldUpdate` payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GoldUpdatePayload {
    pub gold: i32,
}

/// `HandUpdate` payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HandUpdatePayload {
    pub hand: Vec<MiniCardView>,
    pub next: MiniCardView,
}

/// `GameOver` payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GameOverPayload {
    pub victory: bool,
}

/// `FriendlyCode` payload: the host's rendezvous code for a hosted room.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FriendlyCodePayload {
    pub code: String,
}

/// `RoomCreated` payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RoomCreatedPayload {
    #[serde(rename = "roomID")]
    pub room_id: String,
}

/// `Error` payload: a logical/server-side error surfaced to the relevant view.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ServerErrorPayload {
    pub message: String,
}

/// `Friends` payload: the authoritative friends list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct FriendsPayload {
    pub friends: Vec<FriendEntryWire>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FriendEntryWire {
    pub name: String,
    pub online: bool,
}

/// `FriendDM` payload: a single inbound direct message delivered live.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FriendDmPayload {
    pub from: String,
    pub text: String,
    pub ts: i64,
}

/// `FriendHistory` payload: the scrollback for a DM session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct FriendHistoryPayload {
    pub with: String,
    pub messages: Vec<ChatMessageWire>,
}

/// `UserProfile` payload: the result of looking a player up by name.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UserProfilePayload {
    pub name: String,
    pub found: bool,
}

/// `GuildInfo` payload: the authoritative roster + metadata for the local guild.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct GuildInfoPayload {
    #[serde(rename = "guildID")]
    pub guild_id: String,
    pub name: String,
    pub members: Vec<GuildMemberWire>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GuildMemberWire {
    pub name: String,
    pub role: String,
    pub online: bool,
}

/// `GuildList` payload: guilds available to join.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct GuildListPayload {
    pub guilds: Vec<GuildListingWire>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GuildListingWire {
    #[serde(rename = "guildID")]
    pub guild_id: String,
    pub name: String,
    #[serde(rename = "memberCount")]
    pub member_count: i32,
}

/// `GuildChat` payload: the full chat backlog for a guild.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct GuildChatPayload {
    pub messages: Vec<ChatMessageWire>,
}

/// `GuildChatMsg` payload: a single live chat message.
pub type GuildChatMsgPayload = ChatMessageWire;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessageWire {
    pub from: String,
    pub text: String,
    pub ts: i64,
    #[serde(default)]
    pub system: bool,
}

/// `GuildLeft` payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GuildLeftPayload {
    #[serde(rename = "guildID")]
    pub guild_id: String,
}

/// `GuildDisbanded` payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GuildDisbandedPayload {
    #[serde(rename = "guildID")]
    pub guild_id: String,
}

/// `Leaderboard` payload.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct LeaderboardPayload {
    pub entries: Vec<LeaderboardEntryWire>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LeaderboardEntryWire {
    pub name: String,
    pub rating: i32,
    pub rank: String,
}

/// `Minis` payload: the player's unlocked card pool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct MinisPayload {
    pub minis: Vec<MiniCardView>,
}

/// `Maps` payload: the set of arenas/maps currently selectable.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Default)]
pub struct MapsPayload {
    pub maps: Vec<MapEntryWire>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MapEntryWire {
    #[serde(rename = "mapID")]
    pub map_id: String,
    pub name: String,
}

/// `LoggedOut` payload: acknowledges a server-confirmed logout.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedOutPayload {}
