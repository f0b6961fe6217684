use crate::error::Result;
use crate::protocol::buffer::PacketBuffer;
use crate::protocol::handler::PacketHandler;
use crate::protocol::packet::Packet;
use crate::protocol::protocol_info::START_GAME_PACKET;
use crate::protocol::table_cache::TableCache;
use crate::protocol::types::{
    default_game_rules, read_block_table, read_item_table, write_block_table, write_item_table,
    BlockPosition, BlockTableEntry, GameRules, ItemTable, Vector3,
};
use uuid::Uuid;

/// Permission level given to players who have no explicit one. 1 is "member".
pub const DEFAULT_PLAYER_PERMISSION: i32 = 1;

/// Everything the client needs to enter a world: its own entity, where it
/// spawns, the world settings, and the runtime block/item tables.
///
/// `block_table` and `item_table` are `None` to send the process-wide defaults
/// (see [`TableCache`]). `Some` of an empty table sends an empty table. Decoding
/// always produces `Some`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldInitPacket {
    pub entity_unique_id: i64,
    pub entity_runtime_id: u64,
    pub player_gamemode: i32,

    pub player_position: Vector3,
    pub pitch: f32,
    pub yaw: f32,

    // Level settings
    pub seed: i32,
    pub dimension: i32,
    /// 0 old, 1 infinite, 2 flat
    pub generator: i32,
    pub world_gamemode: i32,
    pub difficulty: i32,
    pub spawn_position: BlockPosition,
    pub has_achievements_disabled: bool,
    pub time: i32,
    pub edu_mode: bool,
    pub has_edu_features_enabled: bool,
    pub rain_level: f32,
    pub lightning_level: f32,
    pub has_confirmed_platform_locked_content: bool,
    pub is_multiplayer_game: bool,
    pub has_lan_broadcast: bool,
    pub xbox_live_broadcast_mode: i32,
    pub platform_broadcast_mode: i32,
    pub commands_enabled: bool,
    pub is_texture_packs_required: bool,
    pub game_rules: GameRules,
    pub has_bonus_chest_enabled: bool,
    pub has_start_with_map_enabled: bool,
    pub default_player_permission: i32,
    pub server_chunk_tick_radius: i32,
    pub has_locked_behavior_pack: bool,
    pub has_locked_resource_pack: bool,
    pub is_from_locked_world_template: bool,
    pub use_msa_gamertags_only: bool,
    pub is_from_world_template: bool,
    pub is_world_template_option_locked: bool,
    pub only_spawn_v1_villagers: bool,

    /// Base64 string, usually the world folder name
    pub level_id: String,
    pub world_name: String,
    pub premium_world_template_id: String,
    pub is_trial: bool,
    /// Only meaningful when `is_trial` is set
    pub current_tick: i64,
    pub enchantment_seed: i32,

    pub block_table: Option<Vec<BlockTableEntry>>,
    pub item_table: Option<ItemTable>,

    pub multiplayer_correlation_id: String,
}

impl Default for WorldInitPacket {
    fn default() -> Self {
        Self {
            entity_unique_id: 0,
            entity_runtime_id: 0,
            player_gamemode: 0,
            player_position: Vector3::default(),
            pitch: 0.0,
            yaw: 0.0,
            seed: 0,
            dimension: 0,
            generator: 1,
            world_gamemode: 0,
            difficulty: 0,
            spawn_position: BlockPosition::default(),
            has_achievements_disabled: true,
            time: -1,
            edu_mode: false,
            has_edu_features_enabled: false,
            rain_level: 0.0,
            lightning_level: 0.0,
            has_confirmed_platform_locked_content: false,
            is_multiplayer_game: true,
            has_lan_broadcast: true,
            xbox_live_broadcast_mode: 0,
            platform_broadcast_mode: 0,
            commands_enabled: false,
            is_texture_packs_required: true,
            game_rules: default_game_rules(),
            has_bonus_chest_enabled: false,
            has_start_with_map_enabled: false,
            default_player_permission: DEFAULT_PLAYER_PERMISSION,
            server_chunk_tick_radius: 4,
            has_locked_behavior_pack: false,
            has_locked_resource_pack: false,
            is_from_locked_world_template: false,
            use_msa_gamertags_only: false,
            is_from_world_template: false,
            is_world_template_option_locked: false,
            only_spawn_v1_villagers: false,
            level_id: String::new(),
            world_name: String::new(),
            premium_world_template_id: String::new(),
            is_trial: false,
            current_tick: 0,
            enchantment_seed: 0,
            block_table: None,
            item_table: None,
            multiplayer_correlation_id: String::new(),
        }
    }
}

impl WorldInitPacket {
    pub fn new(entity_unique_id: i64, entity_runtime_id: u64, world_name: String) -> Self {
        Self {
            entity_unique_id,
            entity_runtime_id,
            world_name,
            ..Self::default()
        }
    }

    /// Sets the correlation id to a name-based UUID derived from `seed`, so the
    /// same session key always yields the same id.
    pub fn assign_correlation_id(&mut self, seed: &[u8]) {
        self.multiplayer_correlation_id = Uuid::new_v3(&Uuid::NAMESPACE_OID, seed).to_string();
    }

    /// Encodes the payload, taking default tables from `cache` rather than the
    /// process-wide one.
    pub fn encode_payload_with(&self, buffer: &mut PacketBuffer, cache: &TableCache) -> Result<()> {
        self.encode_fields(buffer, || cache)
    }

    /// `default_tables` is only called for a table left as `None`.
    fn encode_fields<'c>(
        &self,
        buffer: &mut PacketBuffer,
        default_tables: impl Fn() -> &'c TableCache,
    ) -> Result<()> {
        buffer.write_entity_unique_id(self.entity_unique_id);
        buffer.write_entity_runtime_id(self.entity_runtime_id);
        buffer.write_varint(self.player_gamemode);

        buffer.write_vector3(self.player_position);
        buffer.write_f32(self.pitch);
        buffer.write_f32(self.yaw);

        buffer.write_varint(self.seed);
        buffer.write_varint(self.dimension);
        buffer.write_varint(self.generator);
        buffer.write_varint(self.world_gamemode);
        buffer.write_varint(self.difficulty);
        buffer.write_block_position(self.spawn_position);
        buffer.write_bool(self.has_achievements_disabled);
        buffer.write_varint(self.time);
        buffer.write_bool(self.edu_mode);
        buffer.write_bool(self.has_edu_features_enabled);
        buffer.write_f32(self.rain_level);
        buffer.write_f32(self.lightning_level);
        buffer.write_bool(self.has_confirmed_platform_locked_content);
        buffer.write_bool(self.is_multiplayer_game);
        buffer.write_bool(self.has_lan_broadcast);
        buffer.write_varint(self.xbox_live_broadcast_mode);
        buffer.write_varint(self.platform_broadcast_mode);
        buffer.write_bool(self.commands_enabled);
        buffer.write_bool(self.is_texture_packs_required);
        buffer.write_game_rules(&self.game_rules)?;
        buffer.write_bool(self.has_bonus_chest_enabled);
        buffer.write_bool(self.has_start_with_map_enabled);
        buffer.write_varint(self.default_player_permission);
        buffer.write_i32(self.server_chunk_tick_radius);
        buffer.write_bool(self.has_locked_behavior_pack);
        buffer.write_bool(self.has_locked_resource_pack);
        buffer.write_bool(self.is_from_locked_world_template);
        buffer.write_bool(self.use_msa_gamertags_only);
        buffer.write_bool(self.is_from_world_template);
        buffer.write_bool(self.is_world_template_option_locked);
        buffer.write_bool(self.only_spawn_v1_villagers);

        buffer.write_string(&self.level_id)?;
        buffer.write_string(&self.world_name)?;
        buffer.write_string(&self.premium_world_template_id)?;
        buffer.write_bool(self.is_trial);
        buffer.write_u64_words(self.current_tick as u64);

        buffer.write_varint(self.enchantment_seed);

        match &self.block_table {
            Some(table) => write_block_table(buffer, table)?,
            None => buffer.write_bytes_raw(&default_tables().block_table()?),
        }
        match &self.item_table {
            Some(table) => write_item_table(buffer, table)?,
            None => buffer.write_bytes_raw(&default_tables().item_table()?),
        }

        buffer.write_string(&self.multiplayer_correlation_id)
    }
}

impl Packet for WorldInitPacket {
    fn packet_id() -> u32 {
        START_GAME_PACKET
    }

    fn decode_payload(buffer: &mut PacketBuffer) -> Result<Self> {
        Ok(Self {
            entity_unique_id: buffer.read_entity_unique_id()?,
            entity_runtime_id: buffer.read_entity_runtime_id()?,
            player_gamemode: buffer.read_varint()?,

            player_position: buffer.read_vector3()?,
            pitch: buffer.read_f32()?,
            yaw: buffer.read_f32()?,

            seed: buffer.read_varint()?,
            dimension: buffer.read_varint()?,
            generator: buffer.read_varint()?,
            world_gamemode: buffer.read_varint()?,
            difficulty: buffer.read_varint()?,
            spawn_position: buffer.read_block_position()?,
            has_achievements_disabled: buffer.read_bool()?,
            time: buffer.read_varint()?,
            edu_mode: buffer.read_bool()?,
            has_edu_features_enabled: buffer.read_bool()?,
            rain_level: buffer.read_f32()?,
            lightning_level: buffer.read_f32()?,
            has_confirmed_platform_locked_content: buffer.read_bool()?,
            is_multiplayer_game: buffer.read_bool()?,
            has_lan_broadcast: buffer.read_bool()?,
            xbox_live_broadcast_mode: buffer.read_varint()?,
            platform_broadcast_mode: buffer.read_varint()?,
            commands_enabled: buffer.read_bool()?,
            is_texture_packs_required: buffer.read_bool()?,
            game_rules: buffer.read_game_rules()?,
            has_bonus_chest_enabled: buffer.read_bool()?,
            has_start_with_map_enabled: buffer.read_bool()?,
            default_player_permission: buffer.read_varint()?,
            server_chunk_tick_radius: buffer.read_i32()?,
            has_locked_behavior_pack: buffer.read_bool()?,
            has_locked_resource_pack: buffer.read_bool()?,
            is_from_locked_world_template: buffer.read_bool()?,
            use_msa_gamertags_only: buffer.read_bool()?,
            is_from_world_template: buffer.read_bool()?,
            is_world_template_option_locked: buffer.read_bool()?,
            only_spawn_v1_villagers: buffer.read_bool()?,

            level_id: buffer.read_string()?,
            world_name: buffer.read_string()?,
            premium_world_template_id: buffer.read_string()?,
            is_trial: buffer.read_bool()?,
            current_tick: buffer.read_u64_words()? as i64,
            enchantment_seed: buffer.read_varint()?,

            block_table: Some(read_block_table(buffer)?),
            item_table: Some(read_item_table(buffer)?),

            multiplayer_correlation_id: buffer.read_string()?,
        })
    }

    fn encode_payload(&self, buffer: &mut PacketBuffer) -> Result<()> {
        self.encode_fields(buffer, TableCache::global)
    }

    fn handle(&self, handler: &mut dyn PacketHandler) -> bool {
        handler.handle_world_init(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use crate::protocol::registry::StaticRegistry;
    use crate::protocol::types::GameRuleValue;
    use assert_matches::assert_matches;
    use std::sync::Arc;

    fn explicit_tables(mut packet: WorldInitPacket) -> WorldInitPacket {
        packet.block_table = Some(vec![
            BlockTableEntry::new("stone", 0, 1),
            BlockTableEntry::new("air", 0, 0),
        ]);
        packet.item_table = Some(ItemTable::new());
        packet
    }

    fn roundtrip(packet: &WorldInitPacket) -> WorldInitPacket {
        let mut buffer = PacketBuffer::new();
        packet.encode_payload(&mut buffer).unwrap();
        let mut read_buffer = PacketBuffer::from_bytes(buffer.into_inner());
        let decoded = WorldInitPacket::decode_payload(&mut read_buffer).unwrap();
        assert!(read_buffer.feof());
        decoded
    }

    #[test]
    fn test_defaults() {
        let packet = WorldInitPacket::new(-5, 5, "Overworld".to_owned());
        assert_eq!(packet.entity_unique_id, -5);
        assert_eq!(packet.entity_runtime_id, 5);
        assert_eq!(packet.world_name, "Overworld");
        assert_eq!(packet.generator, 1);
        assert_eq!(packet.time, -1);
        assert_eq!(packet.server_chunk_tick_radius, 4);
        assert_eq!(packet.default_player_permission, DEFAULT_PLAYER_PERMISSION);
        assert!(packet.has_achievements_disabled);
        assert!(packet.is_multiplayer_game);
        assert!(packet.has_lan_broadcast);
        assert!(packet.is_texture_packs_required);
        assert!(packet.block_table.is_none());
        assert!(packet.item_table.is_none());
        assert_eq!(
            packet.game_rules.get("naturalregeneration"),
            Some(&GameRuleValue::Bool(false))
        );
    }

    #[test]
    fn test_roundtrip_with_explicit_tables() {
        let packet = explicit_tables(WorldInitPacket::new(1, 1, "world".to_owned()));
        assert_eq!(roundtrip(&packet), packet);
    }

    #[test]
    fn test_roundtrip_every_field_set() {
        let mut game_rules = GameRules::new();
        game_rules.insert("showcoordinates".to_owned(), GameRuleValue::Bool(true));
        game_rules.insert("spawnradius".to_owned(), GameRuleValue::Int(-10));
        game_rules.insert("tickspeed".to_owned(), GameRuleValue::Float(1.5));

        let mut items = ItemTable::new();
        items.insert("minecraft:stone".to_owned(), 1);
        items.insert("minecraft:boat".to_owned(), i16::MIN);

        let packet = WorldInitPacket {
            entity_unique_id: i64::MIN,
            entity_runtime_id: u64::MAX,
            player_gamemode: 2,
            player_position: Vector3::new(128.5, 70.0, -64.25),
            pitch: -12.5,
            yaw: 270.0,
            seed: i32::MIN,
            dimension: 1,
            generator: 2,
            world_gamemode: 1,
            difficulty: 3,
            spawn_position: BlockPosition::new(i32::MAX, -64, i32::MIN),
            has_achievements_disabled: false,
            time: 6000,
            edu_mode: true,
            has_edu_features_enabled: true,
            rain_level: 0.75,
            lightning_level: 0.25,
            has_confirmed_platform_locked_content: true,
            is_multiplayer_game: false,
            has_lan_broadcast: false,
            xbox_live_broadcast_mode: 3,
            platform_broadcast_mode: 4,
            commands_enabled: true,
            is_texture_packs_required: false,
            game_rules,
            has_bonus_chest_enabled: true,
            has_start_with_map_enabled: true,
            default_player_permission: 2,
            server_chunk_tick_radius: -1,
            has_locked_behavior_pack: true,
            has_locked_resource_pack: true,
            is_from_locked_world_template: true,
            use_msa_gamertags_only: true,
            is_from_world_template: true,
            is_world_template_option_locked: true,
            only_spawn_v1_villagers: true,
            level_id: "bGV2ZWw=".to_owned(),
            world_name: "Survival Island".to_owned(),
            premium_world_template_id: "template".to_owned(),
            is_trial: true,
            current_tick: -2,
            enchantment_seed: -77,
            block_table: Some(vec![BlockTableEntry::new("minecraft:water", 15, 9)]),
            item_table: Some(items),
            multiplayer_correlation_id: "corr".to_owned(),
        };

        assert_eq!(roundtrip(&packet), packet);
    }

    #[test]
    fn test_table_section_scenario() {
        let packet = explicit_tables(WorldInitPacket::default());
        let mut buffer = PacketBuffer::new();
        packet.encode_payload(&mut buffer).unwrap();

        let mut expected_tail = vec![0x02, 0x05];
        expected_tail.extend_from_slice(b"stone");
        expected_tail.extend_from_slice(&[0x00, 0x00, 0x01, 0x00]);
        expected_tail.push(0x03);
        expected_tail.extend_from_slice(b"air");
        expected_tail.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        expected_tail.push(0x00); // empty item table
        expected_tail.push(0x00); // empty correlation id

        assert!(buffer.get_buffer().ends_with(&expected_tail));
    }

    #[test]
    fn test_fixed_width_fields() {
        let packet = WorldInitPacket {
            current_tick: 0x0102030405060708,
            server_chunk_tick_radius: 4,
            block_table: Some(Vec::new()),
            item_table: Some(ItemTable::new()),
            ..WorldInitPacket::default()
        };
        let mut buffer = PacketBuffer::new();
        packet.encode_payload(&mut buffer).unwrap();
        let bytes = buffer.get_buffer();

        // Tail: is_trial, tick words, enchantment seed, two empty tables, correlation id
        let tail = &bytes[bytes.len() - 13..];
        assert_eq!(
            tail,
            &[0x00, 0x08, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_unset_tables_use_cache() {
        let registry = Arc::new(StaticRegistry::default());
        registry.push_block_state(BlockTableEntry::new("stone", 0, 1));
        registry.set_item_id("minecraft:stone", 1);
        let cache = TableCache::new(registry.clone());

        let packet = WorldInitPacket::default();
        let mut first = PacketBuffer::new();
        packet.encode_payload_with(&mut first, &cache).unwrap();

        // Registry changes after first use are not seen
        registry.push_block_state(BlockTableEntry::new("air", 0, 0));
        registry.set_item_id("minecraft:air", 0);

        let mut second = PacketBuffer::new();
        packet.encode_payload_with(&mut second, &cache).unwrap();
        assert_eq!(first.get_buffer(), second.get_buffer());

        let mut read_buffer = PacketBuffer::from_bytes(second.into_inner());
        let decoded = WorldInitPacket::decode_payload(&mut read_buffer).unwrap();
        assert_eq!(
            decoded.block_table,
            Some(vec![BlockTableEntry::new("stone", 0, 1)])
        );
        assert_eq!(decoded.item_table.map(|items| items.len()), Some(1));
    }

    #[test]
    fn test_explicit_empty_table_is_not_default() {
        let registry = Arc::new(StaticRegistry::default());
        registry.push_block_state(BlockTableEntry::new("stone", 0, 1));
        let cache = TableCache::new(registry);

        let packet = WorldInitPacket {
            block_table: Some(Vec::new()),
            item_table: Some(ItemTable::new()),
            ..WorldInitPacket::default()
        };
        let mut buffer = PacketBuffer::new();
        packet.encode_payload_with(&mut buffer, &cache).unwrap();

        assert!(!cache.is_block_table_cached());
        let mut read_buffer = PacketBuffer::from_bytes(buffer.into_inner());
        let decoded = WorldInitPacket::decode_payload(&mut read_buffer).unwrap();
        assert_eq!(decoded.block_table, Some(Vec::new()));
    }

    #[test]
    fn test_explicit_tables_never_look_up_the_cache() {
        let packet = explicit_tables(WorldInitPacket::default());
        let mut buffer = PacketBuffer::new();
        packet
            .encode_fields(&mut buffer, || -> &'static TableCache {
                panic!("default tables requested for a packet with explicit tables")
            })
            .unwrap();

        let mut read_buffer = PacketBuffer::from_bytes(buffer.into_inner());
        assert_eq!(WorldInitPacket::decode_payload(&mut read_buffer).unwrap(), packet);
    }

    #[test]
    fn test_only_unset_table_uses_cache() {
        let registry = Arc::new(StaticRegistry::default());
        registry.push_block_state(BlockTableEntry::new("stone", 0, 1));
        let cache = TableCache::new(registry);

        let packet = WorldInitPacket {
            item_table: Some(ItemTable::new()),
            ..WorldInitPacket::default()
        };
        let mut buffer = PacketBuffer::new();
        packet.encode_payload_with(&mut buffer, &cache).unwrap();

        assert!(cache.is_block_table_cached());
        assert!(!cache.is_item_table_cached());
    }

    #[test]
    fn test_assign_correlation_id_is_stable() {
        let mut first = WorldInitPacket::default();
        let mut second = WorldInitPacket::default();
        first.assign_correlation_id(b"session-1");
        second.assign_correlation_id(b"session-1");

        assert_eq!(first.multiplayer_correlation_id, second.multiplayer_correlation_id);
        assert_eq!(first.multiplayer_correlation_id.len(), 36);
        assert!(Uuid::parse_str(&first.multiplayer_correlation_id).is_ok());
    }

    #[test]
    fn test_truncated_packet() {
        let packet = explicit_tables(WorldInitPacket::default());
        let mut buffer = PacketBuffer::new();
        packet.encode_payload(&mut buffer).unwrap();

        let mut bytes = buffer.into_inner();
        bytes.truncate(bytes.len() - 3);
        let mut read_buffer = PacketBuffer::from_bytes(bytes);
        assert_matches!(
            WorldInitPacket::decode_payload(&mut read_buffer),
            Err(ProtocolError::TruncatedInput { .. })
        );
    }
}
